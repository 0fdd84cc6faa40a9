use crate::base::Scope;
use crate::dom::DomElement;
use crate::errors::{Result, ScopeError};
use scraper::{Html, Selector as CssSelector};
use std::fmt;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Scope over a static HTML document.
///
/// The document is parsed once, on construction. Matches come back in
/// document order.
pub struct HtmlScope {
    // `Html` is only `Send` (scraper's `atomic` feature); the lock makes the scope `Sync`.
    document: Mutex<Html>,
}

impl HtmlScope {
    pub fn new(source: impl AsRef<str>) -> Self {
        Self {
            document: Mutex::new(Html::parse_document(source.as_ref())),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path.as_ref())?))
    }

    fn parse_selector(selector: &str) -> std::result::Result<CssSelector, ScopeError> {
        CssSelector::parse(selector).map_err(|e| ScopeError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{:?}", e),
        })
    }
}

impl fmt::Debug for HtmlScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlScope").finish_non_exhaustive()
    }
}

impl Scope for HtmlScope {
    type Element = DomElement;

    fn query(&self, selector: &str) -> std::result::Result<Vec<Option<DomElement>>, ScopeError> {
        let css = Self::parse_selector(selector)?;
        let document = self
            .document
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Ok(document
            .select(&css)
            .enumerate()
            .map(|(index, node)| DomElement::from_element_ref(&node, index))
            .map(Some)
            .collect())
    }
}
