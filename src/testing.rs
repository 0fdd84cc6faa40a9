use crate::base::Scope;
use crate::errors::ScopeError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory scope with preset matches per selector.
///
/// Unknown selectors match nothing. Matches may include holes (`None`).
#[derive(Debug, Default)]
pub struct FixtureScope {
    matches: HashMap<String, Vec<Option<String>>>,
    failures: HashMap<String, String>,
    queries: AtomicUsize,
}

impl FixtureScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matches<I>(mut self, selector: &str, matches: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        self.matches
            .insert(selector.to_string(), matches.into_iter().collect());
        self
    }

    pub fn with_elements<I, T>(self, selector: &str, elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.with_matches(selector, elements.into_iter().map(|e| Some(e.into())))
    }

    /// Make every query for `selector` fail.
    pub fn failing(mut self, selector: &str, reason: impl Into<String>) -> Self {
        self.failures.insert(selector.to_string(), reason.into());
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Scope for FixtureScope {
    type Element = String;

    fn query(&self, selector: &str) -> Result<Vec<Option<String>>, ScopeError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.failures.get(selector) {
            return Err(ScopeError::Unsupported(reason.clone()));
        }
        Ok(self.matches.get(selector).cloned().unwrap_or_default())
    }
}

/// Shared, clonable record of handler activity.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
