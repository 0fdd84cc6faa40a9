use crate::errors::ScopeError;

/// A queryable root from which element matches are retrieved.
///
/// Selector matching semantics belong entirely to the implementation. The
/// walkers only require an ordered list of matches per selector string;
/// `None` entries are holes and are skipped before any handler runs.
///
/// Implementations must not depend on being retained: a walker borrows the
/// scope for the duration of one call and never mutates it.
pub trait Scope: Send + Sync + 'static {
    /// Matched element handed to handlers.
    type Element: Clone + Send + Sync + 'static;

    /// Return all matches for `selector`, in match order.
    fn query(&self, selector: &str) -> Result<Vec<Option<Self::Element>>, ScopeError>;
}

impl<S: Scope> Scope for std::sync::Arc<S> {
    type Element = S::Element;

    fn query(&self, selector: &str) -> Result<Vec<Option<Self::Element>>, ScopeError> {
        (**self).query(selector)
    }
}

/// Query `scope` and drop holes.
pub(crate) fn matches<S: Scope + ?Sized>(
    scope: &S,
    selector: &str,
) -> Result<Vec<S::Element>, ScopeError> {
    Ok(scope.query(selector)?.into_iter().flatten().collect())
}
