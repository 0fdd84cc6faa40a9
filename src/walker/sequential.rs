use crate::base::scope::matches;
use crate::base::{HandlerContext, Scope};
use crate::errors::{Result, WalkError};
use crate::types::Selector;
use crate::walker::{dispatch, WalkConfig};
use std::sync::Arc;
use tracing::{debug, info};

/// Visits matches one at a time, awaiting each handler before the next.
///
/// A missing scope yields no matches instead of an error, so an empty
/// configuration produces an empty result.
pub struct SequentialWalker;

impl SequentialWalker {
    pub async fn run<S, R>(config: impl Into<Arc<WalkConfig<S, R>>>) -> Result<Vec<R>>
    where
        S: Scope,
        R: From<Selector> + Send + 'static,
    {
        let config = config.into();
        let exception_handler = config.resolve_exception_handler();
        let mut results = Vec::new();

        for (selector, handler) in config.entries() {
            let elements = match config.scope() {
                Some(scope) => matches(scope.as_ref(), selector),
                None => Ok(Vec::new()),
            }
            .map_err(|source| WalkError::Query {
                selector: selector.clone(),
                source,
            })?;
            debug!(selector = %selector, matches = elements.len(), "queried scope");

            for element in elements {
                let ctx = HandlerContext {
                    element,
                    selector: selector.clone(),
                    config: Arc::clone(&config),
                };
                let result = dispatch(handler.as_ref(), exception_handler.as_ref(), ctx).await?;
                results.push(result);
            }
        }

        info!(results = results.len(), "sequential walk complete");
        Ok(results)
    }
}
