//! Selector-driven traversal strategies.
//!
//! Both strategies consume a [`WalkConfig`] and return one result per
//! (selector, element) match, ordered by selector declaration and then by
//! match order. They share no state with each other or across calls.

pub mod concurrent;
pub mod config;
pub mod sequential;

pub use concurrent::{ConcurrentWalker, WorkItem};
pub use config::WalkConfig;
pub use sequential::SequentialWalker;

use crate::base::{ElementHandler, ExceptionHandler, HandlerContext, Scope};
use crate::errors::{Result, WalkError};
use crate::types::{Selector, Strategy};
use std::sync::Arc;
use tracing::debug;

/// Visit every match one at a time, in declaration order.
pub async fn sequential<S, R>(config: impl Into<Arc<WalkConfig<S, R>>>) -> Result<Vec<R>>
where
    S: Scope,
    R: From<Selector> + Send + 'static,
{
    SequentialWalker::run(config).await
}

/// Build the full worklist, then run every handler concurrently.
pub async fn concurrent<S, R>(config: impl Into<Arc<WalkConfig<S, R>>>) -> Result<Vec<R>>
where
    S: Scope,
    R: From<Selector> + Send + 'static,
{
    ConcurrentWalker::run(config).await
}

pub async fn run<S, R>(
    strategy: Strategy,
    config: impl Into<Arc<WalkConfig<S, R>>>,
) -> Result<Vec<R>>
where
    S: Scope,
    R: From<Selector> + Send + 'static,
{
    match strategy {
        Strategy::Sequential => SequentialWalker::run(config).await,
        Strategy::Concurrent => ConcurrentWalker::run(config).await,
    }
}

/// Invoke `handler`, routing its failure through `exception_handler`.
pub(crate) async fn dispatch<S, R>(
    handler: &dyn ElementHandler<S, R>,
    exception_handler: &dyn ExceptionHandler<S, R>,
    ctx: HandlerContext<S, R>,
) -> Result<R>
where
    S: Scope,
    R: Send + 'static,
{
    debug!(selector = %ctx.selector, "dispatching handler");
    match handler.handle(ctx.clone()).await {
        Ok(value) => Ok(value),
        Err(error) => {
            debug!(
                selector = %ctx.selector,
                thrown = error.is_thrown(),
                "routing handler failure to exception handler"
            );
            let selector = ctx.selector.clone();
            exception_handler
                .recover(error, ctx)
                .await
                .map_err(|source| WalkError::ExceptionHandler { selector, source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureScope;
    use std::io::{self, Write};
    use std::sync::{Mutex, PoisonError};
    use tokio_test::assert_ok;

    /// Formatted log output, shared with the subscriber that writes it.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn every_dispatch_is_logged_at_debug() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = WalkConfig::<FixtureScope, String>::new()
            .with_scope(FixtureScope::new().with_elements("li", ["l1", "l2", "l3"]))
            .on("li", |ctx| Ok(ctx.element.clone()));

        let results = assert_ok!(sequential(config).await);
        assert_eq!(results.len(), 3);

        let text = logs.text();
        assert_eq!(text.matches("dispatching handler").count(), 3);
        assert!(text.contains("DEBUG"));
        assert!(text.contains("selector=li"));
    }
}
