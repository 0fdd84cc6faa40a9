use crate::base::Scope;
use crate::errors::HandlerError;
use crate::types::Selector;
use crate::walker::WalkConfig;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Per-call context handed to handlers and exception handlers.
pub struct HandlerContext<S: Scope, R: Send + 'static> {
    pub element: S::Element,
    pub selector: Selector,
    /// The configuration driving this traversal.
    pub config: Arc<WalkConfig<S, R>>,
}

impl<S: Scope, R: Send + 'static> Clone for HandlerContext<S, R> {
    fn clone(&self) -> Self {
        Self {
            element: self.element.clone(),
            selector: self.selector.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: Scope, R: Send + 'static> fmt::Debug for HandlerContext<S, R>
where
    S::Element: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("element", &self.element)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// Callback invoked once per matched element.
#[async_trait]
pub trait ElementHandler<S: Scope, R: Send + 'static>: Send + Sync {
    async fn handle(&self, ctx: HandlerContext<S, R>) -> Result<R, HandlerError>;
}

/// Callback invoked once per handler failure, producing the result for that slot.
///
/// A failure returned from here is not caught by the walkers; it terminates the
/// whole traversal call.
#[async_trait]
pub trait ExceptionHandler<S: Scope, R: Send + 'static>: Send + Sync {
    async fn recover(&self, error: HandlerError, ctx: HandlerContext<S, R>) -> anyhow::Result<R>;
}

/// Adapts a plain closure. An `Err` counts as a thrown failure.
pub struct SyncHandler<F>(pub F);

#[async_trait]
impl<S, R, F> ElementHandler<S, R> for SyncHandler<F>
where
    S: Scope,
    R: Send + 'static,
    F: Fn(&HandlerContext<S, R>) -> anyhow::Result<R> + Send + Sync,
{
    async fn handle(&self, ctx: HandlerContext<S, R>) -> Result<R, HandlerError> {
        (self.0)(&ctx).map_err(HandlerError::Thrown)
    }
}

/// Adapts a closure returning a future. An `Err` output counts as a rejection.
pub struct AsyncHandler<F>(pub F);

#[async_trait]
impl<S, R, F, Fut> ElementHandler<S, R> for AsyncHandler<F>
where
    S: Scope,
    R: Send + 'static,
    F: Fn(HandlerContext<S, R>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    async fn handle(&self, ctx: HandlerContext<S, R>) -> Result<R, HandlerError> {
        (self.0)(ctx).await.map_err(HandlerError::Rejected)
    }
}

pub struct SyncRecovery<F>(pub F);

#[async_trait]
impl<S, R, F> ExceptionHandler<S, R> for SyncRecovery<F>
where
    S: Scope,
    R: Send + 'static,
    F: Fn(HandlerError, &HandlerContext<S, R>) -> anyhow::Result<R> + Send + Sync,
{
    async fn recover(&self, error: HandlerError, ctx: HandlerContext<S, R>) -> anyhow::Result<R> {
        (self.0)(error, &ctx)
    }
}

pub struct AsyncRecovery<F>(pub F);

#[async_trait]
impl<S, R, F, Fut> ExceptionHandler<S, R> for AsyncRecovery<F>
where
    S: Scope,
    R: Send + 'static,
    F: Fn(HandlerError, HandlerContext<S, R>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    async fn recover(&self, error: HandlerError, ctx: HandlerContext<S, R>) -> anyhow::Result<R> {
        (self.0)(error, ctx).await
    }
}

/// Default exception handler: log the failure and yield the selector as the result.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAndFallback;

#[async_trait]
impl<S, R> ExceptionHandler<S, R> for LogAndFallback
where
    S: Scope,
    R: From<Selector> + Send + 'static,
{
    async fn recover(&self, error: HandlerError, ctx: HandlerContext<S, R>) -> anyhow::Result<R> {
        warn!(
            selector = %ctx.selector,
            thrown = error.is_thrown(),
            "element handler failed: {}",
            error.source_error()
        );
        Ok(R::from(ctx.selector))
    }
}
