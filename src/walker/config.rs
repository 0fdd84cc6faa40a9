use crate::base::{
    AsyncHandler, AsyncRecovery, ElementHandler, ExceptionHandler, HandlerContext, LogAndFallback,
    Scope, SyncHandler, SyncRecovery,
};
use crate::errors::HandlerError;
use crate::types::Selector;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type SharedHandler<S, R> = Arc<dyn ElementHandler<S, R>>;
type SharedExceptionHandler<S, R> = Arc<dyn ExceptionHandler<S, R>>;

/// Configuration shared by both traversal strategies.
///
/// Holds the scope to query, an optional exception handler and the selector
/// handlers in declaration order. Registering a selector that is already
/// present replaces its handler without moving it.
pub struct WalkConfig<S: Scope, R: Send + 'static> {
    scope: Option<Arc<S>>,
    exception_handler: Option<SharedExceptionHandler<S, R>>,
    handlers: Vec<(Selector, SharedHandler<S, R>)>,
}

impl<S: Scope, R: Send + 'static> WalkConfig<S, R> {
    pub fn new() -> Self {
        Self {
            scope: None,
            exception_handler: None,
            handlers: Vec::new(),
        }
    }

    pub fn with_scope(self, scope: S) -> Self {
        self.with_shared_scope(Arc::new(scope))
    }

    pub fn with_shared_scope(mut self, scope: Arc<S>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Bind a synchronous handler to `selector`.
    pub fn on<F>(self, selector: impl Into<Selector>, handler: F) -> Self
    where
        F: Fn(&HandlerContext<S, R>) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        self.on_handler(selector, SyncHandler(handler))
    }

    /// Bind an asynchronous handler to `selector`.
    pub fn on_async<F, Fut>(self, selector: impl Into<Selector>, handler: F) -> Self
    where
        F: Fn(HandlerContext<S, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        self.on_handler(selector, AsyncHandler(handler))
    }

    pub fn on_handler<H>(mut self, selector: impl Into<Selector>, handler: H) -> Self
    where
        H: ElementHandler<S, R> + 'static,
    {
        self.insert(selector.into(), Arc::new(handler));
        self
    }

    pub fn on_error<F>(self, handler: F) -> Self
    where
        F: Fn(HandlerError, &HandlerContext<S, R>) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        self.with_exception_handler(SyncRecovery(handler))
    }

    pub fn on_error_async<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(HandlerError, HandlerContext<S, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        self.with_exception_handler(AsyncRecovery(handler))
    }

    pub fn with_exception_handler<H>(mut self, handler: H) -> Self
    where
        H: ExceptionHandler<S, R> + 'static,
    {
        self.exception_handler = Some(Arc::new(handler));
        self
    }

    fn insert(&mut self, selector: Selector, handler: SharedHandler<S, R>) {
        let slot = self
            .handlers
            .iter_mut()
            .find(|(existing, _)| *existing == selector);
        match slot {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((selector, handler)),
        }
    }

    pub fn scope(&self) -> Option<&Arc<S>> {
        self.scope.as_ref()
    }

    pub fn exception_handler(&self) -> Option<&SharedExceptionHandler<S, R>> {
        self.exception_handler.as_ref()
    }

    pub fn handler(&self, selector: &str) -> Option<&SharedHandler<S, R>> {
        self.handlers
            .iter()
            .find(|(existing, _)| existing.as_str() == selector)
            .map(|(_, handler)| handler)
    }

    /// Selectors in declaration order.
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.handlers.iter().map(|(selector, _)| selector)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn entries(&self) -> &[(Selector, SharedHandler<S, R>)] {
        &self.handlers
    }

    /// Configured exception handler, or a fresh default for this call.
    pub(crate) fn resolve_exception_handler(&self) -> SharedExceptionHandler<S, R>
    where
        R: From<Selector>,
    {
        match &self.exception_handler {
            Some(handler) => Arc::clone(handler),
            None => Arc::new(LogAndFallback),
        }
    }
}

impl<S: Scope, R: Send + 'static> Default for WalkConfig<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scope, R: Send + 'static> fmt::Debug for WalkConfig<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkConfig")
            .field("has_scope", &self.scope.is_some())
            .field("has_exception_handler", &self.exception_handler.is_some())
            .field("selectors", &self.selectors().collect::<Vec<_>>())
            .finish()
    }
}
