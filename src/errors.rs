use crate::types::Selector;
use thiserror::Error;

/// Failure raised by a [`Scope`](crate::base::Scope) while evaluating a selector.
#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Scope cannot be queried: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a per-element handler. Routed to the exception handler, never fatal by itself.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler failed before producing a pending computation.
    #[error("Handler threw: {0}")]
    Thrown(#[source] anyhow::Error),

    /// The handler's asynchronous computation completed with an error.
    #[error("Handler rejected: {0}")]
    Rejected(#[source] anyhow::Error),
}

impl HandlerError {
    pub fn source_error(&self) -> &anyhow::Error {
        match self {
            HandlerError::Thrown(err) | HandlerError::Rejected(err) => err,
        }
    }

    pub fn is_thrown(&self) -> bool {
        matches!(self, HandlerError::Thrown(_))
    }
}

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("No scope configured to query '{selector}'")]
    MissingScope { selector: Selector },

    #[error("Query for '{selector}' failed: {source}")]
    Query {
        selector: Selector,
        #[source]
        source: ScopeError,
    },

    #[error("Exception handler failed for '{selector}': {source}")]
    ExceptionHandler {
        selector: Selector,
        #[source]
        source: anyhow::Error,
    },

    #[error("Task for '{selector}' did not complete: {reason}")]
    TaskFailed { selector: Selector, reason: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WalkError>;

impl WalkError {
    /// Selector the failure is attributed to, when there is one.
    pub fn selector(&self) -> Option<&Selector> {
        match self {
            WalkError::MissingScope { selector }
            | WalkError::Query { selector, .. }
            | WalkError::ExceptionHandler { selector, .. }
            | WalkError::TaskFailed { selector, .. } => Some(selector),
            _ => None,
        }
    }
}
