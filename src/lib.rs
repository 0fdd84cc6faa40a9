pub mod base;
pub mod dom;
pub mod errors;
pub mod report;
pub mod testing;
pub mod types;
pub mod walker;

pub use crate::base::{
    ElementHandler, ExceptionHandler, HandlerContext, LogAndFallback, Scope, Settings,
};
pub use dom::{DomElement, HtmlScope};
pub use errors::{HandlerError, Result, ScopeError, WalkError};
pub use types::*;
pub use walker::{ConcurrentWalker, SequentialWalker, WalkConfig};
