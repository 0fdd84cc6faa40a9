pub mod config;
pub mod handler;
pub mod scope;

pub use config::{LogSettings, OutputSettings, Settings};
pub use handler::{
    AsyncHandler, AsyncRecovery, ElementHandler, ExceptionHandler, HandlerContext, LogAndFallback,
    SyncHandler, SyncRecovery,
};
pub use scope::Scope;
