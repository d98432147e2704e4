// Domain Layer - Shared state objects and value types

pub mod config;
pub mod dispatch;
pub mod escalation;
pub mod process;

// Re-exports
pub use config::GatewayConfig;
pub use dispatch::{
    handler_fn, DispatchTable, Handler, HandlerRequest, HandlerResponse, Route, RouteKey,
};
pub use escalation::EscalationSwitch;
pub use process::{CallbackError, ExitCallback, ProcessExit, ProcessHandle};
