//! HTTP Control Plane
//!
//! Plain-text HTTP server for the Netgate manager. Every request is resolved
//! through the shared dispatch table, so routes added by components after
//! the server started are served immediately.

pub mod error;
pub mod handler;
pub mod server;

pub use error::ServerError;
pub use server::{HttpServer, HttpServerConfig, ServerHandle};
