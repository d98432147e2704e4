// Netgate Core - Lifecycle Logic & Ports
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod application;
pub mod domain;
pub mod port;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
