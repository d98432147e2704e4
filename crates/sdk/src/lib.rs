//! Netgate SDK - Rust Client Library
//!
//! Provides a convenient client for the gateway manager's localhost control plane.
//!
//! # Example
//!
//! ```no_run
//! use netgate_sdk::NetgateClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NetgateClient::connect("http://127.0.0.1:8318")?;
//!
//!     client.connect_free_internet().await?;
//!     println!("connected: {}", client.is_free_internet_connected().await?);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::NetgateClient;
pub use error::{Result, SdkError};
pub use types::ComponentStatus;
