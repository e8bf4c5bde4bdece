//! Portal Core - shared types, configuration and provider traits
//!
//! This crate defines the abstractions the session gate is built on: the identity
//! provider and profile store boundaries, the per-request cookie adapter, login
//! surface selection, configuration and logging setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod login;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use login::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
