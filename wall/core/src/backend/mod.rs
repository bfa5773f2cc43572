//! Wall Backend Integration
//!
//! Abstracted access to the wall server through a common trait.
//!
//! # Available Backends
//!
//! - **HTTP**: the wall server's JSON API (default)
//! - **Memory**: an in-process server for demo mode and tests
//!
//! # Usage
//!
//! ```ignore
//! use driftwall_core::backend::{HttpBackend, WallBackend};
//! use driftwall_core::config::ServerConfig;
//!
//! let backend = HttpBackend::new(&ServerConfig::default())?;
//! let entries = backend.list_since(0).await?;
//! ```

mod http;
mod memory;
mod traits;

pub use http::HttpBackend;
pub use memory::{sanitize, MemoryBackend, RevealPolicy, MAX_NAME_CHARS, MAX_TEXT_CHARS};
pub use traits::{BackendError, WallBackend};
