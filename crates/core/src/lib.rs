//! Concierge Core Library
//!
//! Foundational utilities shared across the concierge workspace:
//! - Error handling (`AppError`, `AppResult`, `ErrorResponse`)
//! - Logging infrastructure
//! - Configuration management
//! - Namespace registry

pub mod config;
pub mod error;
pub mod logging;
pub mod namespace;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorResponse};
pub use namespace::{NamespaceEntry, NamespaceRegistry};
