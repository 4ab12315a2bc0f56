//! services/api/src/error.rs
//!
//! Errors that stop the service from starting. Request-time failures never
//! reach this type; handlers turn `CoreError` into an HTTP answer themselves.

use crate::config::ConfigError;
use kitchen_king_core::{error::CoreError, ports::PortError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Restoring the previous session failed (e.g. the stored credential map is unreadable).
    #[error("Could not restore application state: {0}")]
    Core(#[from] CoreError),

    #[error("Storage adapter failed: {0}")]
    Port(#[from] PortError),

    /// Connecting to PostgreSQL or running the embedded migrations failed.
    #[error("PostgreSQL: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Startup failed: {0}")]
    Internal(String),
}
