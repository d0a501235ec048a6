//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An explicitly requested config file does not exist.
    #[error("config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration is invalid or missing required fields.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The flight-data provider could not be set up.
    #[error(transparent)]
    Provider(#[from] itinerary::ProviderError),

    /// The MCP server failed.
    #[error(transparent)]
    Mcp(#[from] mcp::Error),

    /// A tool returned an error result.
    #[error("{0}")]
    Tool(String),
}

pub type Result<T> = std::result::Result<T, Error>;
