//! MCP error types.

use rmcp::ErrorData;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("failed to start MCP server: {0}")]
    Initialize(String),

    #[error("MCP server task failed: {0}")]
    Join(String),
}

impl Error {
    /// Map to the JSON-RPC error sent back to the client.
    pub fn to_error_data(&self) -> ErrorData {
        match self {
            Self::InvalidParams(_) | Self::ToolNotFound(_) => {
                ErrorData::invalid_params(self.to_string(), None)
            }
            Self::ToolCallFailed(_) | Self::Initialize(_) | Self::Join(_) => {
                ErrorData::internal_error(self.to_string(), None)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
