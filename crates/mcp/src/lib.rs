//! MCP (Model Context Protocol) server library.
//!
//! This crate serves tools to MCP clients over stdio using the official
//! rmcp SDK. Implement [`ToolHandler`] and hand it to a [`Server`].
//!
//! # Example
//!
//! ```no_run
//! use mcp::{CallToolResult, Server, ServerConfig, Tool, ToolHandler};
//! use serde_json::{Value, json};
//!
//! struct Status;
//!
//! impl ToolHandler for Status {
//!     fn tools(&self) -> Vec<Tool> {
//!         vec![mcp::tool_definition(
//!             "status",
//!             "Report server status",
//!             json!({"type": "object", "properties": {}}),
//!         )]
//!     }
//!
//!     async fn call_tool(&self, name: &str, _arguments: Value) -> mcp::Result<CallToolResult> {
//!         match name {
//!             "status" => Ok(mcp::json_result(&json!({"status": "online"}))),
//!             other => Err(mcp::Error::ToolNotFound(other.to_string())),
//!         }
//!     }
//! }
//!
//! # async fn example() -> mcp::Result<()> {
//! let config = ServerConfig {
//!     name: "status".to_string(),
//!     version: "0.1.0".to_string(),
//!     instructions: None,
//! };
//! Server::new(config, Status).serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod server;

pub use error::{Error, Result};
pub use rmcp::model::{CallToolResult, Tool};
pub use server::{
    Server, ServerConfig, ToolHandler, error_result, is_error, json_error, json_result,
    result_text, tool_definition,
};
