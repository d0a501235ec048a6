//! MCP server on top of the rmcp SDK.

use std::future::Future;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Identity advertised during initialization.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub instructions: Option<String>,
}

/// Provides the tools a server exposes.
///
/// `call_tool` should report tool-level failures as [`error_result`] or
/// [`Error::ToolCallFailed`]; both reach the client as a result with
/// `isError` set. [`Error::ToolNotFound`] and [`Error::InvalidParams`]
/// become JSON-RPC errors.
pub trait ToolHandler: Send + Sync + 'static {
    /// Tool definitions for tools/list.
    fn tools(&self) -> Vec<Tool>;

    /// Execute a tool call. `arguments` is always a JSON object.
    fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> impl Future<Output = Result<CallToolResult>> + Send;
}

/// An MCP server dispatching tool calls to a [`ToolHandler`].
pub struct Server<H> {
    config: ServerConfig,
    handler: H,
}

impl<H: ToolHandler> Server<H> {
    pub fn new(config: ServerConfig, handler: H) -> Self {
        Self { config, handler }
    }

    /// Serve on the process's stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Result<()> {
        let name = self.config.name.clone();
        let service = self
            .serve(stdio())
            .await
            .map_err(|e| Error::Initialize(e.to_string()))?;
        info!(server = %name, "MCP server listening");

        let reason = service
            .waiting()
            .await
            .map_err(|e| Error::Join(e.to_string()))?;
        info!(server = %name, ?reason, "MCP server stopped");
        Ok(())
    }
}

impl<H: ToolHandler> ServerHandler for Server<H> {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::default();
        server_info.name = self.config.name.clone();
        server_info.version = self.config.version.clone();

        let mut info = ServerInfo::default();
        info.protocol_version = ProtocolVersion::V_2024_11_05;
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = server_info;
        info.instructions = self.config.instructions.clone();
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.handler.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let arguments = Value::Object(request.arguments.unwrap_or_default());

        debug!(tool = %request.name, "calling tool");
        match self.handler.call_tool(&request.name, arguments).await {
            Ok(result) => Ok(result),
            Err(Error::ToolCallFailed(message)) => Ok(error_result(&message)),
            Err(e) => {
                warn!(tool = %request.name, error = %e, "tool call rejected");
                Err(e.to_error_data())
            }
        }
    }
}

/// Tool definition with a JSON Schema for its arguments.
///
/// A schema that is not a JSON object is replaced by an empty one.
pub fn tool_definition(name: &'static str, description: &'static str, schema: Value) -> Tool {
    let schema: JsonObject = match schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(name, description, schema)
}

/// A successful result carrying JSON rendered as text.
pub fn json_result(value: &Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(pretty(value))])
}

/// A tool-level failure carrying JSON rendered as text.
pub fn json_error(value: &Value) -> CallToolResult {
    error_result(&pretty(value))
}

/// A tool-level failure, reported in-band rather than as a JSON-RPC error.
pub fn error_result(message: &str) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message)])
}

/// Concatenated text content of a result.
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.raw.as_text().map(|t| t.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether the result reports a tool-level failure.
pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error == Some(true)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
