//! memos-mcp - MCP server for the Voice Memos bridge
//!
//! Speaks JSON-RPC 2.0 over a [`Transport`] (stdio in production) and
//! forwards `tools/call` requests to the [`Dispatcher`]:
//!
//! ```text
//! Client <-> Transport <-> McpServer <-> Dispatcher
//! ```

pub mod error;
pub mod protocol;
pub mod transport;

use memos_core::{Dispatcher, tool_definitions};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub use error::McpError;
pub use protocol::{JsonRpcResponse, RequestId};
pub use transport::{ChannelTransport, StdioTransport, Transport};

use protocol::{
    CallToolParams, IncomingMessage, InitializeResult, JSONRPC_VERSION, ServerInfo, methods,
};

/// Serves one client, one request at a time
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
    server_info: ServerInfo,
    initialized: bool,
}

impl McpServer {
    pub fn new(dispatcher: Arc<Dispatcher>, name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            server_info: ServerInfo {
                name: name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Process messages until the transport reaches EOF
    pub async fn run<T: Transport>(&mut self, transport: &mut T) -> Result<(), McpError> {
        info!("MCP server '{}' listening", self.server_info.name);

        loop {
            let message = match transport.read_message().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!("Client closed the connection");
                    break;
                }
                Err(e) => {
                    error!("Transport read error: {}", e);
                    break;
                }
            };

            if message.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&message).await {
                let json = serde_json::to_string(&response).map_err(|e| {
                    McpError::Internal(format!("Failed to serialize response: {}", e))
                })?;
                debug!("Sending response: {}", json);
                transport.write_message(&json).await?;
            }
        }

        transport.close().await?;
        info!("MCP server stopped");
        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_message(&mut self, raw: &str) -> Option<JsonRpcResponse> {
        debug!("Received message: {}", raw);

        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable message: {}", e);
                return Some(JsonRpcResponse::failure(
                    RequestId::Null,
                    &McpError::Parse(e.to_string()),
                ));
            }
        };

        let incoming: IncomingMessage = match serde_json::from_value(value) {
            Ok(incoming) => incoming,
            Err(e) => {
                warn!("Malformed request: {}", e);
                return Some(JsonRpcResponse::failure(
                    RequestId::Null,
                    &McpError::InvalidRequest(e.to_string()),
                ));
            }
        };

        let result = if incoming.jsonrpc != JSONRPC_VERSION {
            Err(McpError::InvalidRequest(format!(
                "expected jsonrpc \"2.0\", got \"{}\"",
                incoming.jsonrpc
            )))
        } else {
            self.route(&incoming.method, incoming.params).await
        };

        match (incoming.id, result) {
            (None, Ok(_)) => None,
            (None, Err(e)) => {
                warn!("Notification {} failed: {}", incoming.method, e);
                None
            }
            (Some(id), Ok(value)) => Some(JsonRpcResponse::success(id, value)),
            (Some(id), Err(e)) => {
                warn!("Request {} failed: {}", incoming.method, e);
                Some(JsonRpcResponse::failure(id, &e))
            }
        }
    }

    async fn route(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        match method {
            methods::INITIALIZE => {
                self.initialized = true;
                info!("Client initialized session");
                serde_json::to_value(InitializeResult::new(self.server_info.clone()))
                    .map_err(|e| McpError::Internal(e.to_string()))
            }
            methods::INITIALIZED => Ok(Value::Null),
            methods::PING => Ok(serde_json::json!({})),
            methods::TOOLS_LIST => {
                if !self.initialized {
                    debug!("tools/list before initialize");
                }
                Ok(serde_json::json!({ "tools": tool_definitions() }))
            }
            methods::TOOLS_CALL => {
                if !self.initialized {
                    debug!("tools/call before initialize");
                }
                let call: CallToolParams = serde_json::from_value(params).map_err(|e| {
                    McpError::InvalidParams(format!("Invalid tools/call params: {}", e))
                })?;
                let arguments = call.arguments.unwrap_or_else(|| serde_json::json!({}));
                let response = self.dispatcher.dispatch(&call.name, arguments).await;
                serde_json::to_value(response).map_err(|e| McpError::Internal(e.to_string()))
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }
}
