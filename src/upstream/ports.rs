//! Port contracts for reaching upstream MCP servers.

use super::domain::{ToolCallResult, UpstreamEndpoint, UpstreamTool};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to an upstream server.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// The transport or the protocol handshake could not be established.
    #[error("failed to connect to {url}: {message}")]
    Connect {
        /// Target URL.
        url: String,
        /// Transport failure description.
        message: String,
    },
    /// An established transport failed mid-request.
    #[error("upstream transport error: {0}")]
    Transport(String),
    /// The upstream answered with a JSON-RPC error object.
    #[error("upstream error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },
    /// The upstream response did not follow the protocol.
    #[error("upstream protocol violation: {0}")]
    Protocol(String),
    /// The operation exceeded its time budget.
    #[error("upstream {operation} timed out after {after:?}")]
    Timeout {
        /// Operation that timed out.
        operation: &'static str,
        /// Budget that was exceeded.
        after: Duration,
    },
    /// The session was used after being closed.
    #[error("upstream session is closed")]
    Closed,
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Opens sessions against upstream servers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamConnector: Send + Sync {
    /// Establishes the transport and completes the protocol handshake.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Connect`] or [`UpstreamError::Timeout`] when
    /// the session cannot be opened.
    async fn connect(&self, endpoint: &UpstreamEndpoint)
    -> UpstreamResult<Box<dyn UpstreamSession>>;
}

/// One open, handshaken connection to an upstream server.
///
/// Callers must invoke [`UpstreamSession::close`] once they are done.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamSession: Send {
    /// Capabilities the server advertised during the handshake.
    fn capabilities(&self) -> &Value;

    /// Lists every tool the server advertises, following pagination.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] on transport or protocol failure.
    async fn list_tools(&mut self) -> UpstreamResult<Vec<UpstreamTool>>;

    /// Invokes one tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] on transport or protocol failure. A tool
    /// that ran and failed is reported through the result's `isError` flag.
    async fn call_tool(&mut self, name: &str, arguments: Value) -> UpstreamResult<ToolCallResult>;

    /// Terminates the session. Failures are logged, never returned.
    async fn close(&mut self);
}
