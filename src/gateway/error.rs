//! Errors raised while proxying protocol calls.

use crate::{
    registry::{
        domain::{CatalogServerId, VirtualServerId},
        ports::RegistryError,
    },
    upstream::UpstreamError,
};
use rmcp::model::{ErrorCode, ErrorData};
use thiserror::Error;

/// JSON-RPC code for a tool name the virtual server does not expose.
pub const TOOL_NOT_FOUND: ErrorCode = ErrorCode(-32002);
/// JSON-RPC code for a call the virtual server's owner may not make.
pub const UNAUTHORIZED: ErrorCode = ErrorCode(-32001);
/// JSON-RPC code for a failure reported by or on the way to the upstream.
pub const UPSTREAM_FAILURE: ErrorCode = ErrorCode(-32003);

/// Failures of the proxy router.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No attached tool has the requested name.
    #[error("tool not found: {0}")]
    ToolNotFound(String),
    /// The virtual server does not exist.
    #[error("virtual server {0} not found")]
    VirtualServerNotFound(VirtualServerId),
    /// The virtual server's owner has no hub binding to the tool's server.
    #[error("virtual server owner is not bound to catalog server {catalog_server_id}")]
    Unauthorized {
        /// Catalog server the tool belongs to.
        catalog_server_id: CatalogServerId,
    },
    /// The upstream call failed.
    #[error("upstream call failed: {0}")]
    Upstream(#[from] UpstreamError),
    /// The registry could not be read.
    #[error(transparent)]
    Repository(#[from] RegistryError),
}

impl ProxyError {
    /// JSON-RPC error code reported to the caller.
    #[must_use]
    pub const fn rpc_code(&self) -> ErrorCode {
        match self {
            Self::ToolNotFound(_) => TOOL_NOT_FOUND,
            Self::VirtualServerNotFound(_) => ErrorCode::INVALID_PARAMS,
            Self::Unauthorized { .. } => UNAUTHORIZED,
            Self::Upstream(_) => UPSTREAM_FAILURE,
            Self::Repository(_) => ErrorCode::INTERNAL_ERROR,
        }
    }
}

impl From<&ProxyError> for ErrorData {
    fn from(err: &ProxyError) -> Self {
        let message = match err {
            ProxyError::Repository(_) => "internal error".to_owned(),
            other => other.to_string(),
        };
        Self::new(err.rpc_code(), message, None)
    }
}
