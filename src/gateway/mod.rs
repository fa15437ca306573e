//! Virtual Server Gateway.
//!
//! Exposes every virtual server as its own MCP endpoint. The proxy router
//! resolves each call against the registry on every request, authorizes it
//! through the owner's hub binding and forwards it upstream with freshly
//! built credential headers.

mod endpoint;
mod error;
mod router;
mod service;

pub use endpoint::mcp_routes;
pub use error::{ProxyError, TOOL_NOT_FOUND, UNAUTHORIZED, UPSTREAM_FAILURE};
pub use router::{ExposedTool, ProxyRouter};
pub use service::{SUPPORTED_PROTOCOL_VERSIONS, VirtualServerService, negotiate_protocol_version};
