//! Upstream Protocol Client.
//!
//! Every operation opens a fresh session, performs the MCP handshake, runs
//! one request and closes the session again, so no connection state is
//! shared between tenants or calls.

pub mod adapters;
mod client;
mod domain;
mod ports;

pub use client::{DEFAULT_CALL_TIMEOUT, UpstreamClient};
pub use domain::{
    DiscoveredServer, ToolCallResult, UpstreamEndpoint, UpstreamHeaders, UpstreamTool,
    empty_object_schema,
};
#[cfg(test)]
pub use ports::{MockUpstreamConnector, MockUpstreamSession};
pub use ports::{UpstreamConnector, UpstreamError, UpstreamResult, UpstreamSession};
