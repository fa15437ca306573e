//! Toolgate: a multi-tenant MCP tool gateway.
//!
//! Operators register upstream MCP servers in a global catalog. Tenants bind
//! to those servers with their own credentials, the gateway materializes the
//! tools each server advertises, and tenants bundle tools into virtual
//! servers that are exposed as MCP endpoints of their own. Every proxied call
//! is authorized against the owner's binding and forwarded upstream with the
//! owner's credentials.
//!
//! # Architecture
//!
//! Toolgate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and upstream I/O
//! - **Adapters**: `PostgreSQL`, in-memory, and streamable-HTTP
//!   implementations of those ports
//!
//! # Modules
//!
//! - [`registry`]: catalog servers, hub bindings, tools and virtual servers
//! - [`vault`]: credential encryption and outbound header construction
//! - [`upstream`]: the MCP client used for discovery and tool calls
//! - [`reconciliation`]: keeps stored tools in line with upstream servers
//! - [`composer`]: tenant-owned virtual server bundles
//! - [`gateway`]: the per-virtual-server MCP endpoint and proxy router
//! - [`http`]: the administrative REST surface
//! - [`config`], [`telemetry`]: startup configuration and tracing

pub mod composer;
pub mod config;
pub mod gateway;
pub mod http;
pub mod reconciliation;
pub mod registry;
pub mod telemetry;
pub mod upstream;
pub mod vault;
