//! Catalog and hub registry for the gateway.
//!
//! The registry records the global catalog of upstream MCP servers, each
//! tenant's hub bindings to them, the tools materialized from discovery, and
//! the virtual servers tenants compose from those tools. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Query services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
