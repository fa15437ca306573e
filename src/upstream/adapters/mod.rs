//! Upstream connector implementations.

pub mod http;
pub mod memory;

pub use http::{HttpUpstreamConnector, HttpUpstreamSettings};
pub use memory::{InMemoryUpstream, RecordedCall, RecordedConnection};
