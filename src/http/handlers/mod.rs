//! Administrative route handlers, one module per resource.

pub mod catalog;
pub mod hubs;
pub mod tools;
pub mod virtual_servers;
