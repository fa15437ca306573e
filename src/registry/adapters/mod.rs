//! Adapter implementations for the registry ports.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRegistry;
pub use postgres::{PostgresRegistry, RegistryPgPool};
