//! Port contracts for registry persistence.

mod catalog;
mod error;
mod hub;
mod tool;
mod virtual_server;

pub use catalog::CatalogRepository;
pub use error::{RegistryError, RegistryResult};
pub use hub::HubRepository;
pub use tool::ToolRepository;
pub use virtual_server::VirtualServerRepository;

/// Every registry port implemented by one backing store.
///
/// Services that span several aggregates, such as the reconciliation
/// orchestrators and the proxy router, are generic over this bound.
pub trait RegistryStore:
    CatalogRepository + HubRepository + ToolRepository + VirtualServerRepository + 'static
{
}

impl<T> RegistryStore for T where
    T: CatalogRepository + HubRepository + ToolRepository + VirtualServerRepository + 'static
{
}
