//! Application services for catalog, hub, and tool queries.

mod catalog;
mod error;
mod hub;
mod tool;

pub use catalog::{CatalogService, UpdateCatalogServerRequest};
pub use error::{RegistryServiceError, RegistryServiceResult};
pub use hub::HubService;
pub use tool::ToolService;
