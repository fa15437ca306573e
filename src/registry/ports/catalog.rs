//! Repository port for the global catalog of upstream servers.

use super::RegistryResult;
use crate::registry::domain::{CatalogServer, CatalogServerId, CatalogServerName, Tool};
use async_trait::async_trait;

/// Persistence contract for catalog servers.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Stores a new catalog server together with its discovered tools in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::DuplicateCatalogServerName`] when the
    /// name is taken. No rows are written on any error.
    async fn insert_catalog_server(
        &self,
        server: &CatalogServer,
        tools: &[Tool],
    ) -> RegistryResult<()>;

    /// Persists URL, description, capabilities, and timestamp changes.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::CatalogServerNotFound`] when the server
    /// does not exist.
    async fn update_catalog_server(&self, server: &CatalogServer) -> RegistryResult<()>;

    /// Finds a catalog server by identifier.
    async fn find_catalog_server(
        &self,
        server_id: CatalogServerId,
    ) -> RegistryResult<Option<CatalogServer>>;

    /// Finds a catalog server by its unique name.
    async fn find_catalog_server_by_name(
        &self,
        name: &CatalogServerName,
    ) -> RegistryResult<Option<CatalogServer>>;

    /// Returns every catalog server ordered by name.
    async fn list_catalog_servers(&self) -> RegistryResult<Vec<CatalogServer>>;
}
