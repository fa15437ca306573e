//! Repository port for tenant hub bindings.

use super::RegistryResult;
use crate::registry::domain::{
    CatalogServerId, HubServer, HubServerId, HubWithServer, Tool, UserId,
};
use async_trait::async_trait;

/// Persistence contract for hub bindings.
#[async_trait]
pub trait HubRepository: Send + Sync {
    /// Stores a new hub binding together with the tenant-scoped tools it
    /// discovered in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::DuplicateHub`] when the tenant is
    /// already bound to the catalog server and
    /// [`super::RegistryError::CatalogServerNotFound`] when the server is
    /// missing. No rows are written on any error.
    async fn insert_hub(&self, hub: &HubServer, tools: &[Tool]) -> RegistryResult<()>;

    /// Persists status, capabilities, and timestamp changes.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::HubNotFound`] when the binding does not
    /// exist.
    async fn update_hub(&self, hub: &HubServer) -> RegistryResult<()>;

    /// Finds a hub binding by identifier.
    async fn find_hub(&self, hub_id: HubServerId) -> RegistryResult<Option<HubServer>>;

    /// Finds a hub binding joined with its catalog server.
    async fn find_hub_with_server(
        &self,
        hub_id: HubServerId,
    ) -> RegistryResult<Option<HubWithServer>>;

    /// Finds the tenant's binding to a catalog server.
    async fn find_hub_for_user(
        &self,
        user_id: &UserId,
        catalog_server_id: CatalogServerId,
    ) -> RegistryResult<Option<HubWithServer>>;

    /// Returns every binding owned by the tenant.
    async fn list_hubs_for_user(&self, user_id: &UserId) -> RegistryResult<Vec<HubWithServer>>;

    /// Deletes a binding and every tool it discovered, detaching those tools
    /// from virtual servers.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::HubNotFound`] when the binding does not
    /// exist.
    async fn delete_hub(&self, hub_id: HubServerId) -> RegistryResult<()>;
}
