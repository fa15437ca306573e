//! Repository port for materialized tool rows.

use super::RegistryResult;
use crate::registry::domain::{CatalogServerId, Tool, ToolId, ToolScope, UserId};
use async_trait::async_trait;

/// Persistence contract for tool rows.
#[async_trait]
pub trait ToolRepository: Send + Sync {
    /// Finds a tool by identifier.
    async fn find_tool(&self, tool_id: ToolId) -> RegistryResult<Option<Tool>>;

    /// Returns the tools one catalog server published into one scope.
    ///
    /// For [`ToolScope::Tenant`] the hub identifier is ignored and every row
    /// owned by the tenant for that server is returned.
    async fn list_tools_in_scope(
        &self,
        catalog_server_id: CatalogServerId,
        scope: &ToolScope,
    ) -> RegistryResult<Vec<Tool>>;

    /// Returns the modified names stored under the scope's owner by every
    /// catalog server other than `excluding`.
    ///
    /// The owner is the tenant for [`ToolScope::Tenant`] and the shared
    /// catalog for [`ToolScope::Global`]; modified names are unique per owner.
    async fn list_tool_names_owned_by_others(
        &self,
        scope: &ToolScope,
        excluding: CatalogServerId,
    ) -> RegistryResult<Vec<String>>;

    /// Returns the tools a tenant may compose: rows it owns plus global rows
    /// of catalog servers it is bound to, ordered by modified name.
    async fn list_tools_visible_to(&self, user_id: &UserId) -> RegistryResult<Vec<Tool>>;

    /// Inserts and deletes tool rows in one transaction.
    ///
    /// Deleted rows are detached from every virtual server.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::DuplicateToolName`] when an inserted row
    /// collides with an existing one. No rows change on any error.
    async fn apply_tool_changes(&self, insert: &[Tool], delete: &[ToolId]) -> RegistryResult<()>;

    /// Persists a status change.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::ToolNotFound`] when the tool does not
    /// exist.
    async fn update_tool(&self, tool: &Tool) -> RegistryResult<()>;
}
