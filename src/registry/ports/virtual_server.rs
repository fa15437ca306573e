//! Repository port for virtual servers and their tool attachments.

use super::RegistryResult;
use crate::registry::domain::{Tool, ToolId, UserId, VirtualServer, VirtualServerId};
use async_trait::async_trait;

/// Persistence contract for virtual servers.
#[async_trait]
pub trait VirtualServerRepository: Send + Sync {
    /// Stores a new virtual server and attaches `tool_ids` in order, in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::ToolNotFound`] or
    /// [`super::RegistryError::ToolNotActive`] when any tool cannot be
    /// attached. No rows are written on any error.
    async fn insert_virtual_server(
        &self,
        server: &VirtualServer,
        tool_ids: &[ToolId],
    ) -> RegistryResult<()>;

    /// Persists status and timestamp changes.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::VirtualServerNotFound`] when the server
    /// does not exist.
    async fn update_virtual_server(&self, server: &VirtualServer) -> RegistryResult<()>;

    /// Finds a virtual server by identifier.
    async fn find_virtual_server(
        &self,
        server_id: VirtualServerId,
    ) -> RegistryResult<Option<VirtualServer>>;

    /// Returns the tenant's virtual servers ordered by creation time.
    async fn list_virtual_servers_for_user(
        &self,
        user_id: &UserId,
    ) -> RegistryResult<Vec<VirtualServer>>;

    /// Returns the attached tools in attachment order.
    async fn list_attached_tools(&self, server_id: VirtualServerId) -> RegistryResult<Vec<Tool>>;

    /// Replaces every attachment with `tool_ids` in order, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::VirtualServerNotFound`] or
    /// [`super::RegistryError::ToolNotFound`]. Attachments are unchanged on
    /// any error.
    async fn replace_attached_tools(
        &self,
        server_id: VirtualServerId,
        tool_ids: &[ToolId],
    ) -> RegistryResult<()>;

    /// Detaches one tool. Detaching a tool that is not attached is a no-op.
    async fn detach_tool(&self, server_id: VirtualServerId, tool_id: ToolId)
    -> RegistryResult<()>;

    /// Deletes a virtual server and its attachments.
    ///
    /// # Errors
    ///
    /// Returns [`super::RegistryError::VirtualServerNotFound`] when the server
    /// does not exist.
    async fn delete_virtual_server(&self, server_id: VirtualServerId) -> RegistryResult<()>;
}
