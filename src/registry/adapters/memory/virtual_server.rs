//! Virtual server port for the in-memory registry.

use super::{InMemoryRegistry, RegistryState};
use crate::registry::{
    domain::{Tool, ToolId, UserId, VirtualServer, VirtualServerId, dedupe_tool_ids},
    ports::{RegistryError, RegistryResult, VirtualServerRepository},
};
use async_trait::async_trait;

impl RegistryState {
    fn check_attachable(&self, tool_ids: &[ToolId], require_active: bool) -> RegistryResult<()> {
        for tool_id in tool_ids {
            let tool = self
                .tools
                .get(tool_id)
                .ok_or(RegistryError::ToolNotFound(*tool_id))?;
            if require_active && !tool.status().is_active() {
                return Err(RegistryError::ToolNotActive(*tool_id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VirtualServerRepository for InMemoryRegistry {
    async fn insert_virtual_server(
        &self,
        server: &VirtualServer,
        tool_ids: &[ToolId],
    ) -> RegistryResult<()> {
        let mut state = self.write()?;
        let attached = dedupe_tool_ids(tool_ids);
        state.check_attachable(&attached, true)?;

        state.virtual_servers.insert(server.id(), server.clone());
        state.attachments.insert(server.id(), attached);
        Ok(())
    }

    async fn update_virtual_server(&self, server: &VirtualServer) -> RegistryResult<()> {
        let mut state = self.write()?;
        if !state.virtual_servers.contains_key(&server.id()) {
            return Err(RegistryError::VirtualServerNotFound(server.id()));
        }
        state.virtual_servers.insert(server.id(), server.clone());
        Ok(())
    }

    async fn find_virtual_server(
        &self,
        server_id: VirtualServerId,
    ) -> RegistryResult<Option<VirtualServer>> {
        Ok(self.read()?.virtual_servers.get(&server_id).cloned())
    }

    async fn list_virtual_servers_for_user(
        &self,
        user_id: &UserId,
    ) -> RegistryResult<Vec<VirtualServer>> {
        let state = self.read()?;
        let mut servers: Vec<VirtualServer> = state
            .virtual_servers
            .values()
            .filter(|server| server.is_owned_by(user_id))
            .cloned()
            .collect();
        servers.sort_by_key(VirtualServer::created_at);
        Ok(servers)
    }

    async fn list_attached_tools(&self, server_id: VirtualServerId) -> RegistryResult<Vec<Tool>> {
        let state = self.read()?;
        let tools = state
            .attachments
            .get(&server_id)
            .map(|attached| {
                attached
                    .iter()
                    .filter_map(|tool_id| state.tools.get(tool_id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(tools)
    }

    async fn replace_attached_tools(
        &self,
        server_id: VirtualServerId,
        tool_ids: &[ToolId],
    ) -> RegistryResult<()> {
        let mut state = self.write()?;
        if !state.virtual_servers.contains_key(&server_id) {
            return Err(RegistryError::VirtualServerNotFound(server_id));
        }
        let attached = dedupe_tool_ids(tool_ids);
        state.check_attachable(&attached, false)?;

        state.attachments.insert(server_id, attached);
        Ok(())
    }

    async fn detach_tool(
        &self,
        server_id: VirtualServerId,
        tool_id: ToolId,
    ) -> RegistryResult<()> {
        let mut state = self.write()?;
        if let Some(attached) = state.attachments.get_mut(&server_id) {
            attached.retain(|id| *id != tool_id);
        }
        Ok(())
    }

    async fn delete_virtual_server(&self, server_id: VirtualServerId) -> RegistryResult<()> {
        let mut state = self.write()?;
        if state.virtual_servers.remove(&server_id).is_none() {
            return Err(RegistryError::VirtualServerNotFound(server_id));
        }
        state.attachments.remove(&server_id);
        Ok(())
    }
}
