//! Tool port for the in-memory registry.

use super::InMemoryRegistry;
use crate::registry::{
    domain::{CatalogServerId, Tool, ToolId, ToolScope, UserId},
    ports::{RegistryError, RegistryResult, ToolRepository},
};
use async_trait::async_trait;
use std::collections::HashSet;

fn sorted_by_name(mut tools: Vec<Tool>) -> Vec<Tool> {
    tools.sort_by(|left, right| left.modified_name().cmp(right.modified_name()));
    tools
}

#[async_trait]
impl ToolRepository for InMemoryRegistry {
    async fn find_tool(&self, tool_id: ToolId) -> RegistryResult<Option<Tool>> {
        Ok(self.read()?.tools.get(&tool_id).cloned())
    }

    async fn list_tools_in_scope(
        &self,
        catalog_server_id: CatalogServerId,
        scope: &ToolScope,
    ) -> RegistryResult<Vec<Tool>> {
        let state = self.read()?;
        let owner = scope.user_id();
        Ok(sorted_by_name(
            state
                .tools
                .values()
                .filter(|tool| {
                    tool.catalog_server_id() == catalog_server_id && tool.user_id() == owner
                })
                .cloned()
                .collect(),
        ))
    }

    async fn list_tool_names_owned_by_others(
        &self,
        scope: &ToolScope,
        excluding: CatalogServerId,
    ) -> RegistryResult<Vec<String>> {
        let state = self.read()?;
        let owner = scope.user_id();
        let mut names: Vec<String> = state
            .tools
            .values()
            .filter(|tool| tool.user_id() == owner && tool.catalog_server_id() != excluding)
            .map(|tool| tool.modified_name().to_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn list_tools_visible_to(&self, user_id: &UserId) -> RegistryResult<Vec<Tool>> {
        let state = self.read()?;
        let bound_servers: HashSet<CatalogServerId> = state
            .hubs
            .values()
            .filter(|hub| hub.is_owned_by(user_id))
            .map(|hub| hub.catalog_server_id())
            .collect();
        Ok(sorted_by_name(
            state
                .tools
                .values()
                .filter(|tool| match tool.user_id() {
                    Some(owner) => owner == user_id,
                    None => bound_servers.contains(&tool.catalog_server_id()),
                })
                .cloned()
                .collect(),
        ))
    }

    async fn apply_tool_changes(&self, insert: &[Tool], delete: &[ToolId]) -> RegistryResult<()> {
        let mut state = self.write()?;
        let deleting: HashSet<ToolId> = delete.iter().copied().collect();
        state.check_tool_names(insert, &deleting)?;

        state.remove_tools(&deleting);
        state.insert_tools(insert);
        Ok(())
    }

    async fn update_tool(&self, tool: &Tool) -> RegistryResult<()> {
        let mut state = self.write()?;
        if !state.tools.contains_key(&tool.id()) {
            return Err(RegistryError::ToolNotFound(tool.id()));
        }
        state.tools.insert(tool.id(), tool.clone());
        Ok(())
    }
}
