//! Hub port for the in-memory registry.

use super::InMemoryRegistry;
use crate::registry::{
    domain::{CatalogServerId, HubServer, HubServerId, HubWithServer, Tool, ToolId, UserId},
    ports::{HubRepository, RegistryError, RegistryResult},
};
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
impl HubRepository for InMemoryRegistry {
    async fn insert_hub(&self, hub: &HubServer, tools: &[Tool]) -> RegistryResult<()> {
        let mut state = self.write()?;

        if !state.catalog.contains_key(&hub.catalog_server_id()) {
            return Err(RegistryError::CatalogServerNotFound(
                hub.catalog_server_id(),
            ));
        }
        let duplicate = state.hubs.values().any(|existing| {
            existing.user_id() == hub.user_id()
                && existing.catalog_server_id() == hub.catalog_server_id()
        });
        if duplicate {
            return Err(RegistryError::DuplicateHub {
                user_id: hub.user_id().clone(),
                catalog_server_id: hub.catalog_server_id(),
            });
        }
        state.check_tool_names(tools, &HashSet::new())?;

        state.hubs.insert(hub.id(), hub.clone());
        state.insert_tools(tools);
        Ok(())
    }

    async fn update_hub(&self, hub: &HubServer) -> RegistryResult<()> {
        let mut state = self.write()?;
        if !state.hubs.contains_key(&hub.id()) {
            return Err(RegistryError::HubNotFound(hub.id()));
        }
        state.hubs.insert(hub.id(), hub.clone());
        Ok(())
    }

    async fn find_hub(&self, hub_id: HubServerId) -> RegistryResult<Option<HubServer>> {
        Ok(self.read()?.hubs.get(&hub_id).cloned())
    }

    async fn find_hub_with_server(
        &self,
        hub_id: HubServerId,
    ) -> RegistryResult<Option<HubWithServer>> {
        let state = self.read()?;
        state
            .hubs
            .get(&hub_id)
            .map(|hub| state.join_hub(hub))
            .transpose()
    }

    async fn find_hub_for_user(
        &self,
        user_id: &UserId,
        catalog_server_id: CatalogServerId,
    ) -> RegistryResult<Option<HubWithServer>> {
        let state = self.read()?;
        state
            .hubs
            .values()
            .find(|hub| hub.user_id() == user_id && hub.catalog_server_id() == catalog_server_id)
            .map(|hub| state.join_hub(hub))
            .transpose()
    }

    async fn list_hubs_for_user(&self, user_id: &UserId) -> RegistryResult<Vec<HubWithServer>> {
        let state = self.read()?;
        let mut hubs = state
            .hubs
            .values()
            .filter(|hub| hub.is_owned_by(user_id))
            .map(|hub| state.join_hub(hub))
            .collect::<RegistryResult<Vec<_>>>()?;
        hubs.sort_by(|left, right| left.server.name().as_str().cmp(right.server.name().as_str()));
        Ok(hubs)
    }

    async fn delete_hub(&self, hub_id: HubServerId) -> RegistryResult<()> {
        let mut state = self.write()?;
        if state.hubs.remove(&hub_id).is_none() {
            return Err(RegistryError::HubNotFound(hub_id));
        }
        let discovered: HashSet<ToolId> = state
            .tools
            .values()
            .filter(|tool| tool.hub_server_id() == Some(hub_id))
            .map(Tool::id)
            .collect();
        state.remove_tools(&discovered);
        Ok(())
    }
}
