//! Catalog port for the in-memory registry.

use super::InMemoryRegistry;
use crate::registry::{
    domain::{CatalogServer, CatalogServerId, CatalogServerName, Tool},
    ports::{CatalogRepository, RegistryError, RegistryResult},
};
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
impl CatalogRepository for InMemoryRegistry {
    async fn insert_catalog_server(
        &self,
        server: &CatalogServer,
        tools: &[Tool],
    ) -> RegistryResult<()> {
        let mut state = self.write()?;

        if state
            .catalog
            .values()
            .any(|existing| existing.name() == server.name())
        {
            return Err(RegistryError::DuplicateCatalogServerName(
                server.name().clone(),
            ));
        }
        state.check_tool_names(tools, &HashSet::new())?;

        state.catalog.insert(server.id(), server.clone());
        state.insert_tools(tools);
        Ok(())
    }

    async fn update_catalog_server(&self, server: &CatalogServer) -> RegistryResult<()> {
        let mut state = self.write()?;
        if !state.catalog.contains_key(&server.id()) {
            return Err(RegistryError::CatalogServerNotFound(server.id()));
        }
        state.catalog.insert(server.id(), server.clone());
        Ok(())
    }

    async fn find_catalog_server(
        &self,
        server_id: CatalogServerId,
    ) -> RegistryResult<Option<CatalogServer>> {
        Ok(self.read()?.catalog.get(&server_id).cloned())
    }

    async fn find_catalog_server_by_name(
        &self,
        name: &CatalogServerName,
    ) -> RegistryResult<Option<CatalogServer>> {
        let state = self.read()?;
        Ok(state
            .catalog
            .values()
            .find(|server| server.name() == name)
            .cloned())
    }

    async fn list_catalog_servers(&self) -> RegistryResult<Vec<CatalogServer>> {
        let state = self.read()?;
        let mut servers: Vec<CatalogServer> = state.catalog.values().cloned().collect();
        servers.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(servers)
    }
}
