//! Read and edit operations over the global catalog.

use super::{RegistryServiceError, RegistryServiceResult};
use crate::registry::{
    domain::{CatalogServer, CatalogServerId, ServerUrl, Tool, ToolScope, UserId},
    ports::{CatalogRepository, HubRepository, ToolRepository},
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for editing a catalog server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCatalogServerRequest {
    /// Replacement upstream URL.
    pub url: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
}

/// Catalog query and edit service.
#[derive(Clone)]
pub struct CatalogService<R, C>
where
    R: CatalogRepository + HubRepository + ToolRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> CatalogService<R, C>
where
    R: CatalogRepository + HubRepository + ToolRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new catalog service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns every catalog server ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] on persistence failure.
    pub async fn list(&self) -> RegistryServiceResult<Vec<CatalogServer>> {
        Ok(self.repository.list_catalog_servers().await?)
    }

    /// Returns one catalog server.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::CatalogServerNotFound`] when the server
    /// does not exist.
    pub async fn get(&self, server_id: CatalogServerId) -> RegistryServiceResult<CatalogServer> {
        self.repository
            .find_catalog_server(server_id)
            .await?
            .ok_or(RegistryServiceError::CatalogServerNotFound(server_id))
    }

    /// Replaces the URL and/or description of a catalog server.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Validation`] when neither field is
    /// supplied, domain errors for an invalid URL, and
    /// [`RegistryServiceError::CatalogServerNotFound`] for unknown servers.
    pub async fn update_details(
        &self,
        server_id: CatalogServerId,
        request: UpdateCatalogServerRequest,
    ) -> RegistryServiceResult<CatalogServer> {
        if request.url.is_none() && request.description.is_none() {
            return Err(RegistryServiceError::Validation(
                "at least one of url or description is required".to_owned(),
            ));
        }
        let mut server = self.get(server_id).await?;
        let url = match request.url {
            Some(raw) => ServerUrl::new(raw)?,
            None => server.url().clone(),
        };
        let description = request
            .description
            .unwrap_or_else(|| server.description().to_owned());
        server.update_details(url, description, &*self.clock);
        self.repository.update_catalog_server(&server).await?;
        Ok(server)
    }

    /// Returns the tools a catalog server exposes to `user_id`.
    ///
    /// Public servers expose their global tools. Private servers expose the
    /// tools discovered through the caller's own hub binding, or nothing when
    /// the caller is not bound.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::CatalogServerNotFound`] for unknown
    /// servers.
    pub async fn list_tools(
        &self,
        server_id: CatalogServerId,
        user_id: &UserId,
    ) -> RegistryServiceResult<Vec<Tool>> {
        let server = self.get(server_id).await?;
        if server.is_public() {
            return Ok(self
                .repository
                .list_tools_in_scope(server_id, &ToolScope::Global)
                .await?);
        }
        let Some(binding) = self.repository.find_hub_for_user(user_id, server_id).await? else {
            return Ok(Vec::new());
        };
        let scope = ToolScope::Tenant {
            user_id: user_id.clone(),
            hub_server_id: binding.hub.id(),
        };
        Ok(self
            .repository
            .list_tools_in_scope(server_id, &scope)
            .await?)
    }
}
