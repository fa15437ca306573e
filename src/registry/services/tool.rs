//! Listing and soft-deletion of materialized tools.

use super::{RegistryServiceError, RegistryServiceResult};
use crate::registry::{
    domain::{RecordStatus, Tool, ToolFilter, ToolId, UserId},
    ports::{HubRepository, ToolRepository},
};
use mockable::Clock;
use std::sync::Arc;

/// Tool query and status service.
#[derive(Clone)]
pub struct ToolService<R, C>
where
    R: ToolRepository + HubRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ToolService<R, C>
where
    R: ToolRepository + HubRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new tool service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the tools visible to `user_id`, narrowed by `filter`.
    ///
    /// A hub filter naming a binding the caller does not own yields no tools.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] on persistence failure.
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: &ToolFilter,
    ) -> RegistryServiceResult<Vec<Tool>> {
        let hub_catalog_server = match filter.hub_server_id {
            Some(hub_id) => {
                let hub = self.repository.find_hub(hub_id).await?;
                match hub {
                    Some(owned) if owned.is_owned_by(user_id) => Some(owned.catalog_server_id()),
                    _ => return Ok(Vec::new()),
                }
            }
            None => None,
        };
        let visible = self.repository.list_tools_visible_to(user_id).await?;
        Ok(visible
            .into_iter()
            .filter(|tool| filter.matches(tool) && filter.matches_hub(tool, hub_catalog_server))
            .collect())
    }

    /// Returns one tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::ToolNotFound`] for unknown tools.
    pub async fn get(&self, tool_id: ToolId) -> RegistryServiceResult<Tool> {
        self.repository
            .find_tool(tool_id)
            .await?
            .ok_or(RegistryServiceError::ToolNotFound(tool_id))
    }

    /// Changes a tool's status.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::ToolNotFound`] for unknown tools.
    pub async fn set_status(
        &self,
        tool_id: ToolId,
        status: RecordStatus,
    ) -> RegistryServiceResult<Tool> {
        let mut tool = self.get(tool_id).await?;
        tool.set_status(status, &*self.clock);
        self.repository.update_tool(&tool).await?;
        Ok(tool)
    }

    /// Soft-deletes a tool by marking it deactivated. The row is kept so
    /// refreshes do not resurrect it under a new identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::ToolNotFound`] for unknown tools.
    pub async fn deactivate(&self, tool_id: ToolId) -> RegistryServiceResult<Tool> {
        self.set_status(tool_id, RecordStatus::Deactivated).await
    }
}
