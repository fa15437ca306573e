//! Owner-checked operations over a tenant's hub bindings.

use super::{RegistryServiceError, RegistryServiceResult};
use crate::registry::{
    domain::{HubServerId, HubStatus, HubWithServer, UserId},
    ports::HubRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Hub binding service.
#[derive(Clone)]
pub struct HubService<R, C>
where
    R: HubRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> HubService<R, C>
where
    R: HubRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new hub service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the caller's bindings joined with their catalog servers.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] on persistence failure.
    pub async fn list_for_user(&self, user_id: &UserId) -> RegistryServiceResult<Vec<HubWithServer>> {
        Ok(self.repository.list_hubs_for_user(user_id).await?)
    }

    /// Returns one binding owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::HubNotFound`] for unknown bindings and
    /// [`RegistryServiceError::Forbidden`] when another tenant owns it.
    pub async fn get(
        &self,
        user_id: &UserId,
        hub_id: HubServerId,
    ) -> RegistryServiceResult<HubWithServer> {
        let binding = self
            .repository
            .find_hub_with_server(hub_id)
            .await?
            .ok_or(RegistryServiceError::HubNotFound(hub_id))?;
        if !binding.hub.is_owned_by(user_id) {
            return Err(RegistryServiceError::Forbidden(hub_id));
        }
        Ok(binding)
    }

    /// Changes the status of a binding owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::get`] and repository failures.
    pub async fn set_status(
        &self,
        user_id: &UserId,
        hub_id: HubServerId,
        status: HubStatus,
    ) -> RegistryServiceResult<HubWithServer> {
        let mut binding = self.get(user_id, hub_id).await?;
        binding.hub.set_status(status, &*self.clock);
        self.repository.update_hub(&binding.hub).await?;
        Ok(binding)
    }

    /// Deletes a binding owned by the caller together with its tools.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::get`] and repository failures.
    pub async fn delete(&self, user_id: &UserId, hub_id: HubServerId) -> RegistryServiceResult<()> {
        self.get(user_id, hub_id).await?;
        self.repository.delete_hub(hub_id).await?;
        info!(%hub_id, "hub binding deleted");
        Ok(())
    }
}
