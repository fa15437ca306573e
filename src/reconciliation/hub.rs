//! Tenant-scoped discovery through hub bindings.

use super::{ReconciliationError, ReconciliationResult, RefreshOutcome, ToolDiff, naming};
use crate::{
    registry::{
        domain::{
            AuthType, CatalogServer, CatalogServerId, HubServer, HubServerDraft, HubServerId,
            HubStatus, Tool, ToolScope, UserId,
        },
        ports::{CatalogRepository, HubRepository, ToolRepository},
    },
    upstream::{UpstreamClient, UpstreamConnector, UpstreamEndpoint},
    vault::{CredentialVault, build_headers},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Request payload for binding a tenant to a catalog server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddHubRequest {
    /// Tenant creating the binding.
    pub user_id: UserId,
    /// Catalog server to bind.
    pub catalog_server_id: CatalogServerId,
    /// Credential kind.
    pub auth_type: AuthType,
    /// Cleartext credential as supplied by the tenant.
    pub auth_value: Option<Value>,
}

/// A newly created hub binding with the tenant tools it discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredHub {
    /// Stored binding.
    pub hub: HubServer,
    /// Bound catalog server.
    pub server: CatalogServer,
    /// Stored tenant tools; empty for public servers.
    pub tools: Vec<Tool>,
}

/// Adds and refreshes hub bindings and their tenant-scoped tools.
pub struct HubOrchestrator<R, U, C>
where
    R: CatalogRepository + HubRepository + ToolRepository,
    U: UpstreamConnector,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    upstream: UpstreamClient<U>,
    vault: Option<Arc<CredentialVault>>,
    clock: Arc<C>,
}

impl<R, U, C> Clone for HubOrchestrator<R, U, C>
where
    R: CatalogRepository + HubRepository + ToolRepository,
    U: UpstreamConnector,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            upstream: self.upstream.clone(),
            vault: self.vault.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, U, C> HubOrchestrator<R, U, C>
where
    R: CatalogRepository + HubRepository + ToolRepository,
    U: UpstreamConnector,
    C: Clock + Send + Sync,
{
    /// Creates a hub orchestrator. Without a vault, credentials are stored
    /// in cleartext.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        upstream: UpstreamClient<U>,
        vault: Option<Arc<CredentialVault>>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            upstream,
            vault,
            clock,
        }
    }

    fn endpoint_for(&self, hub: &HubServer, server: &CatalogServer) -> UpstreamEndpoint {
        let headers = build_headers(hub.auth_type(), hub.auth_value(), self.vault.as_deref());
        UpstreamEndpoint::new(server.url().as_str(), headers)
    }

    /// Binds a tenant to a catalog server.
    ///
    /// The credential is validated and sealed first. Private servers are then
    /// discovered with the tenant's headers; public servers already have
    /// global tools and are not contacted. The binding and its tools are
    /// stored in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::CatalogServerNotFound`],
    /// [`ReconciliationError::DuplicateHub`] before any network call, domain
    /// errors for an invalid credential, vault errors, upstream errors, and
    /// repository errors. Nothing is stored on any error.
    #[instrument(
        skip_all,
        fields(user_id = %request.user_id, catalog_server_id = %request.catalog_server_id)
    )]
    pub async fn add(&self, request: AddHubRequest) -> ReconciliationResult<RegisteredHub> {
        let server = self
            .repository
            .find_catalog_server(request.catalog_server_id)
            .await?
            .ok_or(ReconciliationError::CatalogServerNotFound(
                request.catalog_server_id,
            ))?;
        if self
            .repository
            .find_hub_for_user(&request.user_id, server.id())
            .await?
            .is_some()
        {
            return Err(ReconciliationError::DuplicateHub(server.id()));
        }
        let credential = request.auth_type.normalize_value(request.auth_value)?;
        let stored = match (credential, self.vault.as_deref()) {
            (Some(cleartext), Some(vault)) => Some(vault.seal_value(&cleartext)?),
            (other, _) => other,
        };
        let mut hub = HubServer::new(
            HubServerDraft {
                user_id: request.user_id,
                catalog_server_id: server.id(),
                auth_type: request.auth_type,
                auth_value: stored,
            },
            &*self.clock,
        );
        let tools = if server.is_public() {
            info!("public catalog server; global tools already exist");
            Vec::new()
        } else {
            let discovered = self.upstream.discover(&self.endpoint_for(&hub, &server)).await?;
            hub.record_capabilities(discovered.capabilities, &*self.clock);
            let scope = ToolScope::Tenant {
                user_id: hub.user_id().clone(),
                hub_server_id: hub.id(),
            };
            let reserved = naming::reserved_names(&*self.repository, &scope, server.id()).await?;
            naming::materialize(&server, &scope, &discovered.tools, reserved, &*self.clock)?
        };
        self.repository.insert_hub(&hub, &tools).await?;
        info!(hub_id = %hub.id(), tool_count = tools.len(), "hub added");
        Ok(RegisteredHub { hub, server, tools })
    }

    /// Reconciles the tenant tools of a private hub binding with upstream.
    ///
    /// A failed discovery marks an active binding unreachable; a later
    /// successful refresh marks it active again. Deactivated bindings keep
    /// their status.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::HubNotFound`],
    /// [`ReconciliationError::Forbidden`] when `user_id` does not own the
    /// binding, upstream errors before anything is written, and repository
    /// errors, in which case the tool changes are rolled back.
    #[instrument(skip_all, fields(%user_id, %hub_id))]
    pub async fn refresh(
        &self,
        user_id: &UserId,
        hub_id: HubServerId,
    ) -> ReconciliationResult<RefreshOutcome> {
        let binding = self
            .repository
            .find_hub_with_server(hub_id)
            .await?
            .ok_or(ReconciliationError::HubNotFound(hub_id))?;
        if !binding.hub.is_owned_by(user_id) {
            return Err(ReconciliationError::Forbidden(hub_id));
        }
        let mut hub = binding.hub;
        let server = binding.server;
        if server.is_public() {
            info!("public catalog server tools are managed globally; skipping refresh");
            return Ok(RefreshOutcome::default());
        }
        let listed = match self.upstream.list_tools(&self.endpoint_for(&hub, &server)).await {
            Ok(listed) => listed,
            Err(err) => {
                if hub.status() == HubStatus::Active {
                    self.mark_status(&mut hub, HubStatus::Unreachable).await;
                }
                return Err(err.into());
            }
        };
        let scope = ToolScope::Tenant {
            user_id: user_id.clone(),
            hub_server_id: hub.id(),
        };
        let reserved = naming::reserved_names(&*self.repository, &scope, server.id()).await?;
        let desired = naming::materialize(&server, &scope, &listed, reserved, &*self.clock)?;
        let current = self
            .repository
            .list_tools_in_scope(server.id(), &scope)
            .await?;
        let diff = ToolDiff::compute(desired, current);
        self.repository
            .apply_tool_changes(&diff.to_insert, &diff.delete_ids())
            .await?;
        if hub.status() == HubStatus::Unreachable {
            self.mark_status(&mut hub, HubStatus::Active).await;
        }
        info!(
            added = diff.to_insert.len(),
            deleted = diff.to_delete.len(),
            "hub refreshed"
        );
        Ok(diff.into())
    }

    async fn mark_status(&self, hub: &mut HubServer, status: HubStatus) {
        hub.set_status(status, &*self.clock);
        if let Err(err) = self.repository.update_hub(hub).await {
            warn!(error = %err, status = status.as_str(), "failed to record hub status");
        }
    }
}
