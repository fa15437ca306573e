//! Catalog-wide discovery for public servers.

use super::{ReconciliationError, ReconciliationResult, RefreshOutcome, ToolDiff, naming};
use crate::{
    registry::{
        domain::{
            AccessType, CatalogServer, CatalogServerDraft, CatalogServerId, CatalogServerName,
            ServerUrl, Tool, ToolScope,
        },
        ports::{CatalogRepository, ToolRepository},
    },
    upstream::{UpstreamClient, UpstreamConnector, UpstreamEndpoint},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Request payload for registering a catalog server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCatalogServerRequest {
    /// Unique server name.
    pub name: String,
    /// Upstream MCP endpoint.
    pub url: String,
    /// Operator-facing description.
    pub description: String,
    /// Transport label; `None` selects the default.
    pub transport: Option<String>,
    /// Shared or per-tenant access.
    pub access_type: AccessType,
}

/// A newly registered catalog server with the global tools it published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCatalogServer {
    /// Stored server.
    pub server: CatalogServer,
    /// Stored global tools; empty for private servers.
    pub tools: Vec<Tool>,
}

/// Adds and refreshes catalog servers and their shared tools.
pub struct CatalogOrchestrator<R, U, C>
where
    R: CatalogRepository + ToolRepository,
    U: UpstreamConnector,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    upstream: UpstreamClient<U>,
    clock: Arc<C>,
}

impl<R, U, C> Clone for CatalogOrchestrator<R, U, C>
where
    R: CatalogRepository + ToolRepository,
    U: UpstreamConnector,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            upstream: self.upstream.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, U, C> CatalogOrchestrator<R, U, C>
where
    R: CatalogRepository + ToolRepository,
    U: UpstreamConnector,
    C: Clock + Send + Sync,
{
    /// Creates a catalog orchestrator.
    #[must_use]
    pub const fn new(repository: Arc<R>, upstream: UpstreamClient<U>, clock: Arc<C>) -> Self {
        Self {
            repository,
            upstream,
            clock,
        }
    }

    /// Registers a catalog server.
    ///
    /// Public servers are discovered first and stored together with their
    /// global tools in one transaction. Private servers are stored without
    /// contacting the upstream.
    ///
    /// # Errors
    ///
    /// Returns domain errors for an invalid name or URL,
    /// [`ReconciliationError::DuplicateCatalogServer`] before any network call
    /// when the name is taken, upstream errors when discovery fails, and
    /// repository errors. Nothing is stored on any error.
    #[instrument(skip_all, fields(name = %request.name))]
    pub async fn add(
        &self,
        request: AddCatalogServerRequest,
    ) -> ReconciliationResult<RegisteredCatalogServer> {
        let name = CatalogServerName::new(&request.name)?;
        let url = ServerUrl::new(&request.url)?;
        if self
            .repository
            .find_catalog_server_by_name(&name)
            .await?
            .is_some()
        {
            return Err(ReconciliationError::DuplicateCatalogServer(name));
        }
        let mut server = CatalogServer::new(
            CatalogServerDraft {
                name,
                url,
                description: request.description,
                transport: request.transport.unwrap_or_default(),
                access_type: request.access_type,
            },
            &*self.clock,
        );
        let tools = if server.is_public() {
            let discovered = self
                .upstream
                .discover(&UpstreamEndpoint::anonymous(server.url().as_str()))
                .await?;
            server.record_capabilities(discovered.capabilities, &*self.clock);
            let reserved =
                naming::reserved_names(&*self.repository, &ToolScope::Global, server.id()).await?;
            naming::materialize(
                &server,
                &ToolScope::Global,
                &discovered.tools,
                reserved,
                &*self.clock,
            )?
        } else {
            info!("private catalog server stored without discovery");
            Vec::new()
        };
        self.repository
            .insert_catalog_server(&server, &tools)
            .await?;
        info!(server_id = %server.id(), tool_count = tools.len(), "catalog server added");
        Ok(RegisteredCatalogServer { server, tools })
    }

    /// Reconciles a public server's global tools with its upstream.
    ///
    /// Private servers have no global tools and return an empty outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::CatalogServerNotFound`] for unknown
    /// servers, upstream errors before anything is written, and repository
    /// errors from the tool write, which leaves the stored tools unchanged.
    /// The refreshed capabilities are recorded after the tool changes commit;
    /// a failure to store them is logged and does not fail the refresh.
    #[instrument(skip_all, fields(%server_id))]
    pub async fn refresh(&self, server_id: CatalogServerId) -> ReconciliationResult<RefreshOutcome> {
        let mut server = self
            .repository
            .find_catalog_server(server_id)
            .await?
            .ok_or(ReconciliationError::CatalogServerNotFound(server_id))?;
        if !server.is_public() {
            info!("private catalog server has no global tools; skipping refresh");
            return Ok(RefreshOutcome::default());
        }
        let discovered = self
            .upstream
            .discover(&UpstreamEndpoint::anonymous(server.url().as_str()))
            .await?;
        let reserved =
            naming::reserved_names(&*self.repository, &ToolScope::Global, server_id).await?;
        let desired = naming::materialize(
            &server,
            &ToolScope::Global,
            &discovered.tools,
            reserved,
            &*self.clock,
        )?;
        let current = self
            .repository
            .list_tools_in_scope(server_id, &ToolScope::Global)
            .await?;
        let diff = ToolDiff::compute(desired, current);
        self.repository
            .apply_tool_changes(&diff.to_insert, &diff.delete_ids())
            .await?;
        server.record_capabilities(discovered.capabilities, &*self.clock);
        if let Err(err) = self.repository.update_catalog_server(&server).await {
            warn!(error = %err, "failed to record refreshed capabilities");
        }
        info!(
            added = diff.to_insert.len(),
            deleted = diff.to_delete.len(),
            "catalog server refreshed"
        );
        Ok(diff.into())
    }
}
