//! Shared application state for the HTTP surface.

use crate::{
    composer::VirtualServerComposer,
    gateway::ProxyRouter,
    reconciliation::{CatalogOrchestrator, HubOrchestrator},
    registry::{
        ports::RegistryStore,
        services::{CatalogService, HubService, ToolService},
    },
    upstream::{UpstreamClient, UpstreamConnector},
    vault::CredentialVault,
};
use mockable::DefaultClock;
use std::sync::Arc;

/// Every service the handlers delegate to, wired over one store and one
/// upstream connector.
pub struct AppContext<S, U>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    /// Catalog queries and edits.
    pub catalog: CatalogService<S, DefaultClock>,
    /// Catalog add and refresh.
    pub catalog_orchestrator: CatalogOrchestrator<S, U, DefaultClock>,
    /// Hub queries, status changes and deletion.
    pub hubs: HubService<S, DefaultClock>,
    /// Hub add and refresh.
    pub hub_orchestrator: HubOrchestrator<S, U, DefaultClock>,
    /// Tool queries and status changes.
    pub tools: ToolService<S, DefaultClock>,
    /// Virtual server composition.
    pub composer: VirtualServerComposer<S, DefaultClock>,
    /// Per-request protocol routing.
    pub proxy: ProxyRouter<S, U>,
}

impl<S, U> AppContext<S, U>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    /// Wires the services over `repository` and `upstream`.
    #[must_use]
    pub fn new(
        repository: Arc<S>,
        upstream: UpstreamClient<U>,
        vault: Option<Arc<CredentialVault>>,
        max_tools_per_virtual_server: usize,
    ) -> Self {
        let clock = Arc::new(DefaultClock);
        Self {
            catalog: CatalogService::new(Arc::clone(&repository), Arc::clone(&clock)),
            catalog_orchestrator: CatalogOrchestrator::new(
                Arc::clone(&repository),
                upstream.clone(),
                Arc::clone(&clock),
            ),
            hubs: HubService::new(Arc::clone(&repository), Arc::clone(&clock)),
            hub_orchestrator: HubOrchestrator::new(
                Arc::clone(&repository),
                upstream.clone(),
                vault.clone(),
                Arc::clone(&clock),
            ),
            tools: ToolService::new(Arc::clone(&repository), Arc::clone(&clock)),
            composer: VirtualServerComposer::with_max_tools(
                Arc::clone(&repository),
                clock,
                max_tools_per_virtual_server,
            ),
            proxy: ProxyRouter::new(repository, upstream, vault),
        }
    }
}

/// Application state shared across all handlers.
pub type AppState<S, U> = Arc<AppContext<S, U>>;
