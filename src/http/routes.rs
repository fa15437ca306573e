//! Route definitions and router construction.

use super::{handlers, state::AppState};
use crate::{
    config::ServerConfig, gateway::mcp_routes, registry::ports::RegistryStore,
    upstream::UpstreamConnector,
};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Administrative routes without their prefix. The caller applies
/// `.with_state()` before nesting.
pub fn admin_routes<S, U>() -> Router<AppState<S, U>>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    Router::new()
        // Catalog
        .route(
            "/catalog/servers",
            get(handlers::catalog::list::<S, U>).post(handlers::catalog::create::<S, U>),
        )
        .route(
            "/catalog/servers/{id}",
            patch(handlers::catalog::update::<S, U>),
        )
        .route(
            "/catalog/servers/{id}/refresh",
            post(handlers::catalog::refresh::<S, U>),
        )
        .route(
            "/catalog/servers/{id}/tools",
            get(handlers::catalog::tools::<S, U>),
        )
        // Tools
        .route("/tools", get(handlers::tools::list::<S, U>))
        .route(
            "/tools/{id}",
            delete(handlers::tools::delete::<S, U>),
        )
        .route(
            "/tools/{id}/status",
            patch(handlers::tools::update_status::<S, U>),
        )
        // Virtual servers
        .route(
            "/virtual-servers",
            get(handlers::virtual_servers::list::<S, U>)
                .post(handlers::virtual_servers::create::<S, U>),
        )
        .route(
            "/virtual-servers/{id}",
            delete(handlers::virtual_servers::delete::<S, U>),
        )
        .route(
            "/virtual-servers/{id}/tools",
            get(handlers::virtual_servers::tools::<S, U>)
                .put(handlers::virtual_servers::replace_tools::<S, U>),
        )
        .route(
            "/virtual-servers/{id}/tools/{tool_id}",
            delete(handlers::virtual_servers::remove_tool::<S, U>),
        )
        .route(
            "/virtual-servers/{id}/status",
            patch(handlers::virtual_servers::update_status::<S, U>),
        )
        // Hub bindings
        .route(
            "/hub/servers",
            get(handlers::hubs::list::<S, U>).post(handlers::hubs::create::<S, U>),
        )
        .route(
            "/hub/servers/{id}",
            patch(handlers::hubs::update_status::<S, U>).delete(handlers::hubs::delete::<S, U>),
        )
        .route(
            "/hub/servers/{id}/refresh",
            post(handlers::hubs::refresh::<S, U>),
        )
}

/// Builds the complete application: the health check, the administrative
/// API under `admin_prefix` and the per-virtual-server MCP endpoints.
pub fn build_router<S, U>(state: AppState<S, U>, server: &ServerConfig) -> Router
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let mcp = mcp_routes(&server.mcp_path_prefix, state.proxy.clone());
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest(
            server.admin_prefix.trim_end_matches('/'),
            admin_routes().with_state(state),
        )
        .merge(mcp)
}
