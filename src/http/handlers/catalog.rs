//! Catalog handlers: the operator-managed list of upstream servers.

use crate::{
    http::{
        HttpError, Principal,
        dto::{
            CatalogServerView, Created, CreateCatalogServerBody, Items, Refreshed, ToolView,
            UpdateCatalogServerBody,
        },
        state::AppState,
    },
    reconciliation::AddCatalogServerRequest,
    registry::{domain::CatalogServerId, ports::RegistryStore, services::UpdateCatalogServerRequest},
    upstream::UpstreamConnector,
};
use axum::{
    Json,
    extract::{Path, State},
};

/// List every catalog server.
pub async fn list<S, U>(
    State(state): State<AppState<S, U>>,
    _principal: Principal,
) -> Result<Json<Items<CatalogServerView>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let servers = state.catalog.list().await?;
    Ok(Json(Items::from_records(&servers)))
}

/// Register a catalog server, discovering its tools when it is public.
pub async fn create<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Json(body): Json<CreateCatalogServerBody>,
) -> Result<Json<Created<CatalogServerId>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    principal.require_admin()?;
    let registered = state
        .catalog_orchestrator
        .add(AddCatalogServerRequest {
            name: body.name,
            url: body.url,
            description: body.description,
            transport: body.transport,
            access_type: body.access_type,
        })
        .await?;
    Ok(Json(Created {
        id: registered.server.id(),
    }))
}

/// Edit a catalog server's URL or description.
pub async fn update<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(server_id): Path<CatalogServerId>,
    Json(body): Json<UpdateCatalogServerBody>,
) -> Result<Json<CatalogServerView>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    principal.require_admin()?;
    let server = state
        .catalog
        .update_details(
            server_id,
            UpdateCatalogServerRequest {
                url: body.url,
                description: body.description,
            },
        )
        .await?;
    Ok(Json(CatalogServerView::from(&server)))
}

/// Reconcile a public server's global tools with its upstream.
pub async fn refresh<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(server_id): Path<CatalogServerId>,
) -> Result<Json<Refreshed>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    principal.require_admin()?;
    let outcome = state.catalog_orchestrator.refresh(server_id).await?;
    Ok(Json(Refreshed::from(outcome)))
}

/// List the tools of a catalog server as the caller sees them.
pub async fn tools<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(server_id): Path<CatalogServerId>,
) -> Result<Json<Items<ToolView>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let tools = state
        .catalog
        .list_tools(server_id, &principal.user_id)
        .await?;
    Ok(Json(Items::from_records(&tools)))
}
