//! Hub handlers: a tenant's bindings to catalog servers.

use crate::{
    http::{
        HttpError, Principal,
        dto::{Acknowledged, CreateHubBody, Created, HubServerView, HubStatusBody, Items, Refreshed},
        state::AppState,
    },
    reconciliation::AddHubRequest,
    registry::{domain::HubServerId, ports::RegistryStore},
    upstream::UpstreamConnector,
};
use axum::{
    Json,
    extract::{Path, State},
};

/// List the caller's hub bindings.
pub async fn list<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
) -> Result<Json<Items<HubServerView>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let bindings = state.hubs.list_for_user(&principal.user_id).await?;
    Ok(Json(Items::from_records(&bindings)))
}

/// Bind the caller to a catalog server.
pub async fn create<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Json(body): Json<CreateHubBody>,
) -> Result<Json<Created<HubServerId>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let registered = state
        .hub_orchestrator
        .add(AddHubRequest {
            user_id: principal.user_id,
            catalog_server_id: body.catalog_server_id,
            auth_type: body.auth_type,
            auth_value: body.auth_value,
        })
        .await?;
    Ok(Json(Created {
        id: registered.hub.id(),
    }))
}

/// Change the status of one of the caller's bindings.
pub async fn update_status<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(hub_id): Path<HubServerId>,
    Json(body): Json<HubStatusBody>,
) -> Result<Json<HubServerView>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let binding = state
        .hubs
        .set_status(&principal.user_id, hub_id, body.status)
        .await?;
    Ok(Json(HubServerView::from(&binding)))
}

/// Delete one of the caller's bindings with its tools.
pub async fn delete<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(hub_id): Path<HubServerId>,
) -> Result<Json<Acknowledged>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    state.hubs.delete(&principal.user_id, hub_id).await?;
    Ok(Json(Acknowledged::OK))
}

/// Reconcile a private binding's tenant tools with its upstream.
pub async fn refresh<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(hub_id): Path<HubServerId>,
) -> Result<Json<Refreshed>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let outcome = state
        .hub_orchestrator
        .refresh(&principal.user_id, hub_id)
        .await?;
    Ok(Json(Refreshed::from(outcome)))
}
