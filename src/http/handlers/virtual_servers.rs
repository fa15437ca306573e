//! Virtual server handlers.
//!
//! The composer trusts its caller for ownership, so every route addressing
//! one virtual server loads it here first and rejects other tenants.

use crate::{
    http::{
        HttpError, Principal,
        dto::{
            Acknowledged, CreateVirtualServerBody, Created, Items, RecordStatusBody,
            ReplaceToolsBody, ToolView, VirtualServerView,
        },
        state::AppState,
    },
    registry::{
        domain::{ToolId, VirtualServer, VirtualServerId},
        ports::RegistryStore,
    },
    upstream::UpstreamConnector,
};
use axum::{
    Json,
    extract::{Path, State},
};

/// Create a virtual server, optionally with tools attached.
pub async fn create<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Json(body): Json<CreateVirtualServerBody>,
) -> Result<Json<Created<VirtualServerId>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let server = state
        .composer
        .create_with_tools(principal.user_id, &body.name, &body.tool_ids)
        .await?;
    Ok(Json(Created { id: server.id() }))
}

/// List the caller's virtual servers.
pub async fn list<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
) -> Result<Json<Items<VirtualServerView>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let servers = state.composer.list_for_user(&principal.user_id).await?;
    Ok(Json(Items::from_records(&servers)))
}

/// List the tools attached to one of the caller's virtual servers.
pub async fn tools<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(server_id): Path<VirtualServerId>,
) -> Result<Json<Items<ToolView>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    owned(&state, &principal, server_id).await?;
    let tools = state.composer.list_tools(server_id).await?;
    Ok(Json(Items::from_records(&tools)))
}

/// Replace the attachment list; ids beyond the cap are dropped.
pub async fn replace_tools<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(server_id): Path<VirtualServerId>,
    Json(body): Json<ReplaceToolsBody>,
) -> Result<Json<Items<ToolId>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    owned(&state, &principal, server_id).await?;
    let attached = state
        .composer
        .replace_tools(server_id, &body.tool_ids)
        .await?;
    Ok(Json(Items { items: attached }))
}

/// Detach one tool.
pub async fn remove_tool<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path((server_id, tool_id)): Path<(VirtualServerId, ToolId)>,
) -> Result<Json<Acknowledged>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    owned(&state, &principal, server_id).await?;
    state.composer.remove_tool(server_id, tool_id).await?;
    Ok(Json(Acknowledged::OK))
}

/// Change a virtual server's status.
pub async fn update_status<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(server_id): Path<VirtualServerId>,
    Json(body): Json<RecordStatusBody>,
) -> Result<Json<VirtualServerView>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    owned(&state, &principal, server_id).await?;
    let server = state.composer.set_status(server_id, body.status).await?;
    Ok(Json(VirtualServerView::from(&server)))
}

/// Delete a virtual server; its tools are kept.
pub async fn delete<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(server_id): Path<VirtualServerId>,
) -> Result<Json<Acknowledged>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    owned(&state, &principal, server_id).await?;
    state.composer.delete(server_id).await?;
    Ok(Json(Acknowledged::OK))
}

async fn owned<S, U>(
    state: &AppState<S, U>,
    principal: &Principal,
    server_id: VirtualServerId,
) -> Result<VirtualServer, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let server = state.composer.get(server_id).await?;
    if server.is_owned_by(&principal.user_id) {
        Ok(server)
    } else {
        Err(HttpError::Forbidden(format!(
            "virtual server {server_id} belongs to another user"
        )))
    }
}
