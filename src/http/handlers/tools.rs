//! Tool handlers: listing and soft deletion of materialized tools.

use crate::{
    http::{
        HttpError, Principal,
        dto::{Acknowledged, Items, RecordStatusBody, ToolQuery, ToolView},
        state::AppState,
    },
    registry::{
        domain::{Tool, ToolFilter, ToolId},
        ports::RegistryStore,
    },
    upstream::UpstreamConnector,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

/// List the tools visible to the caller.
pub async fn list<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Query(query): Query<ToolQuery>,
) -> Result<Json<Items<ToolView>>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let filter = ToolFilter {
        hub_server_id: query.hub_server_id,
        status: query.status,
        query: query.q,
    };
    let tools = state
        .tools
        .list_for_user(&principal.user_id, &filter)
        .await?;
    Ok(Json(Items::from_records(&tools)))
}

/// Change a tool's status.
pub async fn update_status<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(tool_id): Path<ToolId>,
    Json(body): Json<RecordStatusBody>,
) -> Result<Json<ToolView>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    authorize(&principal, &state.tools.get(tool_id).await?)?;
    let tool = state.tools.set_status(tool_id, body.status).await?;
    Ok(Json(ToolView::from(&tool)))
}

/// Soft-delete a tool.
pub async fn delete<S, U>(
    State(state): State<AppState<S, U>>,
    principal: Principal,
    Path(tool_id): Path<ToolId>,
) -> Result<Json<Acknowledged>, HttpError>
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    authorize(&principal, &state.tools.get(tool_id).await?)?;
    state.tools.deactivate(tool_id).await?;
    Ok(Json(Acknowledged::OK))
}

/// Tenant tools belong to their owner; global tools to operators.
fn authorize(principal: &Principal, tool: &Tool) -> Result<(), HttpError> {
    match tool.user_id() {
        Some(owner) if *owner == principal.user_id => Ok(()),
        Some(_) => Err(HttpError::Forbidden(format!(
            "tool {} belongs to another user",
            tool.id()
        ))),
        None => principal.require_admin(),
    }
}
