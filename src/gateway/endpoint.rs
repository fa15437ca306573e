//! Streamable-HTTP endpoint exposing each virtual server as an MCP server.

use super::{ProxyRouter, VirtualServerService};
use crate::{
    registry::{domain::VirtualServerId, ports::RegistryStore},
    upstream::UpstreamConnector,
};
use axum::{
    Router,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use tower::ServiceExt;
use tracing::error;
use uuid::Uuid;

/// Builds the per-virtual-server MCP routes under `path_prefix`.
///
/// The endpoint is stateless: every `POST` is served by a fresh handler and
/// no session id is issued, so `GET` and `DELETE` are refused by the
/// transport.
pub fn mcp_routes<S, U>(path_prefix: &str, proxy: ProxyRouter<S, U>) -> Router
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let prefix = path_prefix.trim_end_matches('/');
    Router::new()
        .route(&format!("{prefix}/{{id}}/mcp"), any(serve_virtual_server::<S, U>))
        .with_state(proxy)
}

fn transport_config() -> StreamableHttpServerConfig {
    StreamableHttpServerConfig {
        stateful_mode: false,
        ..StreamableHttpServerConfig::default()
    }
}

async fn serve_virtual_server<S, U>(
    State(proxy): State<ProxyRouter<S, U>>,
    Path(id): Path<Uuid>,
    request: Request,
) -> Response
where
    S: RegistryStore,
    U: UpstreamConnector + 'static,
{
    let handler = VirtualServerService::new(proxy, VirtualServerId::from_uuid(id));
    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        Arc::new(LocalSessionManager::default()),
        transport_config(),
    );
    match service.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(err) => {
            error!(error = %err, virtual_server_id = %id, "mcp transport failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
