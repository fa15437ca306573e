//! Request bodies and response views of the administrative API.
//!
//! Views never carry hub credentials, only whether one is stored.

use crate::{
    reconciliation::RefreshOutcome,
    registry::domain::{
        AccessType, AuthType, CatalogServer, CatalogServerId, HubServerId, HubStatus,
        HubWithServer, RecordStatus, Tool, ToolId, UserId, VirtualServer, VirtualServerId,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{"items": [...]}`
#[derive(Debug, Serialize)]
pub struct Items<T> {
    /// Listed records.
    pub items: Vec<T>,
}

impl<T> Items<T> {
    /// Maps `records` into views.
    #[must_use]
    pub fn from_records<R>(records: &[R]) -> Self
    where
        for<'a> T: From<&'a R>,
    {
        Self {
            items: records.iter().map(T::from).collect(),
        }
    }
}

/// `{"id": ...}`
#[derive(Debug, Serialize)]
pub struct Created<I> {
    /// Identifier of the new record.
    pub id: I,
}

/// `{"ok": true}`
#[derive(Debug, Serialize)]
pub struct Acknowledged {
    /// Always `true`.
    pub ok: bool,
}

impl Acknowledged {
    /// The success acknowledgement.
    pub const OK: Self = Self { ok: true };
}

/// `{"ok": true, "added": [...], "deleted": [...]}`
#[derive(Debug, Serialize)]
pub struct Refreshed {
    /// Always `true`.
    pub ok: bool,
    /// Tools stored by the refresh.
    pub added: Vec<ToolView>,
    /// Tools removed by the refresh.
    pub deleted: Vec<ToolView>,
}

impl From<RefreshOutcome> for Refreshed {
    fn from(outcome: RefreshOutcome) -> Self {
        Self {
            ok: true,
            added: outcome.added.iter().map(ToolView::from).collect(),
            deleted: outcome.deleted.iter().map(ToolView::from).collect(),
        }
    }
}

/// Catalog server as returned by the API.
#[derive(Debug, Serialize)]
pub struct CatalogServerView {
    /// Identifier.
    pub id: CatalogServerId,
    /// Unique name.
    pub name: String,
    /// Upstream endpoint.
    pub url: String,
    /// Description.
    pub description: String,
    /// Transport label.
    pub transport: String,
    /// Shared or per-tenant access.
    pub access_type: AccessType,
    /// Last negotiated capabilities.
    pub capabilities: Option<Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&CatalogServer> for CatalogServerView {
    fn from(server: &CatalogServer) -> Self {
        Self {
            id: server.id(),
            name: server.name().as_str().to_owned(),
            url: server.url().as_str().to_owned(),
            description: server.description().to_owned(),
            transport: server.transport().to_owned(),
            access_type: server.access_type(),
            capabilities: server.capabilities().cloned(),
            created_at: server.created_at(),
            updated_at: server.updated_at(),
        }
    }
}

/// Hub binding as returned by the API.
#[derive(Debug, Serialize)]
pub struct HubServerView {
    /// Identifier.
    pub id: HubServerId,
    /// Owning tenant.
    pub user_id: UserId,
    /// Bound catalog server.
    pub catalog_server_id: CatalogServerId,
    /// Name of the bound catalog server.
    pub catalog_server_name: String,
    /// Binding status.
    pub status: HubStatus,
    /// Credential kind.
    pub auth_type: AuthType,
    /// Whether a credential is stored.
    pub has_credentials: bool,
    /// Capabilities negotiated for private servers.
    pub capabilities: Option<Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&HubWithServer> for HubServerView {
    fn from(binding: &HubWithServer) -> Self {
        let hub = &binding.hub;
        Self {
            id: hub.id(),
            user_id: hub.user_id().clone(),
            catalog_server_id: hub.catalog_server_id(),
            catalog_server_name: binding.server.name().as_str().to_owned(),
            status: hub.status(),
            auth_type: hub.auth_type(),
            has_credentials: hub.auth_value().is_some(),
            capabilities: hub.capabilities().cloned(),
            created_at: hub.created_at(),
            updated_at: hub.updated_at(),
        }
    }
}

/// Materialized tool as returned by the API.
#[derive(Debug, Serialize)]
pub struct ToolView {
    /// Identifier.
    pub id: ToolId,
    /// Catalog server that serves the tool.
    pub catalog_server_id: CatalogServerId,
    /// Owning hub binding; absent for global tools.
    pub hub_server_id: Option<HubServerId>,
    /// Owning tenant; absent for global tools.
    pub user_id: Option<UserId>,
    /// Upstream-native name.
    pub original_name: String,
    /// Gateway-unique name.
    pub modified_name: String,
    /// Description.
    pub description: String,
    /// Input schema.
    pub input_schema: Value,
    /// Annotations.
    pub annotations: Value,
    /// Record status.
    pub status: RecordStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Tool> for ToolView {
    fn from(tool: &Tool) -> Self {
        Self {
            id: tool.id(),
            catalog_server_id: tool.catalog_server_id(),
            hub_server_id: tool.hub_server_id(),
            user_id: tool.user_id().cloned(),
            original_name: tool.original_name().to_owned(),
            modified_name: tool.modified_name().to_owned(),
            description: tool.description().to_owned(),
            input_schema: tool.input_schema().clone(),
            annotations: tool.annotations().clone(),
            status: tool.status(),
            created_at: tool.created_at(),
            updated_at: tool.updated_at(),
        }
    }
}

/// Virtual server as returned by the API.
#[derive(Debug, Serialize)]
pub struct VirtualServerView {
    /// Identifier.
    pub id: VirtualServerId,
    /// Owning tenant.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Record status.
    pub status: RecordStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&VirtualServer> for VirtualServerView {
    fn from(server: &VirtualServer) -> Self {
        Self {
            id: server.id(),
            user_id: server.user_id().clone(),
            name: server.name().as_str().to_owned(),
            status: server.status(),
            created_at: server.created_at(),
            updated_at: server.updated_at(),
        }
    }
}

/// Body of `POST /catalog/servers`.
#[derive(Debug, Deserialize)]
pub struct CreateCatalogServerBody {
    /// Unique name.
    pub name: String,
    /// Upstream endpoint.
    pub url: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Transport label.
    #[serde(default)]
    pub transport: Option<String>,
    /// Shared or per-tenant access.
    pub access_type: AccessType,
}

/// Body of `PATCH /catalog/servers/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCatalogServerBody {
    /// Replacement endpoint.
    #[serde(default)]
    pub url: Option<String>,
    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /hub/servers`.
#[derive(Debug, Deserialize)]
pub struct CreateHubBody {
    /// Catalog server to bind.
    pub catalog_server_id: CatalogServerId,
    /// Credential kind.
    #[serde(default = "no_auth")]
    pub auth_type: AuthType,
    /// Cleartext credential.
    #[serde(default)]
    pub auth_value: Option<Value>,
}

const fn no_auth() -> AuthType {
    AuthType::None
}

/// Body of `PATCH /hub/servers/{id}`.
#[derive(Debug, Deserialize)]
pub struct HubStatusBody {
    /// New binding status.
    pub status: HubStatus,
}

/// Body of the tool and virtual server status routes.
#[derive(Debug, Deserialize)]
pub struct RecordStatusBody {
    /// New record status.
    pub status: RecordStatus,
}

/// Query string of `GET /tools`.
#[derive(Debug, Default, Deserialize)]
pub struct ToolQuery {
    /// Only tools reachable through this binding.
    #[serde(default)]
    pub hub_server_id: Option<HubServerId>,
    /// Only tools with this status.
    #[serde(default)]
    pub status: Option<RecordStatus>,
    /// Case-insensitive text match.
    #[serde(default)]
    pub q: Option<String>,
}

/// Body of `POST /virtual-servers`.
#[derive(Debug, Deserialize)]
pub struct CreateVirtualServerBody {
    /// Display name.
    pub name: String,
    /// Tools to attach.
    #[serde(default)]
    pub tool_ids: Vec<ToolId>,
}

/// Body of `PUT /virtual-servers/{id}/tools`.
#[derive(Debug, Deserialize)]
pub struct ReplaceToolsBody {
    /// Replacement attachment list.
    pub tool_ids: Vec<ToolId>,
}
