//! Diesel row models for registry persistence.

use super::schema::{catalog_servers, hub_servers, tool_virtual_servers, tools, virtual_servers};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

/// Row model for catalog server records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = catalog_servers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CatalogServerRow {
    /// Internal server identifier.
    pub id: Uuid,
    /// Unique server name.
    pub name: String,
    /// Upstream endpoint URL.
    pub url: String,
    /// Operator-facing description.
    pub description: String,
    /// Last discovered capabilities.
    pub capabilities: Option<Value>,
    /// Transport label.
    pub transport: String,
    /// Access type.
    pub access_type: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for hub binding records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = hub_servers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HubServerRow {
    /// Internal binding identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub user_id: String,
    /// Bound catalog server.
    pub catalog_server_id: Uuid,
    /// Binding status.
    pub status: String,
    /// Credential kind.
    pub auth_type: String,
    /// Credential document.
    pub auth_value: Option<Value>,
    /// Observed capabilities.
    pub capabilities: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for tool records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tools)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ToolRow {
    /// Internal tool identifier.
    pub id: Uuid,
    /// Owning tenant, if tenant-scoped.
    pub user_id: Option<String>,
    /// Catalog server reference.
    pub catalog_server_id: Uuid,
    /// Discovering hub binding, if tenant-scoped.
    pub hub_server_id: Option<Uuid>,
    /// Upstream name.
    pub original_name: String,
    /// Gateway name.
    pub modified_name: String,
    /// Description.
    pub description: String,
    /// Input schema.
    pub input_schema: Value,
    /// Annotations.
    pub annotations: Value,
    /// Record status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for virtual server records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = virtual_servers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VirtualServerRow {
    /// Internal identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Record status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for virtual server attachments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tool_virtual_servers)]
pub struct NewAttachmentRow {
    /// Virtual server side.
    pub virtual_server_id: Uuid,
    /// Tool side.
    pub tool_id: Uuid,
    /// Zero-based attachment order.
    pub position: i32,
}
