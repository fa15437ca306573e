//! Materialized tool rows and their ownership scope.

use super::{
    CatalogServerId, HubServerId, RecordStatus, RegistryDomainError, ToolId, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Who a tool row belongs to.
///
/// Public catalog servers publish [`ToolScope::Global`] rows shared by every
/// tenant. Private catalog servers publish [`ToolScope::Tenant`] rows owned by
/// the tenant whose hub binding discovered them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolScope {
    /// Shared by all tenants.
    Global,
    /// Owned by one tenant through one hub binding.
    Tenant {
        /// Owning tenant.
        user_id: UserId,
        /// Hub binding that discovered the tool.
        hub_server_id: HubServerId,
    },
}

impl ToolScope {
    /// Returns the owning tenant, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Global => None,
            Self::Tenant { user_id, .. } => Some(user_id),
        }
    }

    /// Returns the discovering hub binding, if any.
    #[must_use]
    pub const fn hub_server_id(&self) -> Option<HubServerId> {
        match self {
            Self::Global => None,
            Self::Tenant { hub_server_id, .. } => Some(*hub_server_id),
        }
    }
}

/// Parameter object for materializing one discovered upstream tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDraft {
    /// Ownership scope.
    pub scope: ToolScope,
    /// Catalog server the tool was discovered on.
    pub catalog_server_id: CatalogServerId,
    /// Name reported by the upstream.
    pub original_name: String,
    /// Gateway-unique name within the scope.
    pub modified_name: String,
    /// Description reported by the upstream.
    pub description: String,
    /// JSON Schema for the tool input.
    pub input_schema: Value,
    /// Upstream annotations; absent annotations become an empty object.
    pub annotations: Option<Value>,
}

/// Parameter object for reconstructing a persisted tool row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedToolData {
    /// Persisted tool identifier.
    pub id: ToolId,
    /// Persisted ownership scope.
    pub scope: ToolScope,
    /// Persisted catalog server reference.
    pub catalog_server_id: CatalogServerId,
    /// Persisted upstream name.
    pub original_name: String,
    /// Persisted gateway name.
    pub modified_name: String,
    /// Persisted description.
    pub description: String,
    /// Persisted input schema.
    pub input_schema: Value,
    /// Persisted annotations.
    pub annotations: Value,
    /// Persisted status.
    pub status: RecordStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A tool materialized from upstream discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    id: ToolId,
    scope: ToolScope,
    catalog_server_id: CatalogServerId,
    original_name: String,
    modified_name: String,
    description: String,
    input_schema: Value,
    annotations: Value,
    status: RecordStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Tool {
    /// Materializes a new active tool row.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyToolName`] when either name is
    /// blank.
    pub fn new(draft: ToolDraft, clock: &impl Clock) -> Result<Self, RegistryDomainError> {
        if draft.original_name.trim().is_empty() || draft.modified_name.trim().is_empty() {
            return Err(RegistryDomainError::EmptyToolName);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: ToolId::new(),
            scope: draft.scope,
            catalog_server_id: draft.catalog_server_id,
            original_name: draft.original_name,
            modified_name: draft.modified_name,
            description: draft.description,
            input_schema: draft.input_schema,
            annotations: draft
                .annotations
                .unwrap_or_else(|| Value::Object(Map::new())),
            status: RecordStatus::Active,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a tool from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedToolData) -> Self {
        Self {
            id: data.id,
            scope: data.scope,
            catalog_server_id: data.catalog_server_id,
            original_name: data.original_name,
            modified_name: data.modified_name,
            description: data.description,
            input_schema: data.input_schema,
            annotations: data.annotations,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the tool identifier.
    #[must_use]
    pub const fn id(&self) -> ToolId {
        self.id
    }

    /// Returns the ownership scope.
    #[must_use]
    pub const fn scope(&self) -> &ToolScope {
        &self.scope
    }

    /// Returns the owning tenant, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.scope.user_id()
    }

    /// Returns the discovering hub binding, if any.
    #[must_use]
    pub const fn hub_server_id(&self) -> Option<HubServerId> {
        self.scope.hub_server_id()
    }

    /// Returns the catalog server the tool was discovered on.
    #[must_use]
    pub const fn catalog_server_id(&self) -> CatalogServerId {
        self.catalog_server_id
    }

    /// Returns the upstream tool name.
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Returns the gateway-unique tool name.
    #[must_use]
    pub fn modified_name(&self) -> &str {
        &self.modified_name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the input schema.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Returns the annotations document.
    #[must_use]
    pub const fn annotations(&self) -> &Value {
        &self.annotations
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> RecordStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Changes the tool status.
    pub fn set_status(&mut self, status: RecordStatus, clock: &impl Clock) {
        self.status = status;
        self.updated_at = clock.utc();
    }
}

/// Removes repeated identifiers, keeping the first occurrence of each.
#[must_use]
pub fn dedupe_tool_ids(tool_ids: &[ToolId]) -> Vec<ToolId> {
    let mut seen = HashSet::with_capacity(tool_ids.len());
    tool_ids
        .iter()
        .copied()
        .filter(|tool_id| seen.insert(*tool_id))
        .collect()
}

/// Optional narrowing applied when listing a tenant's tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolFilter {
    /// Only tools reachable through this hub binding.
    pub hub_server_id: Option<HubServerId>,
    /// Only tools with this status.
    pub status: Option<RecordStatus>,
    /// Case-insensitive substring matched against names and description.
    pub query: Option<String>,
}

impl ToolFilter {
    /// Returns whether `tool` passes the status and text criteria.
    ///
    /// Hub narrowing needs the hub's catalog server and is applied by
    /// [`Self::matches_hub`].
    #[must_use]
    pub fn matches(&self, tool: &Tool) -> bool {
        let status_ok = self.status.is_none_or(|status| tool.status() == status);
        let query_ok = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .is_none_or(|needle| {
                let needle_lower = needle.to_lowercase();
                [tool.original_name(), tool.modified_name(), tool.description()]
                    .iter()
                    .any(|haystack| haystack.to_lowercase().contains(&needle_lower))
            });
        status_ok && query_ok
    }

    /// Returns whether `tool` is reachable through the filtered hub binding,
    /// given the catalog server that binding points at.
    #[must_use]
    pub fn matches_hub(&self, tool: &Tool, hub_catalog_server: Option<CatalogServerId>) -> bool {
        let Some(hub_id) = self.hub_server_id else {
            return true;
        };
        match tool.scope() {
            ToolScope::Tenant { hub_server_id, .. } => *hub_server_id == hub_id,
            ToolScope::Global => hub_catalog_server == Some(tool.catalog_server_id()),
        }
    }
}
