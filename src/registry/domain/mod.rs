//! Domain model for the catalog, hub bindings, materialized tools, and
//! virtual servers.
//!
//! The registry domain models which upstream MCP servers exist, which tenants
//! are bound to them, which tools were discovered through those bindings, and
//! how tenants bundle tools into virtual servers. Infrastructure concerns
//! remain outside this boundary.

mod catalog;
mod error;
mod hub;
mod ids;
mod status;
mod tool;
mod virtual_server;

pub use catalog::{
    AccessType, CatalogServer, CatalogServerDraft, CatalogServerName, DEFAULT_TRANSPORT,
    MAX_SERVER_NAME_LENGTH, PersistedCatalogServerData, ServerUrl,
};
pub use error::{
    ParseAccessTypeError, ParseAuthTypeError, ParseHubStatusError, ParseRecordStatusError,
    RegistryDomainError,
};
pub use hub::{AuthType, HubServer, HubServerDraft, HubWithServer, PersistedHubServerData};
pub use ids::{CatalogServerId, HubServerId, MAX_USER_ID_LENGTH, ToolId, UserId, VirtualServerId};
pub use status::{HubStatus, RecordStatus};
pub use tool::{PersistedToolData, Tool, ToolDraft, ToolFilter, ToolScope, dedupe_tool_ids};
pub use virtual_server::{
    DEFAULT_MAX_TOOLS_PER_VIRTUAL_SERVER, MAX_VIRTUAL_SERVER_NAME_LENGTH,
    PersistedVirtualServerData, VirtualServer, VirtualServerName,
};
