//! Errors shared by every registry repository port.

use crate::registry::domain::{
    CatalogServerId, CatalogServerName, HubServerId, ToolId, UserId, VirtualServerId,
};
use std::sync::Arc;
use thiserror::Error;

/// Result type for registry repository operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors returned by registry repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// A catalog server with the same name already exists.
    #[error("duplicate catalog server name: {0}")]
    DuplicateCatalogServerName(CatalogServerName),

    /// The tenant already has a binding to the catalog server.
    #[error("user {user_id} already has a hub binding to catalog server {catalog_server_id}")]
    DuplicateHub {
        /// Owning tenant.
        user_id: UserId,
        /// Bound catalog server.
        catalog_server_id: CatalogServerId,
    },

    /// A tool with the same modified name already exists in the scope.
    #[error("duplicate tool name in scope: {0}")]
    DuplicateToolName(String),

    /// The catalog server was not found.
    #[error("catalog server not found: {0}")]
    CatalogServerNotFound(CatalogServerId),

    /// The hub binding was not found.
    #[error("hub server not found: {0}")]
    HubNotFound(HubServerId),

    /// The tool was not found.
    #[error("tool not found: {0}")]
    ToolNotFound(ToolId),

    /// The tool exists but is not active.
    #[error("tool is not active: {0}")]
    ToolNotActive(ToolId),

    /// The virtual server was not found.
    #[error("virtual server not found: {0}")]
    VirtualServerNotFound(VirtualServerId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted registry data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RegistryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns whether the error reports a missing record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CatalogServerNotFound(_)
                | Self::HubNotFound(_)
                | Self::ToolNotFound(_)
                | Self::VirtualServerNotFound(_)
        )
    }
}
