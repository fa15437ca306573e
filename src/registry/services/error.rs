//! Error type shared by the registry query services.

use crate::registry::{
    domain::{CatalogServerId, HubServerId, RegistryDomainError, ToolId},
    ports::RegistryError,
};
use thiserror::Error;

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum RegistryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RegistryDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RegistryError),
    /// The request is structurally invalid.
    #[error("invalid request: {0}")]
    Validation(String),
    /// No catalog server exists with the given identifier.
    #[error("catalog server {0} not found")]
    CatalogServerNotFound(CatalogServerId),
    /// No hub binding exists with the given identifier.
    #[error("hub server {0} not found")]
    HubNotFound(HubServerId),
    /// No tool exists with the given identifier.
    #[error("tool {0} not found")]
    ToolNotFound(ToolId),
    /// The caller does not own the hub binding.
    #[error("hub server {0} belongs to another user")]
    Forbidden(HubServerId),
}

/// Result type for registry service operations.
pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;
