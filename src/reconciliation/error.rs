//! Error type for reconciliation workflows.

use crate::{
    registry::{
        domain::{CatalogServerId, CatalogServerName, HubServerId, RegistryDomainError},
        ports::RegistryError,
    },
    upstream::UpstreamError,
    vault::VaultError,
};
use thiserror::Error;

/// Failures of catalog and hub add/refresh workflows.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] RegistryDomainError),
    /// Repository operation failed; nothing was written.
    #[error(transparent)]
    Repository(#[from] RegistryError),
    /// Upstream discovery failed; nothing was written.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// The credential could not be encrypted.
    #[error(transparent)]
    Vault(#[from] VaultError),
    /// No catalog server exists with the given identifier.
    #[error("catalog server {0} not found")]
    CatalogServerNotFound(CatalogServerId),
    /// No hub binding exists with the given identifier.
    #[error("hub server {0} not found")]
    HubNotFound(HubServerId),
    /// A catalog server with the same name already exists.
    #[error("catalog server name {0} is already registered")]
    DuplicateCatalogServer(CatalogServerName),
    /// The tenant is already bound to the catalog server.
    #[error("already bound to catalog server {0}")]
    DuplicateHub(CatalogServerId),
    /// The hub binding belongs to another tenant.
    #[error("hub server {0} belongs to another user")]
    Forbidden(HubServerId),
}

/// Result type for reconciliation workflows.
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;
