//! HTTP error type and mappings from service errors to status codes.

use crate::{
    composer::ComposerError,
    reconciliation::ReconciliationError,
    registry::{domain::RegistryDomainError, ports::RegistryError, services::RegistryServiceError},
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Error returned by administrative handlers.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request is malformed or violates a domain rule.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// No principal was supplied.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The principal may not perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The addressed resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The upstream MCP server failed.
    #[error("bad gateway: {0}")]
    BadGateway(String),
    /// Persistence or another internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl HttpError {
    /// Returns the status code sent for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!(error = %detail, "request failed with an internal error");
                "internal error".to_owned()
            }
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::BadGateway(msg) => msg,
        };
        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RegistryDomainError> for HttpError {
    fn from(err: RegistryDomainError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<RegistryError> for HttpError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateCatalogServerName(_)
            | RegistryError::DuplicateHub { .. }
            | RegistryError::DuplicateToolName(_) => Self::Conflict(err.to_string()),
            RegistryError::CatalogServerNotFound(_)
            | RegistryError::HubNotFound(_)
            | RegistryError::ToolNotFound(_)
            | RegistryError::VirtualServerNotFound(_) => Self::NotFound(err.to_string()),
            RegistryError::ToolNotActive(_) => Self::BadRequest(err.to_string()),
            RegistryError::InvalidPersistedData(_) | RegistryError::Persistence(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<RegistryServiceError> for HttpError {
    fn from(err: RegistryServiceError) -> Self {
        match err {
            RegistryServiceError::Domain(inner) => inner.into(),
            RegistryServiceError::Repository(inner) => inner.into(),
            RegistryServiceError::Validation(msg) => Self::BadRequest(msg),
            RegistryServiceError::CatalogServerNotFound(_)
            | RegistryServiceError::HubNotFound(_)
            | RegistryServiceError::ToolNotFound(_) => Self::NotFound(err.to_string()),
            RegistryServiceError::Forbidden(_) => Self::Forbidden(err.to_string()),
        }
    }
}

impl From<ReconciliationError> for HttpError {
    fn from(err: ReconciliationError) -> Self {
        match err {
            ReconciliationError::Domain(inner) => inner.into(),
            ReconciliationError::Repository(inner) => inner.into(),
            ReconciliationError::Upstream(inner) => Self::BadGateway(inner.to_string()),
            ReconciliationError::Vault(inner) => Self::Internal(inner.to_string()),
            ReconciliationError::CatalogServerNotFound(_) | ReconciliationError::HubNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            ReconciliationError::DuplicateCatalogServer(_)
            | ReconciliationError::DuplicateHub(_) => Self::Conflict(err.to_string()),
            ReconciliationError::Forbidden(_) => Self::Forbidden(err.to_string()),
        }
    }
}

impl From<ComposerError> for HttpError {
    fn from(err: ComposerError) -> Self {
        match err {
            ComposerError::Domain(inner) => inner.into(),
            ComposerError::Repository(inner) => inner.into(),
            ComposerError::NotFound(_) => Self::NotFound(err.to_string()),
            ComposerError::ToolNotVisible(_) => Self::Forbidden(err.to_string()),
            ComposerError::TooManyTools { .. } => Self::BadRequest(err.to_string()),
        }
    }
}
