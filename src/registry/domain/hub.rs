//! Hub binding aggregate: one tenant's connection to one catalog server,
//! optionally carrying encrypted upstream credentials.

use super::{
    CatalogServer, CatalogServerId, HubServerId, HubStatus, ParseAuthTypeError,
    RegistryDomainError, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How a hub binding authenticates against its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// No credentials are sent.
    None,
    /// The stored value is a bearer token sent as `Authorization: Bearer`.
    Bearer,
    /// The stored value is a map of arbitrary header names to values.
    CustomHeaders,
}

impl AuthType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer => "bearer",
            Self::CustomHeaders => "custom_headers",
        }
    }

    /// Returns whether values of this type are encrypted at rest.
    #[must_use]
    pub const fn carries_secret(self) -> bool {
        matches!(self, Self::Bearer | Self::CustomHeaders)
    }

    /// Checks that a plaintext credential payload matches this auth type.
    ///
    /// Bearer payloads must be a non-empty JSON string and custom header
    /// payloads a non-empty JSON object of string values. `none` drops any
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidAuthValue`] when the payload
    /// shape does not match.
    pub fn normalize_value(self, value: Option<Value>) -> Result<Option<Value>, RegistryDomainError> {
        let present = value.filter(|candidate| !candidate.is_null());
        match (self, present) {
            (Self::None, None) => Ok(None),
            (Self::None, Some(_)) => Err(self.invalid("auth type 'none' takes no value")),
            (Self::Bearer | Self::CustomHeaders, None) => Err(self.invalid("a value is required")),
            (Self::Bearer, Some(Value::String(token))) if !token.trim().is_empty() => {
                Ok(Some(Value::String(token)))
            }
            (Self::Bearer, Some(_)) => Err(self.invalid("expected a non-empty JSON string")),
            (Self::CustomHeaders, Some(Value::Object(headers))) => {
                if headers.is_empty() {
                    return Err(self.invalid("expected at least one header"));
                }
                if let Some((name, _)) = headers.iter().find(|(_, header)| !header.is_string()) {
                    return Err(self.invalid(&format!("header '{name}' must be a string")));
                }
                Ok(Some(Value::Object(headers)))
            }
            (Self::CustomHeaders, Some(_)) => {
                Err(self.invalid("expected a JSON object of header names to values"))
            }
        }
    }

    fn invalid(self, reason: &str) -> RegistryDomainError {
        RegistryDomainError::InvalidAuthValue {
            auth_type: self.as_str().to_owned(),
            reason: reason.to_owned(),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuthType {
    type Error = ParseAuthTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "" | "none" => Ok(Self::None),
            "bearer" => Ok(Self::Bearer),
            "custom_headers" => Ok(Self::CustomHeaders),
            _ => Err(ParseAuthTypeError(value.to_owned())),
        }
    }
}

/// Parameter object for creating a hub binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubServerDraft {
    /// Owning tenant.
    pub user_id: UserId,
    /// Bound catalog server.
    pub catalog_server_id: CatalogServerId,
    /// Credential kind.
    pub auth_type: AuthType,
    /// Stored credential, already encrypted when a vault is configured.
    pub auth_value: Option<Value>,
}

/// Parameter object for reconstructing persisted hub state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedHubServerData {
    /// Persisted binding identifier.
    pub id: HubServerId,
    /// Persisted owner.
    pub user_id: UserId,
    /// Persisted catalog server reference.
    pub catalog_server_id: CatalogServerId,
    /// Persisted status.
    pub status: HubStatus,
    /// Persisted auth type.
    pub auth_type: AuthType,
    /// Persisted credential document.
    pub auth_value: Option<Value>,
    /// Persisted capabilities seen through this binding.
    pub capabilities: Option<Value>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Hub binding aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubServer {
    id: HubServerId,
    user_id: UserId,
    catalog_server_id: CatalogServerId,
    status: HubStatus,
    auth_type: AuthType,
    auth_value: Option<Value>,
    capabilities: Option<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HubServer {
    /// Creates a new active hub binding.
    #[must_use]
    pub fn new(draft: HubServerDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: HubServerId::new(),
            user_id: draft.user_id,
            catalog_server_id: draft.catalog_server_id,
            status: HubStatus::Active,
            auth_type: draft.auth_type,
            auth_value: draft.auth_value,
            capabilities: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a hub binding from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedHubServerData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            catalog_server_id: data.catalog_server_id,
            status: data.status,
            auth_type: data.auth_type,
            auth_value: data.auth_value,
            capabilities: data.capabilities,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the binding identifier.
    #[must_use]
    pub const fn id(&self) -> HubServerId {
        self.id
    }

    /// Returns the owning tenant.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the bound catalog server.
    #[must_use]
    pub const fn catalog_server_id(&self) -> CatalogServerId {
        self.catalog_server_id
    }

    /// Returns the binding status.
    #[must_use]
    pub const fn status(&self) -> HubStatus {
        self.status
    }

    /// Returns the credential kind.
    #[must_use]
    pub const fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    /// Returns the stored credential document.
    #[must_use]
    pub const fn auth_value(&self) -> Option<&Value> {
        self.auth_value.as_ref()
    }

    /// Returns the capabilities observed through this binding.
    #[must_use]
    pub const fn capabilities(&self) -> Option<&Value> {
        self.capabilities.as_ref()
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

    /// Returns whether `user_id` owns this binding.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Stores the capabilities returned during discovery.
    pub fn record_capabilities(&mut self, capabilities: Value, clock: &impl Clock) {
        self.capabilities = Some(capabilities);
        self.updated_at = clock.utc();
    }

    /// Changes the binding status.
    pub fn set_status(&mut self, status: HubStatus, clock: &impl Clock) {
        self.status = status;
        self.updated_at = clock.utc();
    }
}

/// A hub binding joined with the catalog server it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubWithServer {
    /// The tenant binding.
    pub hub: HubServer,
    /// The bound catalog server.
    pub server: CatalogServer,
}
