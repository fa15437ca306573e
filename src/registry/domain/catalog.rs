//! Catalog server aggregate: the global, operator-managed list of upstream
//! MCP servers.

use super::{CatalogServerId, ParseAccessTypeError, RegistryDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use url::Url;

/// Maximum stored length of a catalog server name.
pub const MAX_SERVER_NAME_LENGTH: usize = 255;

/// Transport used when a registration does not name one.
pub const DEFAULT_TRANSPORT: &str = "streamable-http";

/// Validated catalog server name.
///
/// Names prefix every modified tool name derived from the server, so they are
/// restricted to characters that stay readable inside tool identifiers.
///
/// # Examples
///
/// ```
/// use toolgate::registry::domain::CatalogServerName;
///
/// let name = CatalogServerName::new("weather").expect("valid name");
/// assert_eq!(name.as_str(), "weather");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CatalogServerName(String);

impl CatalogServerName {
    /// Creates a validated catalog server name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when the name is empty, too long, or
    /// contains characters outside `[A-Za-z0-9_.-]`.
    pub fn new(value: impl AsRef<str>) -> Result<Self, RegistryDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RegistryDomainError::EmptyServerName);
        }
        if trimmed.chars().count() > MAX_SERVER_NAME_LENGTH {
            return Err(RegistryDomainError::ServerNameTooLong(trimmed.to_owned()));
        }
        let valid = trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'));
        if !valid {
            return Err(RegistryDomainError::InvalidServerName(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CatalogServerName {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CatalogServerName> for String {
    fn from(value: CatalogServerName) -> Self {
        value.0
    }
}

impl fmt::Display for CatalogServerName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Validated absolute `http` or `https` upstream URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerUrl(String);

impl ServerUrl {
    /// Creates a validated upstream URL.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyServerUrl`] for blank input and
    /// [`RegistryDomainError::InvalidServerUrl`] when the value does not parse
    /// as an absolute `http` or `https` URL.
    pub fn new(value: impl AsRef<str>) -> Result<Self, RegistryDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RegistryDomainError::EmptyServerUrl);
        }
        let parsed = Url::parse(trimmed)
            .map_err(|_| RegistryDomainError::InvalidServerUrl(trimmed.to_owned()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(RegistryDomainError::InvalidServerUrl(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServerUrl {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServerUrl> for String {
    fn from(value: ServerUrl) -> Self {
        value.0
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Whether a catalog server's tools are shared or bound per tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Tools are discovered once and shared by every tenant.
    Public,
    /// Tools are discovered per tenant with that tenant's credentials.
    Private,
}

impl AccessType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AccessType {
    type Error = ParseAccessTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            _ => Err(ParseAccessTypeError(value.to_owned())),
        }
    }
}

/// Parameter object for registering a new catalog server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogServerDraft {
    /// Unique server name.
    pub name: CatalogServerName,
    /// Upstream MCP endpoint.
    pub url: ServerUrl,
    /// Operator-facing description.
    pub description: String,
    /// Transport label; blank values fall back to [`DEFAULT_TRANSPORT`].
    pub transport: String,
    /// Shared or per-tenant access.
    pub access_type: AccessType,
}

/// Parameter object for reconstructing persisted catalog server state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCatalogServerData {
    /// Persisted server identifier.
    pub id: CatalogServerId,
    /// Persisted server name.
    pub name: CatalogServerName,
    /// Persisted upstream URL.
    pub url: ServerUrl,
    /// Persisted description.
    pub description: String,
    /// Persisted upstream capabilities, if discovered.
    pub capabilities: Option<Value>,
    /// Persisted transport label.
    pub transport: String,
    /// Persisted access type.
    pub access_type: AccessType,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Catalog server aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogServer {
    id: CatalogServerId,
    name: CatalogServerName,
    url: ServerUrl,
    description: String,
    capabilities: Option<Value>,
    transport: String,
    access_type: AccessType,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CatalogServer {
    /// Creates a new catalog server with no discovered capabilities.
    #[must_use]
    pub fn new(draft: CatalogServerDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let transport = match draft.transport.trim() {
            "" => DEFAULT_TRANSPORT.to_owned(),
            other => other.to_owned(),
        };
        Self {
            id: CatalogServerId::new(),
            name: draft.name,
            url: draft.url,
            description: draft.description,
            capabilities: None,
            transport,
            access_type: draft.access_type,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a catalog server from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedCatalogServerData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            url: data.url,
            description: data.description,
            capabilities: data.capabilities,
            transport: data.transport,
            access_type: data.access_type,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the server identifier.
    #[must_use]
    pub const fn id(&self) -> CatalogServerId {
        self.id
    }

    /// Returns the unique server name.
    #[must_use]
    pub const fn name(&self) -> &CatalogServerName {
        &self.name
    }

    /// Returns the upstream URL.
    #[must_use]
    pub const fn url(&self) -> &ServerUrl {
        &self.url
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the last discovered capabilities document.
    #[must_use]
    pub const fn capabilities(&self) -> Option<&Value> {
        self.capabilities.as_ref()
    }

    /// Returns the transport label.
    #[must_use]
    pub fn transport(&self) -> &str {
        &self.transport
    }

    /// Returns the access type.
    #[must_use]
    pub const fn access_type(&self) -> AccessType {
        self.access_type
    }

    /// Returns whether tools are shared across tenants.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self.access_type, AccessType::Public)
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

    /// Stores a freshly discovered capabilities document.
    pub fn record_capabilities(&mut self, capabilities: Value, clock: &impl Clock) {
        self.capabilities = Some(capabilities);
        self.updated_at = clock.utc();
    }

    /// Replaces the operator-editable details.
    pub fn update_details(&mut self, url: ServerUrl, description: String, clock: &impl Clock) {
        self.url = url;
        self.description = description;
        self.updated_at = clock.utc();
    }
}
