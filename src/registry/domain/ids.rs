//! Identifier newtypes for catalog servers, hub bindings, tools, virtual
//! servers, and tenants.
//!
//! Record identifiers wrap UUIDs so a hub id can never be passed where a tool
//! id is expected. Tenant identifiers are opaque strings supplied by the
//! identity layer in front of the gateway.

use super::RegistryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a server registered in the global catalog.
///
/// # Examples
///
/// ```
/// use toolgate::registry::domain::CatalogServerId;
///
/// let id = CatalogServerId::new();
/// assert!(!id.as_ref().is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogServerId(Uuid);

impl CatalogServerId {
    /// Creates a new random catalog server identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for CatalogServerId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for CatalogServerId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CatalogServerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a tenant's binding to a catalog server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HubServerId(Uuid);

impl HubServerId {
    /// Creates a new random hub binding identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for HubServerId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for HubServerId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for HubServerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a materialized tool row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(Uuid);

impl ToolId {
    /// Creates a new random tool identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ToolId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for ToolId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a tenant-composed virtual server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VirtualServerId(Uuid);

impl VirtualServerId {
    /// Creates a new random virtual server identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for VirtualServerId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for VirtualServerId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for VirtualServerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Maximum stored length of a tenant identifier.
pub const MAX_USER_ID_LENGTH: usize = 255;

/// Opaque tenant identifier.
///
/// # Examples
///
/// ```
/// use toolgate::registry::domain::UserId;
///
/// let user = UserId::new("  tenant-a ").expect("valid user id");
/// assert_eq!(user.as_str(), "tenant-a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a validated tenant identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::EmptyUserId`] when the trimmed value is
    /// empty and [`RegistryDomainError::UserIdTooLong`] when it exceeds
    /// [`MAX_USER_ID_LENGTH`] characters.
    pub fn new(value: impl AsRef<str>) -> Result<Self, RegistryDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RegistryDomainError::EmptyUserId);
        }
        if trimmed.chars().count() > MAX_USER_ID_LENGTH {
            return Err(RegistryDomainError::UserIdTooLong(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
