//! Virtual server aggregate: a tenant-named bundle of tools exposed as one
//! MCP endpoint.

use super::{RecordStatus, RegistryDomainError, UserId, VirtualServerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum stored length of a virtual server name.
pub const MAX_VIRTUAL_SERVER_NAME_LENGTH: usize = 255;

/// Default cap on tools attached to one virtual server.
pub const DEFAULT_MAX_TOOLS_PER_VIRTUAL_SERVER: usize = 50;

/// Validated virtual server display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VirtualServerName(String);

impl VirtualServerName {
    /// Creates a validated virtual server name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError`] when the trimmed name is empty or too
    /// long.
    pub fn new(value: impl AsRef<str>) -> Result<Self, RegistryDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RegistryDomainError::EmptyVirtualServerName);
        }
        if trimmed.chars().count() > MAX_VIRTUAL_SERVER_NAME_LENGTH {
            return Err(RegistryDomainError::VirtualServerNameTooLong(
                trimmed.to_owned(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VirtualServerName {
    type Error = RegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VirtualServerName> for String {
    fn from(value: VirtualServerName) -> Self {
        value.0
    }
}

impl fmt::Display for VirtualServerName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Parameter object for reconstructing a persisted virtual server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedVirtualServerData {
    /// Persisted identifier.
    pub id: VirtualServerId,
    /// Persisted owner.
    pub user_id: UserId,
    /// Persisted name.
    pub name: VirtualServerName,
    /// Persisted status.
    pub status: RecordStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Virtual server aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualServer {
    id: VirtualServerId,
    user_id: UserId,
    name: VirtualServerName,
    status: RecordStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VirtualServer {
    /// Creates a new active virtual server.
    #[must_use]
    pub fn new(user_id: UserId, name: VirtualServerName, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: VirtualServerId::new(),
            user_id,
            name,
            status: RecordStatus::Active,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a virtual server from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedVirtualServerData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            name: data.name,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> VirtualServerId {
        self.id
    }

    /// Returns the owning tenant.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &VirtualServerName {
        &self.name
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

    /// Returns whether `user_id` owns this virtual server.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Changes the status.
    pub fn set_status(&mut self, status: RecordStatus, clock: &impl Clock) {
        self.status = status;
        self.updated_at = clock.utc();
    }
}
