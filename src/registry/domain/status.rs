//! Status values shared by tools, virtual servers, and hub bindings.

use super::{ParseHubStatusError, ParseRecordStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Soft-delete status for tools and virtual servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// The record is visible and usable.
    Active,
    /// The record was retired by an operator.
    Deactivated,
}

impl RecordStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Deactivated => "DEACTIVATED",
        }
    }

    /// Returns whether the record is active.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RecordStatus {
    type Error = ParseRecordStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "ACTIVE" => Ok(Self::Active),
            "DEACTIVATED" => Ok(Self::Deactivated),
            _ => Err(ParseRecordStatusError(value.to_owned())),
        }
    }
}

/// Status of a tenant's binding to a catalog server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubStatus {
    /// The binding is usable.
    Active,
    /// The binding was disabled by its owner.
    Deactivated,
    /// The upstream could not be reached on the last attempt.
    Unreachable,
}

impl HubStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Deactivated => "DEACTIVATED",
            Self::Unreachable => "UNREACHABLE",
        }
    }
}

impl fmt::Display for HubStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HubStatus {
    type Error = ParseHubStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "ACTIVE" => Ok(Self::Active),
            "DEACTIVATED" => Ok(Self::Deactivated),
            "UNREACHABLE" => Ok(Self::Unreachable),
            _ => Err(ParseHubStatusError(value.to_owned())),
        }
    }
}
