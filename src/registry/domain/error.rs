//! Error types for registry domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryDomainError {
    /// The catalog server name is empty after trimming.
    #[error("catalog server name must not be empty")]
    EmptyServerName,

    /// The catalog server name contains characters outside `[A-Za-z0-9_.-]`.
    #[error(
        "catalog server name '{0}' contains invalid characters (only letters, digits, '_', '.' and '-' allowed)"
    )]
    InvalidServerName(String),

    /// The catalog server name exceeds the storage limit.
    #[error("catalog server name exceeds 255 character limit: {0}")]
    ServerNameTooLong(String),

    /// The upstream URL is empty after trimming.
    #[error("upstream URL must not be empty")]
    EmptyServerUrl,

    /// The upstream URL is not an absolute `http` or `https` URL.
    #[error("upstream URL '{0}' must be an absolute http:// or https:// URL")]
    InvalidServerUrl(String),

    /// The transport name is empty after trimming.
    #[error("transport must not be empty")]
    EmptyTransport,

    /// The tenant identifier is empty after trimming.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// The tenant identifier exceeds the storage limit.
    #[error("user id exceeds 255 character limit: {0}")]
    UserIdTooLong(String),

    /// The virtual server name is empty after trimming.
    #[error("virtual server name must not be empty")]
    EmptyVirtualServerName,

    /// The virtual server name exceeds the storage limit.
    #[error("virtual server name exceeds 255 character limit: {0}")]
    VirtualServerNameTooLong(String),

    /// A discovered tool carries an empty name.
    #[error("tool name must not be empty")]
    EmptyToolName,

    /// The credential payload does not match its declared auth type.
    #[error("invalid auth value for auth type '{auth_type}': {reason}")]
    InvalidAuthValue {
        /// Auth type in canonical string form.
        auth_type: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// Error returned while parsing a record status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown record status: {0}")]
pub struct ParseRecordStatusError(pub String);

/// Error returned while parsing a hub binding status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown hub status: {0}")]
pub struct ParseHubStatusError(pub String);

/// Error returned while parsing a catalog access type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown access type: {0}")]
pub struct ParseAccessTypeError(pub String);

/// Error returned while parsing a hub auth type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown auth type: {0}")]
pub struct ParseAuthTypeError(pub String);
