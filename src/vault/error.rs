//! Error type for credential encryption.

use thiserror::Error;

/// Failures raised by [`super::CredentialVault`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// The configured key is not hex or has an unsupported length.
    #[error("invalid vault key: {reason}")]
    InvalidKey {
        /// Why the key was rejected. Never contains key material.
        reason: String,
    },
    /// The nonce does not match the cipher's nonce size.
    #[error("invalid nonce length {actual}, expected {expected}")]
    InvalidNonce {
        /// Required nonce length in bytes.
        expected: usize,
        /// Supplied nonce length in bytes.
        actual: usize,
    },
    /// The ciphertext failed its integrity check.
    #[error("ciphertext failed authentication")]
    AuthenticationFailed,
    /// The cipher refused to encrypt the payload.
    #[error("encryption failed")]
    EncryptionFailed,
    /// The operating system could not supply a random nonce.
    #[error("failed to generate nonce: {0}")]
    NonceGeneration(String),
    /// The stored envelope is not a `{nonce, cipher}` object of base64 text.
    #[error("malformed credential envelope: {0}")]
    MalformedEnvelope(String),
}
