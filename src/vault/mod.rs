//! Credential Vault and header builder.
//!
//! Tenant credentials are sealed with AES-GCM before they are stored and
//! opened again only when outbound headers are built. The vault is optional:
//! without a key, credentials are stored as cleartext JSON and the header
//! builder uses them as-is.

mod cipher;
mod envelope;
mod error;
mod headers;

pub use cipher::{CredentialVault, NONCE_LENGTH};
pub use envelope::EncryptedEnvelope;
pub use error::VaultError;
pub use headers::{AUTHORIZATION_HEADER, build_headers};
