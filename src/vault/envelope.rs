//! Persisted shape of an encrypted credential.

use super::VaultError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{"nonce": base64, "cipher": base64}` document stored in `auth_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Base64 nonce.
    pub nonce: String,
    /// Base64 ciphertext including the authentication tag.
    pub cipher: String,
}

impl EncryptedEnvelope {
    pub(super) fn from_parts(nonce: &[u8], cipher: &[u8]) -> Self {
        Self {
            nonce: STANDARD.encode(nonce),
            cipher: STANDARD.encode(cipher),
        }
    }

    /// Recognises an envelope inside a stored credential document.
    ///
    /// Returns `None` for anything that is not an object with string `nonce`
    /// and `cipher` members, such as a cleartext bearer token.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let nonce = object.get("nonce")?.as_str()?;
        let cipher = object.get("cipher")?.as_str()?;
        Some(Self {
            nonce: nonce.to_owned(),
            cipher: cipher.to_owned(),
        })
    }

    /// Returns the envelope as a JSON document for persistence.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({"nonce": self.nonce, "cipher": self.cipher})
    }

    pub(super) fn decode(&self) -> Result<(Vec<u8>, Vec<u8>), VaultError> {
        let nonce = STANDARD
            .decode(&self.nonce)
            .map_err(|err| VaultError::MalformedEnvelope(format!("nonce: {err}")))?;
        let cipher = STANDARD
            .decode(&self.cipher)
            .map_err(|err| VaultError::MalformedEnvelope(format!("cipher: {err}")))?;
        Ok((nonce, cipher))
    }
}
