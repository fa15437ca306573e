//! Resolution of stored hub credentials into outbound upstream headers.

use super::{CredentialVault, EncryptedEnvelope};
use crate::{registry::domain::AuthType, upstream::UpstreamHeaders};
use serde_json::Value;
use tracing::{debug, warn};

/// Header that carries bearer credentials.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Builds the headers for one upstream request from a hub's credential.
///
/// Never fails: an absent credential yields no headers, and undecryptable or
/// malformed credentials are logged and handled locally so that the call can
/// still be attempted.
#[must_use]
pub fn build_headers(
    auth_type: AuthType,
    auth_value: Option<&Value>,
    vault: Option<&CredentialVault>,
) -> UpstreamHeaders {
    let mut headers = UpstreamHeaders::new();
    let Some(value) = auth_value.filter(|value| !is_blank(value)) else {
        debug!(auth_type = auth_type.as_str(), "no stored credential");
        return headers;
    };
    match auth_type {
        AuthType::None => {}
        AuthType::Bearer => {
            if let Some(token) = bearer_token(value, vault) {
                headers.insert(AUTHORIZATION_HEADER.to_owned(), format!("Bearer {token}"));
            }
        }
        AuthType::CustomHeaders => {
            let custom = custom_headers(value, vault);
            debug!(count = custom.len(), "custom headers applied");
            headers.extend(custom);
        }
    }
    headers
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn bearer_token(value: &Value, vault: Option<&CredentialVault>) -> Option<String> {
    let raw = match (EncryptedEnvelope::from_value(value), vault) {
        (Some(envelope), Some(active)) => match active.decrypt_from_json(&envelope) {
            Ok(bytes) => {
                debug!(len = bytes.len(), "bearer credential decrypted");
                decode_token(&bytes)
            }
            Err(err) => {
                warn!(error = %err, "bearer credential could not be decrypted; using stored value");
                stored_text(value)
            }
        },
        (Some(_), None) => {
            warn!("bearer credential is encrypted but no vault key is configured");
            stored_text(value)
        }
        (None, _) => stored_text(value),
    };
    let token = raw.replace('"', "");
    let trimmed = token.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn decode_token(bytes: &[u8]) -> String {
    serde_json::from_slice::<String>(bytes)
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

fn stored_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn custom_headers(value: &Value, vault: Option<&CredentialVault>) -> UpstreamHeaders {
    let document = match EncryptedEnvelope::from_value(value) {
        None => value.clone(),
        Some(envelope) => {
            let Some(active) = vault else {
                warn!("custom headers are encrypted but no vault key is configured; skipping");
                return UpstreamHeaders::new();
            };
            let decoded = active
                .decrypt_from_json(&envelope)
                .map_err(|err| err.to_string())
                .and_then(|bytes| {
                    serde_json::from_slice::<Value>(&bytes).map_err(|err| err.to_string())
                });
            match decoded {
                Ok(plain) => plain,
                Err(reason) => {
                    warn!(error = %reason, "custom headers could not be decrypted; skipping");
                    return UpstreamHeaders::new();
                }
            }
        }
    };
    serde_json::from_value::<UpstreamHeaders>(document).unwrap_or_else(|err| {
        warn!(error = %err, "custom headers are not a map of strings; skipping");
        UpstreamHeaders::new()
    })
}
