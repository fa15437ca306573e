//! AES-GCM credential vault.

use super::{EncryptedEnvelope, VaultError};
use aes_gcm::{
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
    aead::{Aead, KeyInit, consts::U12},
    aes::Aes192,
};
use rand::{RngCore, rngs::OsRng};
use serde_json::Value;
use std::fmt;

/// Nonce length in bytes for every supported key size.
pub const NONCE_LENGTH: usize = 12;

type Aes192Gcm = AesGcm<Aes192, U12>;

#[derive(Clone)]
enum Cipher {
    Aes128(Box<Aes128Gcm>),
    Aes192(Box<Aes192Gcm>),
    Aes256(Box<Aes256Gcm>),
}

/// Symmetric vault for tenant credentials.
///
/// The AES variant follows the key length: 16, 24 or 32 bytes select
/// AES-128, AES-192 or AES-256 in GCM mode.
#[derive(Clone)]
pub struct CredentialVault {
    cipher: Cipher,
}

impl fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVault")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

impl CredentialVault {
    /// Builds a vault from a hex-encoded key.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidKey`] when the text is not hex or does not
    /// decode to 16, 24 or 32 bytes.
    pub fn from_hex(hex_key: &str) -> Result<Self, VaultError> {
        let key = hex::decode(hex_key.trim()).map_err(|err| VaultError::InvalidKey {
            reason: err.to_string(),
        })?;
        let invalid_length = |_| VaultError::InvalidKey {
            reason: format!("expected 16, 24 or 32 bytes, got {}", key.len()),
        };
        let cipher = match key.len() {
            16 => Cipher::Aes128(Box::new(
                Aes128Gcm::new_from_slice(&key).map_err(invalid_length)?,
            )),
            24 => Cipher::Aes192(Box::new(
                Aes192Gcm::new_from_slice(&key).map_err(invalid_length)?,
            )),
            32 => Cipher::Aes256(Box::new(
                Aes256Gcm::new_from_slice(&key).map_err(invalid_length)?,
            )),
            other => {
                return Err(VaultError::InvalidKey {
                    reason: format!("expected 16, 24 or 32 bytes, got {other}"),
                });
            }
        };
        Ok(Self { cipher })
    }

    /// Key size in bits.
    #[must_use]
    pub const fn key_bits(&self) -> u16 {
        match self.cipher {
            Cipher::Aes128(_) => 128,
            Cipher::Aes192(_) => 192,
            Cipher::Aes256(_) => 256,
        }
    }

    /// Encrypts `plaintext` under `nonce`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidNonce`] when `nonce` is not
    /// [`NONCE_LENGTH`] bytes.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, VaultError> {
        let nonce = checked_nonce(nonce)?;
        let sealed = match &self.cipher {
            Cipher::Aes128(cipher) => cipher.encrypt(&nonce, plaintext),
            Cipher::Aes192(cipher) => cipher.encrypt(&nonce, plaintext),
            Cipher::Aes256(cipher) => cipher.encrypt(&nonce, plaintext),
        };
        sealed.map_err(|_| VaultError::EncryptionFailed)
    }

    /// Decrypts and authenticates `ciphertext` under `nonce`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidNonce`] for a mis-sized nonce and
    /// [`VaultError::AuthenticationFailed`] for a wrong key or tampered data.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, VaultError> {
        let nonce = checked_nonce(nonce)?;
        let opened = match &self.cipher {
            Cipher::Aes128(cipher) => cipher.decrypt(&nonce, ciphertext),
            Cipher::Aes192(cipher) => cipher.decrypt(&nonce, ciphertext),
            Cipher::Aes256(cipher) => cipher.decrypt(&nonce, ciphertext),
        };
        opened.map_err(|_| VaultError::AuthenticationFailed)
    }

    /// Encrypts `payload` under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NonceGeneration`] when the OS random source fails.
    pub fn encrypt_to_json(&self, payload: &[u8]) -> Result<EncryptedEnvelope, VaultError> {
        let mut nonce = [0_u8; NONCE_LENGTH];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|err| VaultError::NonceGeneration(err.to_string()))?;
        let cipher = self.encrypt(payload, &nonce)?;
        Ok(EncryptedEnvelope::from_parts(&nonce, &cipher))
    }

    /// Decrypts an envelope produced by [`Self::encrypt_to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::MalformedEnvelope`] for bad base64 and the errors
    /// of [`Self::decrypt`].
    pub fn decrypt_from_json(&self, envelope: &EncryptedEnvelope) -> Result<Vec<u8>, VaultError> {
        let (nonce, cipher) = envelope.decode()?;
        self.decrypt(&cipher, &nonce)
    }

    /// Encrypts a credential document and returns the envelope document that
    /// replaces it in storage.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::encrypt_to_json`].
    pub fn seal_value(&self, credential: &Value) -> Result<Value, VaultError> {
        let payload = credential.to_string();
        Ok(self.encrypt_to_json(payload.as_bytes())?.to_value())
    }
}

fn checked_nonce(nonce: &[u8]) -> Result<Nonce<U12>, VaultError> {
    Nonce::<U12>::from_exact_iter(nonce.iter().copied()).ok_or(VaultError::InvalidNonce {
        expected: NONCE_LENGTH,
        actual: nonce.len(),
    })
}
