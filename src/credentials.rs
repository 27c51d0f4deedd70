// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Credentials encryption
//!
//! The credential payload is serialized to JSON and encrypted under a fresh
//! per-session key. Decryption re-validates the payload shape so a decoding
//! bug can never surface as a partially-populated credentials value.

use crate::crypto::{
    auth_decrypt, auth_encrypt, generate_credentials_key, CryptoError, KeyHandle,
    SymmetricKeyProvider,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

/// The secrets needed to reconnect to a node
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    pub local_key: String,
    pub remote_key: String,
    pub pairing_phrase: String,
    pub server_host: String,
}

impl SessionCredentials {
    pub fn new(
        local_key: impl Into<String>,
        remote_key: impl Into<String>,
        pairing_phrase: impl Into<String>,
        server_host: impl Into<String>,
    ) -> Self {
        Self {
            local_key: local_key.into(),
            remote_key: remote_key.into(),
            pairing_phrase: pairing_phrase.into(),
            server_host: server_host.into(),
        }
    }

    /// Strict shape check: an object whose four fields are all strings
    fn from_json_value(value: &Value) -> Option<Self> {
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            local_key: field("localKey")?,
            remote_key: field("remoteKey")?,
            pairing_phrase: field("pairingPhrase")?,
            server_host: field("serverHost")?,
        })
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("local_key", &"<redacted>")
            .field("remote_key", &"<redacted>")
            .field("pairing_phrase", &"<redacted>")
            .field("server_host", &self.server_host)
            .finish()
    }
}

impl Drop for SessionCredentials {
    fn drop(&mut self) {
        self.local_key.zeroize();
        self.remote_key.zeroize();
        self.pairing_phrase.zeroize();
    }
}

/// Ciphertext of a credentials payload plus the key that opens it
#[derive(Debug, Clone)]
pub struct EncryptedCredentials {
    pub credentials_key: KeyHandle,
    pub ciphertext_b64: String,
    pub iv_b64: String,
}

/// Encrypts and decrypts [`SessionCredentials`]
#[derive(Clone)]
pub struct CredentialsEncrypter {
    provider: Arc<dyn SymmetricKeyProvider>,
}

impl CredentialsEncrypter {
    pub fn new(provider: Arc<dyn SymmetricKeyProvider>) -> Self {
        Self { provider }
    }

    /// Encrypt under a freshly generated credentials key
    pub async fn encrypt(
        &self,
        credentials: &SessionCredentials,
    ) -> Result<EncryptedCredentials, CryptoError> {
        let credentials_key = generate_credentials_key(self.provider.as_ref()).await?;
        let plaintext = Zeroizing::new(serde_json::to_vec(credentials).map_err(|e| {
            CryptoError::EncryptionFailed {
                operation: "Credential encryption".to_string(),
                reason: format!("failed to serialize credentials: {}", e),
            }
        })?);

        let payload = auth_encrypt(self.provider.as_ref(), &credentials_key, &plaintext).await?;
        Ok(EncryptedCredentials {
            credentials_key,
            ciphertext_b64: payload.ciphertext_b64,
            iv_b64: payload.iv_b64,
        })
    }

    /// Decrypt and validate a credentials payload
    ///
    /// # Errors
    ///
    /// - `CryptoError::DecryptionFailed` if authentication fails or the
    ///   plaintext is not JSON
    /// - `CryptoError::InvalidCredentialsShape` if any of the four fields is
    ///   missing or not a string
    pub async fn decrypt(
        &self,
        encrypted: &EncryptedCredentials,
    ) -> Result<SessionCredentials, CryptoError> {
        let plaintext = Zeroizing::new(
            auth_decrypt(
                self.provider.as_ref(),
                &encrypted.credentials_key,
                &encrypted.ciphertext_b64,
                &encrypted.iv_b64,
            )
            .await?,
        );

        let value: Value =
            serde_json::from_slice(&plaintext).map_err(|e| CryptoError::DecryptionFailed {
                operation: "Credential decryption".to_string(),
                reason: format!("plaintext is not valid JSON: {}", e),
            })?;

        SessionCredentials::from_json_value(&value).ok_or(CryptoError::InvalidCredentialsShape)
    }
}
