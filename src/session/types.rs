// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Persisted session record

use crate::crypto::{DoubleWrappedKey, WrappedKey};
use serde::{Deserialize, Serialize};

/// The only session state ever persisted
///
/// Serialized as camelCase JSON. Contains no plaintext secrets: the
/// credentials are ciphertext and the key that opens them is present only in
/// its two wrapped forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub session_id: String,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds
    pub expires_at: i64,
    pub refresh_count: u32,
    pub encrypted_credentials: String,
    #[serde(rename = "credentialsIV")]
    pub credentials_iv: String,
    /// Credentials key wrapped under the device-bound key
    pub device: WrappedKey,
    /// Credentials key wrapped under the origin key
    pub origin: WrappedKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_fingerprint: Option<String>,
}

impl SessionData {
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }

    pub fn wrapped_keys(&self) -> DoubleWrappedKey {
        DoubleWrappedKey {
            device: self.device.clone(),
            origin: self.origin.clone(),
        }
    }

    /// Structural checks beyond what deserialization enforces
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.session_id.is_empty() {
            return Err("sessionId is empty".to_string());
        }
        if self.expires_at <= self.created_at {
            return Err(format!(
                "expiresAt ({}) is not after createdAt ({})",
                self.expires_at, self.created_at
            ));
        }
        Ok(())
    }
}

/// Non-secret view of the active session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub refresh_count: u32,
}

impl From<&SessionData> for SessionInfo {
    fn from(data: &SessionData) -> Self {
        Self {
            session_id: data.session_id.clone(),
            created_at: data.created_at,
            expires_at: data.expires_at,
            refresh_count: data.refresh_count,
        }
    }
}
