// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Double key wrap
//!
//! The credentials key is wrapped twice, once under the device-bound key and
//! once under the origin-bound key. Unwrapping recovers it through both paths
//! independently and only trusts the result when the two recovered keys
//! behave identically. Losing either binding makes the credentials key
//! unrecoverable.

use super::aes_gcm::{unwrap_key, wrap_key};
use super::error::CryptoError;
use super::key::{KeyHandle, WrappedKey, IV_LEN};
use super::provider::SymmetricKeyProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Fixed probe encrypted under both candidate keys by [`KeyWrapper::keys_match`]
const KEY_CHECK_PLAINTEXT: &[u8] = b"lnc-session key agreement probe";

/// The same credentials key wrapped under the device key and the origin key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleWrappedKey {
    pub device: WrappedKey,
    pub origin: WrappedKey,
}

/// Compare two byte strings without an early exit
///
/// Slices of different lengths never match.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Wraps and unwraps the credentials key under both bindings
#[derive(Clone)]
pub struct KeyWrapper {
    provider: Arc<dyn SymmetricKeyProvider>,
}

impl KeyWrapper {
    pub fn new(provider: Arc<dyn SymmetricKeyProvider>) -> Self {
        Self { provider }
    }

    /// Wrap `credentials_key` independently under each binding key
    pub async fn wrap_credentials_key(
        &self,
        credentials_key: &KeyHandle,
        device_key: &KeyHandle,
        origin_key: &KeyHandle,
    ) -> Result<DoubleWrappedKey, CryptoError> {
        let device = wrap_key(self.provider.as_ref(), credentials_key, device_key).await?;
        let origin = wrap_key(self.provider.as_ref(), credentials_key, origin_key).await?;
        Ok(DoubleWrappedKey { device, origin })
    }

    /// Recover the credentials key through both paths
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyUnwrapMismatch` if either path fails to
    /// unwrap, the two recovered keys disagree, or the agreement check itself
    /// fails. There is no fallback to a single path.
    pub async fn unwrap_credentials_key(
        &self,
        wrapped: &DoubleWrappedKey,
        device_key: &KeyHandle,
        origin_key: &KeyHandle,
    ) -> Result<KeyHandle, CryptoError> {
        let provider = self.provider.as_ref();
        let via_device = unwrap_key(
            provider,
            &wrapped.device.key_b64,
            &wrapped.device.iv_b64,
            device_key,
            false,
        )
        .await;
        let via_origin = unwrap_key(
            provider,
            &wrapped.origin.key_b64,
            &wrapped.origin.iv_b64,
            origin_key,
            false,
        )
        .await;

        let (from_device, from_origin) = match (via_device, via_origin) {
            (Ok(d), Ok(o)) => (d, o),
            (d, o) => {
                tracing::debug!(
                    device_path_ok = d.is_ok(),
                    origin_path_ok = o.is_ok(),
                    "credentials key unwrap failed on at least one path"
                );
                return Err(CryptoError::KeyUnwrapMismatch);
            }
        };

        match self.keys_match(&from_device, &from_origin).await {
            Ok(true) => Ok(from_device),
            Ok(false) => {
                tracing::debug!("device and origin paths recovered different keys");
                Err(CryptoError::KeyUnwrapMismatch)
            }
            Err(e) => {
                tracing::debug!("key agreement check failed: {}", e);
                Err(CryptoError::KeyUnwrapMismatch)
            }
        }
    }

    /// Behavioral equality of two keys
    ///
    /// Encrypts a fixed probe under a fixed all-zero IV with each key and
    /// compares the ciphertexts in constant time. The IV reuse is confined to
    /// this probe, which is never stored or sent anywhere.
    pub async fn keys_match(&self, a: &KeyHandle, b: &KeyHandle) -> Result<bool, CryptoError> {
        let iv = [0u8; IV_LEN];
        let probe_a = self.provider.encrypt(a, &iv, KEY_CHECK_PLAINTEXT).await?;
        let probe_b = self.provider.encrypt(b, &iv, KEY_CHECK_PLAINTEXT).await?;
        Ok(constant_time_eq(&probe_a, &probe_b))
    }
}
