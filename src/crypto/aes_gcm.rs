// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AES-GCM primitives for session protection
//!
//! Thin helpers over a [`SymmetricKeyProvider`] shared by every component of
//! the session core.
//!
//! **Encoding**: ciphertexts and IVs are kept as separate standard-base64
//! fields, Web Crypto style:
//! ```text
//! ciphertext_b64 = base64(ciphertext || tag)
//! iv_b64         = base64(12-byte random IV)
//! ```
//! A fresh IV is drawn for every encryption and every wrap.

use super::error::CryptoError;
use super::key::{KeyHandle, KeyUsage, WrappedKey, IV_LEN};
use super::provider::SymmetricKeyProvider;
use base64::{engine::general_purpose::STANDARD, Engine};

/// Base64 ciphertext (tag included) plus its IV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub ciphertext_b64: String,
    pub iv_b64: String,
}

/// Draw a fresh random 96-bit IV
pub fn random_iv(provider: &dyn SymmetricKeyProvider) -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    provider.fill_random(&mut iv);
    iv
}

/// Decode a base64 IV and check its size
pub fn decode_iv(iv_b64: &str) -> Result<[u8; IV_LEN], CryptoError> {
    let bytes = STANDARD.decode(iv_b64)?;
    bytes.as_slice().try_into().map_err(|_| CryptoError::InvalidPayload {
        field: "iv".to_string(),
        reason: format!("expected {} bytes, got {}", IV_LEN, bytes.len()),
    })
}

/// Generate the ephemeral credentials key
///
/// The key is extractable only so it can be wrapped under the device and
/// origin keys; nothing ever exports it in the clear.
pub async fn generate_credentials_key(
    provider: &dyn SymmetricKeyProvider,
) -> Result<KeyHandle, CryptoError> {
    provider.generate_key(true, KeyUsage::EncryptDecrypt).await
}

/// Authenticated-encrypt `plaintext` under `key` with a fresh IV
pub async fn auth_encrypt(
    provider: &dyn SymmetricKeyProvider,
    key: &KeyHandle,
    plaintext: &[u8],
) -> Result<EncryptedPayload, CryptoError> {
    let iv = random_iv(provider);
    let ciphertext = provider
        .encrypt(key, &iv, plaintext)
        .await
        .map_err(|e| CryptoError::EncryptionFailed {
            operation: "Credential encryption".to_string(),
            reason: e.to_string(),
        })?;

    Ok(EncryptedPayload {
        ciphertext_b64: STANDARD.encode(ciphertext),
        iv_b64: STANDARD.encode(iv),
    })
}

/// Authenticated-decrypt a base64 ciphertext/IV pair
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` tagged "Credential decryption" if
/// decoding fails, the IV has the wrong size, or the tag does not verify.
pub async fn auth_decrypt(
    provider: &dyn SymmetricKeyProvider,
    key: &KeyHandle,
    ciphertext_b64: &str,
    iv_b64: &str,
) -> Result<Vec<u8>, CryptoError> {
    let tagged = |e: CryptoError| CryptoError::DecryptionFailed {
        operation: "Credential decryption".to_string(),
        reason: e.to_string(),
    };

    let iv = decode_iv(iv_b64).map_err(tagged)?;
    let ciphertext = STANDARD
        .decode(ciphertext_b64)
        .map_err(|e| tagged(e.into()))?;

    provider
        .decrypt(key, &iv, &ciphertext)
        .await
        .map_err(tagged)
}

/// Wrap `to_wrap` under `wrapping_key` with a fresh IV
pub async fn wrap_key(
    provider: &dyn SymmetricKeyProvider,
    to_wrap: &KeyHandle,
    wrapping_key: &KeyHandle,
) -> Result<WrappedKey, CryptoError> {
    let iv = random_iv(provider);
    let wrapped = provider
        .wrap_key(to_wrap, wrapping_key, &iv)
        .await
        .map_err(|e| match e {
            CryptoError::KeyWrapFailed { .. } => e,
            other => CryptoError::KeyWrapFailed {
                reason: other.to_string(),
            },
        })?;

    Ok(WrappedKey {
        key_b64: STANDARD.encode(wrapped),
        iv_b64: STANDARD.encode(iv),
    })
}

/// Unwrap a base64 wrapped key into an encrypt/decrypt key
pub async fn unwrap_key(
    provider: &dyn SymmetricKeyProvider,
    wrapped_b64: &str,
    iv_b64: &str,
    wrapping_key: &KeyHandle,
    extractable: bool,
) -> Result<KeyHandle, CryptoError> {
    let tagged = |e: CryptoError| match e {
        CryptoError::KeyUnwrapFailed { .. } => e,
        other => CryptoError::KeyUnwrapFailed {
            reason: other.to_string(),
        },
    };

    let iv = decode_iv(iv_b64).map_err(tagged)?;
    let wrapped = STANDARD.decode(wrapped_b64).map_err(|e| tagged(e.into()))?;

    provider
        .unwrap_key(
            &wrapped,
            wrapping_key,
            &iv,
            extractable,
            KeyUsage::EncryptDecrypt,
        )
        .await
        .map_err(tagged)
}
