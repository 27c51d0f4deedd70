// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Symmetric key provider
//!
//! [`SymmetricKeyProvider`] is the platform crypto capability the session core
//! is written against: key generation, AES-GCM, HKDF, raw key wrap/unwrap and a
//! secure random source. [`SoftwareKeyProvider`] implements it with the
//! RustCrypto `aes-gcm` and `hkdf` crates.
//!
//! **Format**: ciphertexts are `ciphertext || 16-byte tag` with no AAD, and a
//! wrapped key is the AES-GCM encryption of the raw 32-byte key. This matches
//! Web Crypto's `wrapKey("raw", ..., {name: "AES-GCM"})`.

use super::error::CryptoError;
use super::key::{KeyHandle, KeyUsage, IV_LEN, KEY_LEN};
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use async_trait::async_trait;
use hkdf::Hkdf;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Platform cryptographic capability
#[async_trait]
pub trait SymmetricKeyProvider: Send + Sync {
    /// Generate a random AES-256-GCM key
    async fn generate_key(&self, extractable: bool, usage: KeyUsage)
        -> Result<KeyHandle, CryptoError>;

    /// AES-GCM encrypt; the returned bytes include the authentication tag
    async fn encrypt(
        &self,
        key: &KeyHandle,
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// AES-GCM decrypt and verify the authentication tag
    async fn decrypt(
        &self,
        key: &KeyHandle,
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// HKDF-SHA256 derivation of a non-extractable AES-256-GCM key
    async fn derive_key(
        &self,
        ikm: &[u8],
        salt: &[u8],
        info: &[u8],
        usage: KeyUsage,
    ) -> Result<KeyHandle, CryptoError>;

    /// Raw-format AES-GCM key wrap
    async fn wrap_key(
        &self,
        key: &KeyHandle,
        wrapping_key: &KeyHandle,
        iv: &[u8; IV_LEN],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Raw-format AES-GCM key unwrap
    async fn unwrap_key(
        &self,
        wrapped: &[u8],
        wrapping_key: &KeyHandle,
        iv: &[u8; IV_LEN],
        extractable: bool,
        usage: KeyUsage,
    ) -> Result<KeyHandle, CryptoError>;

    /// Fill `dest` from a cryptographically secure source
    fn fill_random(&self, dest: &mut [u8]);
}

/// Pure-Rust provider backed by `aes-gcm`, `hkdf` and the OS RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareKeyProvider;

impl SoftwareKeyProvider {
    pub fn new() -> Self {
        Self
    }

    fn cipher(key: &KeyHandle) -> Result<Aes256Gcm, CryptoError> {
        Aes256Gcm::new_from_slice(key.material()).map_err(|e| CryptoError::InvalidKey {
            key_type: "aes_gcm".to_string(),
            reason: format!("failed to create AES-GCM cipher: {}", e),
        })
    }

    fn require_usage(key: &KeyHandle, usage: KeyUsage, key_type: &str) -> Result<(), CryptoError> {
        if key.usage() != usage {
            return Err(CryptoError::InvalidKey {
                key_type: key_type.to_string(),
                reason: format!("key usage is {:?}, operation needs {:?}", key.usage(), usage),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SymmetricKeyProvider for SoftwareKeyProvider {
    async fn generate_key(
        &self,
        extractable: bool,
        usage: KeyUsage,
    ) -> Result<KeyHandle, CryptoError> {
        let mut bytes = [0u8; KEY_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::KeyGenerationFailed {
                reason: e.to_string(),
            })?;
        Ok(KeyHandle::from_bytes(bytes, extractable, usage))
    }

    async fn encrypt(
        &self,
        key: &KeyHandle,
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        Self::require_usage(key, KeyUsage::EncryptDecrypt, "encryption_key")?;
        Self::cipher(key)?
            .encrypt(
                Nonce::from_slice(iv),
                Payload {
                    msg: plaintext,
                    aad: b"",
                },
            )
            .map_err(|e| CryptoError::EncryptionFailed {
                operation: "AES-GCM encryption".to_string(),
                reason: e.to_string(),
            })
    }

    async fn decrypt(
        &self,
        key: &KeyHandle,
        iv: &[u8; IV_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        Self::require_usage(key, KeyUsage::EncryptDecrypt, "decryption_key")?;
        Self::cipher(key)?
            .decrypt(
                Nonce::from_slice(iv),
                Payload {
                    msg: ciphertext,
                    aad: b"",
                },
            )
            .map_err(|_| CryptoError::DecryptionFailed {
                operation: "AES-GCM decryption".to_string(),
                reason: "authentication error - wrong key or corrupted data".to_string(),
            })
    }

    async fn derive_key(
        &self,
        ikm: &[u8],
        salt: &[u8],
        info: &[u8],
        usage: KeyUsage,
    ) -> Result<KeyHandle, CryptoError> {
        let hkdf = Hkdf::<Sha256>::new(Some(salt), ikm);
        let mut okm = [0u8; KEY_LEN];
        hkdf.expand(info, &mut okm)
            .map_err(|e| CryptoError::KeyDerivationFailed {
                operation: "HKDF-SHA256".to_string(),
                reason: e.to_string(),
            })?;
        Ok(KeyHandle::from_bytes(okm, false, usage))
    }

    async fn wrap_key(
        &self,
        key: &KeyHandle,
        wrapping_key: &KeyHandle,
        iv: &[u8; IV_LEN],
    ) -> Result<Vec<u8>, CryptoError> {
        if !key.is_extractable() {
            return Err(CryptoError::InvalidKey {
                key_type: "key_to_wrap".to_string(),
                reason: "key is not extractable".to_string(),
            });
        }
        Self::require_usage(wrapping_key, KeyUsage::WrapUnwrap, "wrapping_key")?;

        Self::cipher(wrapping_key)?
            .encrypt(
                Nonce::from_slice(iv),
                Payload {
                    msg: key.material().as_slice(),
                    aad: b"",
                },
            )
            .map_err(|e| CryptoError::KeyWrapFailed {
                reason: e.to_string(),
            })
    }

    async fn unwrap_key(
        &self,
        wrapped: &[u8],
        wrapping_key: &KeyHandle,
        iv: &[u8; IV_LEN],
        extractable: bool,
        usage: KeyUsage,
    ) -> Result<KeyHandle, CryptoError> {
        Self::require_usage(wrapping_key, KeyUsage::WrapUnwrap, "wrapping_key")?;

        let raw = Zeroizing::new(
            Self::cipher(wrapping_key)?
                .decrypt(
                    Nonce::from_slice(iv),
                    Payload {
                        msg: wrapped,
                        aad: b"",
                    },
                )
                .map_err(|_| CryptoError::KeyUnwrapFailed {
                    reason: "authentication error - wrong wrapping key or corrupted data"
                        .to_string(),
                })?,
        );

        let bytes: [u8; KEY_LEN] =
            raw.as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKey {
                    key_type: "unwrapped_key".to_string(),
                    reason: format!("expected {} bytes, got {}", KEY_LEN, raw.len()),
                })?;
        Ok(KeyHandle::from_bytes(bytes, extractable, usage))
    }

    fn fill_random(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}
