// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Opaque key handles
//!
//! A [`KeyHandle`] stands in for a platform key object. Raw key bytes never
//! leave the crate: callers can only pass handles back into a
//! [`SymmetricKeyProvider`](super::SymmetricKeyProvider), which enforces the
//! handle's usage and extractability.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// AES-GCM IV length in bytes (96 bits)
pub const IV_LEN: usize = 12;

/// What a key may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    /// Authenticated encryption and decryption of data
    EncryptDecrypt,
    /// Wrapping and unwrapping other keys only
    WrapUnwrap,
}

/// Opaque handle to an AES-256-GCM key
#[derive(Clone)]
pub struct KeyHandle {
    material: Arc<Zeroizing<[u8; KEY_LEN]>>,
    extractable: bool,
    usage: KeyUsage,
}

impl KeyHandle {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN], extractable: bool, usage: KeyUsage) -> Self {
        Self {
            material: Arc::new(Zeroizing::new(bytes)),
            extractable,
            usage,
        }
    }

    pub(crate) fn material(&self) -> &[u8; KEY_LEN] {
        &self.material
    }

    /// Whether the key may be exported (and therefore wrapped)
    pub fn is_extractable(&self) -> bool {
        self.extractable
    }

    pub fn usage(&self) -> KeyUsage {
        self.usage
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("extractable", &self.extractable)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// An AES-GCM wrapped key and the IV it was wrapped with, both base64
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedKey {
    pub key_b64: String,
    pub iv_b64: String,
}
