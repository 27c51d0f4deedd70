// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session Cryptography
//!
//! Cryptographic building blocks of the session core:
//!
//! - **Provider**: platform capability for AES-256-GCM, HKDF-SHA256 and raw key wrap
//! - **AES-GCM**: base64 encrypt/decrypt and wrap/unwrap helpers, fresh IV per call
//! - **Keys**: opaque [`KeyHandle`]s with enforced usage and extractability
//! - **Wrapper**: double wrap of the credentials key under device and origin keys
//!
//! ## Security Considerations
//!
//! - Device and origin keys are non-extractable and wrap-only
//! - The credentials key is extractable only so it can be wrapped
//! - IVs are never reused, except for the fixed key-agreement probe
//! - Both unwrap paths must agree before a credentials key is trusted

pub mod aes_gcm;
pub mod error;
pub mod key;
pub mod provider;
pub mod wrapper;

pub use aes_gcm::{
    auth_decrypt, auth_encrypt, generate_credentials_key, unwrap_key, wrap_key, EncryptedPayload,
};
pub use error::CryptoError;
pub use key::{KeyHandle, KeyUsage, WrappedKey, IV_LEN, KEY_LEN};
pub use provider::{SoftwareKeyProvider, SymmetricKeyProvider};
pub use wrapper::{constant_time_eq, DoubleWrappedKey, KeyWrapper};
