// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! Error type for every cryptographic operation in the session core. Each
//! variant names the component operation that failed so callers (and logs)
//! can tell a credential decryption failure apart from a key-wrap failure.
//!
//! ## Error Variants
//!
//! - **KeyGenerationFailed**: random key generation failed
//! - **EncryptionFailed** / **DecryptionFailed**: AES-GCM failures, including
//!   authentication tag mismatch
//! - **KeyWrapFailed** / **KeyUnwrapFailed**: raw-format key wrap failures
//! - **KeyUnwrapMismatch**: the device and origin unwrap paths disagree
//! - **InvalidKey**: key used outside its usage, or not extractable
//! - **KeyDerivationFailed**: HKDF failure
//! - **InvalidPayload**: malformed base64 or IV
//! - **InvalidCredentialsShape**: decrypted JSON is not a credentials object
//!
//! No variant ever carries key material or plaintext.

use std::fmt;

/// Error type for all cryptographic operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Random key generation failed
    KeyGenerationFailed {
        /// Specific failure reason
        reason: String,
    },

    /// AES-GCM encryption failed
    EncryptionFailed {
        /// Which operation was being performed (e.g. "Credential encryption")
        operation: String,
        /// Specific failure reason
        reason: String,
    },

    /// AES-GCM decryption failed
    ///
    /// This error occurs when:
    /// - Authentication tag verification fails (ciphertext tampered or wrong key)
    /// - Ciphertext is truncated
    DecryptionFailed {
        /// Which operation was being performed (e.g. "Credential decryption")
        operation: String,
        /// Specific failure reason
        reason: String,
    },

    /// Wrapping a key under another key failed
    KeyWrapFailed {
        /// Specific failure reason
        reason: String,
    },

    /// Unwrapping a single wrapped key failed
    KeyUnwrapFailed {
        /// Specific failure reason
        reason: String,
    },

    /// The device-bound and origin-bound unwrap paths did not recover the
    /// same key, or one of them could not be unwrapped at all
    KeyUnwrapMismatch,

    /// Invalid cryptographic key
    ///
    /// This error occurs when:
    /// - A wrap-only key is used for encryption (or the reverse)
    /// - A non-extractable key is asked to be wrapped
    /// - Unwrapped key material has the wrong length
    InvalidKey {
        /// Type of key that failed (e.g. "wrapping_key", "credentials_key")
        key_type: String,
        /// Specific failure reason
        reason: String,
    },

    /// HKDF key derivation failed
    KeyDerivationFailed {
        /// Which key derivation operation failed
        operation: String,
        /// Specific failure reason
        reason: String,
    },

    /// Encoded input validation failed
    ///
    /// This error occurs when:
    /// - Base64 decoding fails
    /// - IV has the wrong size
    InvalidPayload {
        /// Which field failed validation
        field: String,
        /// Specific failure reason
        reason: String,
    },

    /// Decrypted credentials are not an object with the four string fields
    InvalidCredentialsShape,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::KeyGenerationFailed { reason } => {
                write!(f, "Key generation failed: {}", reason)
            }
            CryptoError::EncryptionFailed { operation, reason } => {
                write!(f, "{} failed: {}", operation, reason)
            }
            CryptoError::DecryptionFailed { operation, reason } => {
                write!(f, "{} failed: {}", operation, reason)
            }
            CryptoError::KeyWrapFailed { reason } => {
                write!(f, "Key wrapping failed: {}", reason)
            }
            CryptoError::KeyUnwrapFailed { reason } => {
                write!(f, "Key unwrapping failed: {}", reason)
            }
            CryptoError::KeyUnwrapMismatch => write!(f, "Key unwrapping mismatch"),
            CryptoError::InvalidKey { key_type, reason } => {
                write!(f, "Invalid key ({}): {}", key_type, reason)
            }
            CryptoError::KeyDerivationFailed { operation, reason } => {
                write!(f, "Key derivation failed during {}: {}", operation, reason)
            }
            CryptoError::InvalidPayload { field, reason } => {
                write!(f, "Invalid payload field '{}': {}", field, reason)
            }
            CryptoError::InvalidCredentialsShape => {
                write!(f, "Decrypted credentials have an invalid shape")
            }
        }
    }
}

impl std::error::Error for CryptoError {}

// Conversion from base64 decode errors
impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        CryptoError::InvalidPayload {
            field: "base64_field".to_string(),
            reason: format!("base64 decode error: {}", err),
        }
    }
}
