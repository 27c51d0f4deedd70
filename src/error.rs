// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the session core
//!
//! - Configuration errors: returned from the manager constructor, never recovered
//! - Infrastructure errors: store failures on write paths
//! - Cryptographic failures: unwrap mismatch, decrypt/shape failures, always fail closed
//!
//! Policy outcomes (refresh quota, age cap) are not errors; they are reported
//! as `Ok(false)` by the manager.

use crate::crypto::CryptoError;
use crate::device::FingerprintError;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    /// The namespace's origin key is missing or expired
    #[error("Origin key for namespace '{namespace}' is missing or expired")]
    OriginKeyUnavailable { namespace: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;
