// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

/// Failures of the record and key stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store does not exist in this context
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read '{key}': {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("Failed to write '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Failed to delete '{key}': {reason}")]
    DeleteFailed { key: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}
