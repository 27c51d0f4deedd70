// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Durable Origin Key Storage
//!
//! Holds one [`OriginKeyRecord`] per namespace in a store that survives tab
//! closes and reloads (IndexedDB in a browser). Records hold opaque key
//! handles, so the key bytes are never readable through the store.

use crate::crypto::KeyHandle;
use crate::storage::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A namespace's origin key and its validity window
#[derive(Debug, Clone)]
pub struct OriginKeyRecord {
    pub namespace: String,
    /// Non-extractable, wrap-only key
    pub origin_key: KeyHandle,
    /// Epoch milliseconds
    pub expires_at: i64,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// Trait for durable origin-key storage backends
#[async_trait]
pub trait DurableKeyStore: Send + Sync {
    /// Load the record for a namespace, if any
    async fn load(&self, namespace: &str) -> Result<Option<OriginKeyRecord>, StorageError>;

    /// Insert or replace the record for `record.namespace`
    async fn save(&self, record: OriginKeyRecord) -> Result<(), StorageError>;

    /// Delete the record for a namespace
    async fn delete(&self, namespace: &str) -> Result<(), StorageError>;
}

/// In-memory durable key store
///
/// Cloning shares the underlying map, so two managers built from clones see
/// the same origin, as two tabs of one origin would.
#[derive(Clone, Default)]
pub struct MemoryKeyStore {
    records: Arc<RwLock<HashMap<String, OriginKeyRecord>>>,
    injected_error: Arc<Mutex<Option<StorageError>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next store operation with `error`
    pub async fn inject_error(&self, error: StorageError) {
        *self.injected_error.lock().await = Some(error);
    }

    /// Get the number of stored origin keys
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    async fn check_injected_error(&self) -> Result<(), StorageError> {
        let mut error_opt = self.injected_error.lock().await;
        if let Some(error) = error_opt.take() {
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl DurableKeyStore for MemoryKeyStore {
    async fn load(&self, namespace: &str) -> Result<Option<OriginKeyRecord>, StorageError> {
        self.check_injected_error().await?;
        let records = self.records.read().await;
        Ok(records.get(namespace).cloned())
    }

    async fn save(&self, record: OriginKeyRecord) -> Result<(), StorageError> {
        self.check_injected_error().await?;
        let mut records = self.records.write().await;
        let namespace = record.namespace.clone();
        records.insert(namespace.clone(), record);
        tracing::debug!(
            namespace = %namespace,
            total = records.len(),
            "origin key stored"
        );
        Ok(())
    }

    async fn delete(&self, namespace: &str) -> Result<(), StorageError> {
        self.check_injected_error().await?;
        let mut records = self.records.write().await;
        if records.remove(namespace).is_some() {
            tracing::debug!(
                namespace = %namespace,
                remaining = records.len(),
                "origin key deleted"
            );
        }
        Ok(())
    }
}
