// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ephemeral record stores
//!
//! The serialized session record lives in a short-lived, tab-scoped string
//! store (`sessionStorage` in a browser). Access is synchronous, as it is on
//! the platform.

use super::error::StorageError;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

/// Tab-scoped string key/value store
pub trait EphemeralRecordStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process record store
///
/// Supports one-shot error injection so write and read failures can be
/// exercised without a real backend.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    items: RwLock<HashMap<String, String>>,
    injected_error: Mutex<Option<StorageError>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next store operation with `error`
    pub fn inject_error(&self, error: StorageError) {
        if let Ok(mut slot) = self.injected_error.lock() {
            *slot = Some(error);
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_injected_error(&self) -> Result<(), StorageError> {
        let mut slot = self
            .injected_error
            .lock()
            .map_err(|_| StorageError::Unavailable("record store lock poisoned".to_string()))?;
        match slot.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn poisoned(key: &str) -> StorageError {
        StorageError::ReadFailed {
            key: key.to_string(),
            reason: "record store lock poisoned".to_string(),
        }
    }
}

impl EphemeralRecordStore for MemoryRecordStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_injected_error()?;
        let items = self.items.read().map_err(|_| Self::poisoned(key))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_injected_error()?;
        let mut items = self.items.write().map_err(|_| Self::poisoned(key))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_injected_error()?;
        let mut items = self.items.write().map_err(|_| Self::poisoned(key))?;
        items.remove(key);
        Ok(())
    }
}

/// Store for contexts with no tab-scoped storage (servers, CLI tools)
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecordStore;

impl EphemeralRecordStore for UnavailableRecordStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("no session storage in this context".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no session storage in this context".to_string()))
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("no session storage in this context".to_string()))
    }
}
