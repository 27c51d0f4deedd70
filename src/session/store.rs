// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session record storage
//!
//! Persists [`SessionData`] as JSON under `lnc-session:<namespace>`. Loads are
//! self-healing: a record that fails to parse or validate is deleted and
//! reported as absent, so corrupt state is not retried forever.

use super::types::SessionData;
use crate::storage::{EphemeralRecordStore, StorageError};
use std::sync::Arc;

const KEY_PREFIX: &str = "lnc-session:";

/// Namespaced handle onto the ephemeral record store
#[derive(Clone)]
pub struct SessionStore {
    key: String,
    store: Arc<dyn EphemeralRecordStore>,
}

impl SessionStore {
    pub fn new(namespace: &str, store: Arc<dyn EphemeralRecordStore>) -> Self {
        Self {
            key: format!("{}{}", KEY_PREFIX, namespace),
            store,
        }
    }

    /// The record key, `lnc-session:<namespace>`
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Serialize and write the record
    ///
    /// Failures are logged and returned; a session is not considered created
    /// until this succeeds.
    pub fn save(&self, data: &SessionData) -> Result<(), StorageError> {
        let json = serde_json::to_string(data)?;
        self.store.set_item(&self.key, &json).map_err(|e| {
            tracing::error!(key = %self.key, "failed to persist session data: {}", e);
            e
        })
    }

    /// Read, parse and validate the record
    pub fn load(&self) -> Option<SessionData> {
        let raw = match self.store.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, "failed to read session data: {}", e);
                return None;
            }
        };

        let parsed = serde_json::from_str::<SessionData>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|data| data.validate().map(|()| data));

        match parsed {
            Ok(data) => Some(data),
            Err(reason) => {
                tracing::warn!(key = %self.key, "discarding invalid session data: {}", reason);
                self.clear();
                None
            }
        }
    }

    /// Delete the record; a missing or unavailable store is a no-op
    pub fn clear(&self) {
        if let Err(e) = self.store.remove_item(&self.key) {
            tracing::debug!(key = %self.key, "session data not cleared: {}", e);
        }
    }

    /// Whether a plausible record is present
    ///
    /// Only checks that the stored string is a JSON object; full parsing and
    /// validation happen in [`load`](Self::load).
    pub fn has_data(&self) -> bool {
        match self.store.get_item(&self.key) {
            Ok(Some(raw)) => serde_json::from_str::<serde_json::Value>(&raw)
                .map(|value| value.is_object())
                .unwrap_or(false),
            _ => false,
        }
    }
}
