// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Origin key lifecycle
//!
//! Per namespace: absent -> present-valid -> present-expired -> (regenerated)
//! present-valid. The origin key outlives individual sessions and is only
//! replaced once its own TTL lapses.

use super::store::{DurableKeyStore, OriginKeyRecord};
use crate::clock::Clock;
use crate::crypto::{KeyHandle, KeyUsage, SymmetricKeyProvider};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Default origin key lifetime
pub const DEFAULT_ORIGIN_KEY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Owns the durable, non-extractable origin key for one namespace
#[derive(Clone)]
pub struct OriginKeyManager {
    namespace: String,
    store: Arc<dyn DurableKeyStore>,
    provider: Arc<dyn SymmetricKeyProvider>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl OriginKeyManager {
    pub fn new(
        namespace: impl Into<String>,
        store: Arc<dyn DurableKeyStore>,
        provider: Arc<dyn SymmetricKeyProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            store,
            provider,
            clock,
            ttl: DEFAULT_ORIGIN_KEY_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Return the valid origin key, generating and persisting a new one if
    /// the namespace has none or it has expired
    pub async fn get_or_create_origin_key(&self) -> Result<KeyHandle> {
        if let Some(record) = self.load_origin_key().await {
            if !self.is_expired(record.expires_at) {
                return Ok(record.origin_key);
            }
            tracing::info!(namespace = %self.namespace, "origin key expired, regenerating");
        }

        let origin_key = self
            .provider
            .generate_key(false, KeyUsage::WrapUnwrap)
            .await?;
        let now = self.clock.now_ms();
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let record = OriginKeyRecord {
            namespace: self.namespace.clone(),
            origin_key: origin_key.clone(),
            expires_at: now.saturating_add(ttl_ms),
            created_at: now,
        };
        self.save_origin_key(record).await?;

        tracing::info!(namespace = %self.namespace, "🔑 origin key created");
        Ok(origin_key)
    }

    /// Load the stored record
    ///
    /// Fail-open: a store error is logged and reported as "no key", which
    /// degrades to starting a fresh session.
    pub async fn load_origin_key(&self) -> Option<OriginKeyRecord> {
        match self.store.load(&self.namespace).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, "failed to load origin key: {}", e);
                None
            }
        }
    }

    /// Persist a record
    pub async fn save_origin_key(&self, record: OriginKeyRecord) -> Result<()> {
        self.store.save(record).await.map_err(|e| {
            tracing::error!(namespace = %self.namespace, "failed to save origin key: {}", e);
            e.into()
        })
    }

    /// Delete the namespace's origin key; errors are logged, not returned
    pub async fn clear_origin_key(&self) {
        match self.store.delete(&self.namespace).await {
            Ok(()) => tracing::info!(namespace = %self.namespace, "🗑️  origin key cleared"),
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, "failed to clear origin key: {}", e)
            }
        }
    }

    /// `now > expires_at`
    pub fn is_expired(&self, expires_at: i64) -> bool {
        self.clock.now_ms() > expires_at
    }
}
