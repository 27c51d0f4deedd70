// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session lifecycle orchestration
//!
//! [`SessionManager`] ties device binding, the origin key, the double wrap and
//! the session store into create / restore / refresh:
//!
//! ```text
//! no-session --create--> active --refresh--> active' --...--> expired | cleared
//! ```
//!
//! ## Propagation policy
//!
//! - `create_session` propagates every failure; nothing partial is persisted
//! - `restore_session` never fails; any problem reads as "no session"
//! - `refresh_session` returns `Ok(false)` for policy limits and expiry races,
//!   and `Err` for infrastructure or cryptographic faults
//!
//! Callers must not overlap lifecycle operations on one namespace.

use super::store::SessionStore;
use super::types::{SessionData, SessionInfo};
use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::credentials::{CredentialsEncrypter, EncryptedCredentials, SessionCredentials};
use crate::crypto::{KeyHandle, KeyWrapper, SoftwareKeyProvider, SymmetricKeyProvider};
use crate::device::{DeviceBinder, EnvironmentFingerprinter};
use crate::error::{Result, SessionError};
use crate::origin::{DurableKeyStore, MemoryKeyStore, OriginKeyManager};
use crate::storage::{EphemeralRecordStore, MemoryRecordStore};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Platform capabilities a manager is built on
#[derive(Clone)]
pub struct SessionContext {
    pub provider: Arc<dyn SymmetricKeyProvider>,
    pub key_store: Arc<dyn DurableKeyStore>,
    pub record_store: Arc<dyn EphemeralRecordStore>,
    pub environment: Arc<dyn EnvironmentFingerprinter>,
    pub clock: Arc<dyn Clock>,
}

impl SessionContext {
    /// Software crypto, in-memory stores and the system clock
    pub fn in_memory(environment: Arc<dyn EnvironmentFingerprinter>) -> Self {
        Self {
            provider: Arc::new(SoftwareKeyProvider::new()),
            key_store: Arc::new(MemoryKeyStore::new()),
            record_store: Arc::new(MemoryRecordStore::new()),
            environment,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// A fully verified session and the keys that opened it
struct RestoredSession {
    data: SessionData,
    credentials: SessionCredentials,
    device_key: KeyHandle,
    origin_key: KeyHandle,
}

enum RestoreOutcome {
    Restored(Box<RestoredSession>),
    NoSession,
    Expired,
}

/// Creates, restores and refreshes the session of one namespace
pub struct SessionManager {
    namespace: String,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    device: DeviceBinder,
    origin: OriginKeyManager,
    wrapper: KeyWrapper,
    encrypter: CredentialsEncrypter,
    store: SessionStore,
}

impl SessionManager {
    /// Build a manager
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidConfig` if `config` fails validation; a
    /// misconfigured manager is never constructed.
    pub fn new(
        namespace: impl Into<String>,
        config: SessionConfig,
        context: SessionContext,
    ) -> Result<Self> {
        config.validate().map_err(SessionError::InvalidConfig)?;
        let namespace = namespace.into();

        Ok(Self {
            device: DeviceBinder::new(context.environment, context.provider.clone()),
            origin: OriginKeyManager::new(
                namespace.clone(),
                context.key_store,
                context.provider.clone(),
                context.clock.clone(),
            ),
            wrapper: KeyWrapper::new(context.provider.clone()),
            encrypter: CredentialsEncrypter::new(context.provider),
            store: SessionStore::new(&namespace, context.record_store),
            clock: context.clock,
            namespace,
            config,
        })
    }

    /// Override the origin key lifetime
    pub fn with_origin_key_ttl(mut self, ttl: Duration) -> Self {
        self.origin = self.origin.with_ttl(ttl);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Protect `credentials` in a new session, replacing any existing one
    pub async fn create_session(&self, credentials: &SessionCredentials) -> Result<()> {
        let fingerprint = self.device.generate_fingerprint()?;
        let session_id = Uuid::new_v4().to_string();
        let device_key = self
            .device
            .derive_session_key(&fingerprint, &session_id)
            .await?;
        let origin_key = self.origin.get_or_create_origin_key().await?;

        let encrypted = self.encrypter.encrypt(credentials).await?;
        let wrapped = self
            .wrapper
            .wrap_credentials_key(&encrypted.credentials_key, &device_key, &origin_key)
            .await?;

        let now = self.clock.now_ms();
        let data = SessionData {
            session_id,
            created_at: now,
            expires_at: now.saturating_add(self.config.session_duration_millis()),
            refresh_count: 0,
            encrypted_credentials: encrypted.ciphertext_b64,
            credentials_iv: encrypted.iv_b64,
            device: wrapped.device,
            origin: wrapped.origin,
            device_fingerprint: Some(fingerprint),
        };
        self.store.save(&data)?;

        tracing::info!(
            namespace = %self.namespace,
            session_id = %data.session_id,
            expires_at = data.expires_at,
            "session created"
        );
        Ok(())
    }

    /// Recover the stored credentials
    ///
    /// Returns `None` when there is no usable session for any reason: absent
    /// or corrupt record, expiry, device or origin change, tampering.
    pub async fn restore_session(&self) -> Option<SessionCredentials> {
        match self.try_restore().await {
            Ok(RestoreOutcome::Restored(restored)) => {
                tracing::debug!(
                    namespace = %self.namespace,
                    session_id = %restored.data.session_id,
                    "session restored"
                );
                Some(restored.credentials.clone())
            }
            Ok(RestoreOutcome::NoSession) => None,
            Ok(RestoreOutcome::Expired) => {
                tracing::debug!(namespace = %self.namespace, "stored session has expired");
                None
            }
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, "failed to restore session: {}", e);
                None
            }
        }
    }

    /// Extend the session and rotate its credentials key
    ///
    /// Returns `Ok(false)` without touching stored state when the refresh
    /// quota or the absolute age cap is reached, when there is no session, or
    /// when the session expires before it can be restored.
    pub async fn refresh_session(&self) -> Result<bool> {
        let Some(current) = self.store.load() else {
            tracing::debug!(namespace = %self.namespace, "no session to refresh");
            return Ok(false);
        };

        if current.refresh_count >= self.config.max_refreshes {
            tracing::warn!(
                namespace = %self.namespace,
                refresh_count = current.refresh_count,
                max_refreshes = self.config.max_refreshes,
                "Maximum refresh count reached"
            );
            return Ok(false);
        }

        let now = self.clock.now_ms();
        let age_ms = now.saturating_sub(current.created_at);
        if age_ms > self.config.max_session_age_millis() {
            tracing::warn!(
                namespace = %self.namespace,
                age_ms,
                "Maximum session age exceeded"
            );
            return Ok(false);
        }

        let restored = match self.try_restore().await? {
            RestoreOutcome::Restored(restored) => restored,
            RestoreOutcome::Expired => {
                tracing::warn!(namespace = %self.namespace, "Session expired before refresh");
                return Ok(false);
            }
            RestoreOutcome::NoSession => return Ok(false),
        };

        let encrypted = self.encrypter.encrypt(&restored.credentials).await?;
        let wrapped = self
            .wrapper
            .wrap_credentials_key(
                &encrypted.credentials_key,
                &restored.device_key,
                &restored.origin_key,
            )
            .await?;

        let now = self.clock.now_ms();
        let previous = restored.data;
        // Strictly later than the previous expiry even within one clock tick
        let expires_at = now
            .saturating_add(self.config.session_duration_millis())
            .max(previous.expires_at.saturating_add(1));
        let data = SessionData {
            expires_at,
            refresh_count: previous.refresh_count + 1,
            encrypted_credentials: encrypted.ciphertext_b64,
            credentials_iv: encrypted.iv_b64,
            device: wrapped.device,
            origin: wrapped.origin,
            ..previous
        };
        self.store.save(&data)?;

        tracing::info!(
            namespace = %self.namespace,
            session_id = %data.session_id,
            refresh_count = data.refresh_count,
            expires_at = data.expires_at,
            "session refreshed"
        );
        Ok(true)
    }

    /// Refresh on user activity once half the session duration has elapsed
    ///
    /// A no-op returning `Ok(false)` when activity refresh is disabled, there
    /// is no active session, or the session is still fresh.
    pub async fn record_activity(&self) -> Result<bool> {
        if !self.config.enable_activity_refresh {
            return Ok(false);
        }
        let Some(data) = self.store.load() else {
            return Ok(false);
        };

        let now = self.clock.now_ms();
        if data.is_expired_at(now) {
            return Ok(false);
        }
        let remaining = data.expires_at.saturating_sub(now);
        if remaining.saturating_mul(2) >= self.config.session_duration_millis() {
            return Ok(false);
        }

        tracing::debug!(
            namespace = %self.namespace,
            remaining_ms = remaining,
            "activity past refresh threshold"
        );
        self.refresh_session().await
    }

    /// Remove the session record
    pub fn clear_session(&self) {
        self.store.clear();
        tracing::info!(namespace = %self.namespace, "🗑️  session cleared");
    }

    /// Remove the session record and the namespace's origin key
    pub async fn purge(&self) {
        self.clear_session();
        self.origin.clear_origin_key().await;
    }

    /// A record is present and unexpired
    pub fn has_active_session(&self) -> bool {
        self.active_record().is_some()
    }

    /// Time until the current session expires, zero if none
    pub fn session_time_remaining(&self) -> Duration {
        self.store
            .load()
            .map(|data| data.expires_at.saturating_sub(self.clock.now_ms()).max(0))
            .map(|ms| Duration::from_millis(ms as u64))
            .unwrap_or(Duration::ZERO)
    }

    /// Storage holds a session record worth attempting to restore
    pub fn can_auto_restore(&self) -> bool {
        self.store.has_data()
    }

    /// Whether a real restore attempt succeeds
    pub async fn has_valid_session(&self) -> bool {
        self.restore_session().await.is_some()
    }

    /// Non-secret details of the active session
    pub fn session_info(&self) -> Option<SessionInfo> {
        self.active_record().as_ref().map(SessionInfo::from)
    }

    fn active_record(&self) -> Option<SessionData> {
        let now = self.clock.now_ms();
        self.store.load().filter(|data| !data.is_expired_at(now))
    }

    /// Restore path that reports infrastructure and crypto failures
    async fn try_restore(&self) -> Result<RestoreOutcome> {
        let Some(data) = self.store.load() else {
            return Ok(RestoreOutcome::NoSession);
        };
        if data.is_expired_at(self.clock.now_ms()) {
            return Ok(RestoreOutcome::Expired);
        }

        let fingerprint = self.device.generate_fingerprint()?;
        let device_key = self
            .device
            .derive_session_key(&fingerprint, &data.session_id)
            .await?;

        let origin_key = match self.origin.load_origin_key().await {
            Some(record) if !self.origin.is_expired(record.expires_at) => record.origin_key,
            _ => {
                return Err(SessionError::OriginKeyUnavailable {
                    namespace: self.namespace.clone(),
                })
            }
        };

        let credentials_key = self
            .wrapper
            .unwrap_credentials_key(&data.wrapped_keys(), &device_key, &origin_key)
            .await?;
        let credentials = self
            .encrypter
            .decrypt(&EncryptedCredentials {
                credentials_key,
                ciphertext_b64: data.encrypted_credentials.clone(),
                iv_b64: data.credentials_iv.clone(),
            })
            .await?;

        // The record may have lapsed while the keys were being recovered
        if data.is_expired_at(self.clock.now_ms()) {
            return Ok(RestoreOutcome::Expired);
        }

        Ok(RestoreOutcome::Restored(Box::new(RestoredSession {
            data,
            credentials,
            device_key,
            origin_key,
        })))
    }
}
