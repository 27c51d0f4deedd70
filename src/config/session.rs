// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for session lifecycle policy

use serde::{Deserialize, Serialize};
use std::env;

const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;

/// Upper bound for any configured duration (about 1000 years), so that
/// `now + duration` always fits in an `i64` epoch-millisecond timestamp
pub const MAX_DURATION_MS: f64 = 1000.0 * 365.25 * 24.0 * HOUR_MS;

/// Session lifecycle policy
///
/// Durations are milliseconds, carried as `f64` so values read from
/// untrusted sources (environment, JSON) are validated rather than silently
/// clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// How long a session stays valid after creation or refresh
    pub session_duration_ms: f64,
    /// Maximum number of refreshes of one session
    pub max_refreshes: u32,
    /// Absolute cap on session age, measured from creation
    pub max_session_age_ms: f64,
    /// Refresh on user activity once half the session duration has elapsed
    pub enable_activity_refresh: bool,
}

impl SessionConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `LNC_SESSION_DURATION_MS`: session duration (default: 24h)
    /// - `LNC_SESSION_MAX_REFRESHES`: refresh quota (default: 10)
    /// - `LNC_SESSION_MAX_AGE_MS`: absolute age cap (default: 7 days)
    /// - `LNC_SESSION_ACTIVITY_REFRESH`: true/false (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            session_duration_ms: env::var("LNC_SESSION_DURATION_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_duration_ms),
            max_refreshes: env::var("LNC_SESSION_MAX_REFRESHES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_refreshes),
            max_session_age_ms: env::var("LNC_SESSION_MAX_AGE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_session_age_ms),
            enable_activity_refresh: env::var("LNC_SESSION_ACTIVITY_REFRESH")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(defaults.enable_activity_refresh),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.session_duration_ms.is_finite() || self.session_duration_ms <= 0.0 {
            return Err(format!(
                "sessionDurationMs must be a finite number greater than 0, got {}",
                self.session_duration_ms
            ));
        }
        if !self.max_session_age_ms.is_finite() || self.max_session_age_ms <= 0.0 {
            return Err(format!(
                "maxSessionAgeMs must be a finite number greater than 0, got {}",
                self.max_session_age_ms
            ));
        }
        if self.session_duration_ms > MAX_DURATION_MS {
            return Err(format!(
                "sessionDurationMs must not exceed {}, got {}",
                MAX_DURATION_MS, self.session_duration_ms
            ));
        }
        if self.max_session_age_ms > MAX_DURATION_MS {
            return Err(format!(
                "maxSessionAgeMs must not exceed {}, got {}",
                MAX_DURATION_MS, self.max_session_age_ms
            ));
        }
        if self.max_session_age_ms < self.session_duration_ms {
            return Err(format!(
                "maxSessionAgeMs ({}) must be at least sessionDurationMs ({})",
                self.max_session_age_ms, self.session_duration_ms
            ));
        }
        Ok(())
    }

    /// Whole milliseconds, rounded up so a valid duration is never zero
    pub(crate) fn session_duration_millis(&self) -> i64 {
        self.session_duration_ms.ceil() as i64
    }

    pub(crate) fn max_session_age_millis(&self) -> i64 {
        self.max_session_age_ms as i64
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_duration_ms: 24.0 * HOUR_MS,
            max_refreshes: 10,
            max_session_age_ms: 7.0 * 24.0 * HOUR_MS,
            enable_activity_refresh: true,
        }
    }
}
