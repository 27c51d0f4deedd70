// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Manager configuration tests

use super::common::{credentials, laptop, Harness, NAMESPACE};
use lnc_session::config::MAX_DURATION_MS;
use lnc_session::{SessionConfig, SessionError, SessionManager};

fn build(config: SessionConfig) -> Result<SessionManager, SessionError> {
    SessionManager::new(NAMESPACE, config, Harness::new().context(laptop()))
}

#[test]
fn test_invalid_durations_are_rejected() {
    let bad_durations = [0.0, -5.0, f64::NAN, f64::INFINITY];

    for bad in bad_durations {
        let result = build(SessionConfig {
            session_duration_ms: bad,
            ..SessionConfig::default()
        });
        match result {
            Err(SessionError::InvalidConfig(msg)) => assert!(msg.contains("sessionDurationMs")),
            Err(other) => panic!("unexpected error for {}: {}", bad, other),
            Ok(_) => panic!("duration {} accepted", bad),
        }
    }
}

#[test]
fn test_invalid_max_age_is_rejected() {
    for bad in [0.0, f64::NAN, f64::NEG_INFINITY] {
        let result = build(SessionConfig {
            max_session_age_ms: bad,
            ..SessionConfig::default()
        });
        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }
}

#[test]
fn test_max_age_below_duration_is_rejected() {
    let result = build(SessionConfig {
        session_duration_ms: 60_000.0,
        max_session_age_ms: 30_000.0,
        ..SessionConfig::default()
    });

    let err = result.err().expect("config rejected");
    assert!(err.to_string().starts_with("Invalid session configuration"));
}

#[test]
fn test_valid_config_is_kept() {
    let config = SessionConfig {
        session_duration_ms: 5_000.0,
        max_refreshes: 0,
        max_session_age_ms: 5_000.0,
        enable_activity_refresh: false,
    };
    let manager = build(config.clone()).unwrap();
    assert_eq!(manager.config(), &config);
}

#[test]
fn test_config_from_env() {
    std::env::set_var("LNC_SESSION_DURATION_MS", "120000");
    std::env::set_var("LNC_SESSION_MAX_REFRESHES", "4");
    std::env::set_var("LNC_SESSION_MAX_AGE_MS", "not-a-number");
    std::env::set_var("LNC_SESSION_ACTIVITY_REFRESH", "FALSE");

    let config = SessionConfig::from_env();

    std::env::remove_var("LNC_SESSION_DURATION_MS");
    std::env::remove_var("LNC_SESSION_MAX_REFRESHES");
    std::env::remove_var("LNC_SESSION_MAX_AGE_MS");
    std::env::remove_var("LNC_SESSION_ACTIVITY_REFRESH");

    assert_eq!(config.session_duration_ms, 120_000.0);
    assert_eq!(config.max_refreshes, 4);
    // Unparseable values fall back to defaults
    assert_eq!(config.max_session_age_ms, SessionConfig::default().max_session_age_ms);
    assert!(!config.enable_activity_refresh);
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn test_sub_millisecond_duration_still_creates_a_session() {
    let harness = Harness::new();
    let manager = harness.manager(SessionConfig {
        session_duration_ms: 0.5,
        ..SessionConfig::default()
    });

    manager.create_session(&credentials()).await.unwrap();

    assert_eq!(manager.restore_session().await, Some(credentials()));
    harness.advance_ms(2);
    assert_eq!(manager.restore_session().await, None);
}

#[test]
fn test_oversized_durations_are_rejected() {
    let result = build(SessionConfig {
        session_duration_ms: 1e19,
        max_session_age_ms: 1e19,
        ..SessionConfig::default()
    });

    match result {
        Err(SessionError::InvalidConfig(msg)) => assert!(msg.contains("must not exceed")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("oversized duration accepted"),
    }
}

#[tokio::test]
async fn test_longest_allowed_duration_creates_a_session() {
    let harness = Harness::new();
    let manager = harness.manager(SessionConfig {
        session_duration_ms: MAX_DURATION_MS,
        max_session_age_ms: MAX_DURATION_MS,
        ..SessionConfig::default()
    });

    manager.create_session(&credentials()).await.unwrap();
    assert!(manager.refresh_session().await.unwrap());

    let data = harness.stored_record().unwrap();
    assert!(data.expires_at > data.created_at);
    assert_eq!(manager.restore_session().await, Some(credentials()));
}
