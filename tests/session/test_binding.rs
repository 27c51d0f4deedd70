// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Device and origin binding tests
//!
//! A stored record must be useless once either binding no longer holds.

use super::common::{
    capture_logs, credentials, laptop, other_device, Harness, HOUR_MS, NAMESPACE, RECORD_KEY,
};
use lnc_session::{
    DisplayGeometry, DurableKeyStore, EphemeralRecordStore, FingerprintError, FixedEnvironment,
    MemoryKeyStore, SessionConfig, SessionError, SessionManager, StorageError,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_restore_on_another_device_fails() {
    let harness = Harness::new();
    harness
        .manager(SessionConfig::default())
        .create_session(&credentials())
        .await
        .unwrap();

    let elsewhere = harness.manager_on(other_device(), SessionConfig::default());
    assert_eq!(elsewhere.restore_session().await, None);
    assert!(!elsewhere.has_valid_session().await);

    // The legitimate device can still restore
    let home = harness.manager(SessionConfig::default());
    assert_eq!(home.restore_session().await, Some(credentials()));
}

#[tokio::test]
async fn test_each_fingerprint_input_binds_the_session() {
    let variants = [
        laptop().with_timezone("Asia/Tokyo"),
        laptop().with_geometry(DisplayGeometry {
            width: 2560,
            height: 1440,
            color_depth: 30,
        }),
        laptop().with_raster_seed(b"apple-m3-webkit".to_vec()),
    ];

    for variant in variants {
        let harness = Harness::new();
        harness
            .manager(SessionConfig::default())
            .create_session(&credentials())
            .await
            .unwrap();

        let changed = harness.manager_on(variant, SessionConfig::default());
        assert_eq!(changed.restore_session().await, None);
    }
}

#[tokio::test]
async fn test_missing_canvas_fails_closed() {
    let harness = Harness::new();
    let no_canvas = harness.manager_on(laptop().without_canvas(), SessionConfig::default());

    let err = no_canvas.create_session(&credentials()).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Fingerprint(FingerprintError::CanvasUnavailable)
    ));
    assert!(harness.raw_record().is_none());

    // A session created with canvas support cannot be restored without it
    harness
        .manager(SessionConfig::default())
        .create_session(&credentials())
        .await
        .unwrap();
    assert_eq!(no_canvas.restore_session().await, None);
}

#[tokio::test]
async fn test_display_lost_after_create_reads_as_no_session() {
    let harness = Harness::new();
    harness
        .manager(SessionConfig::default())
        .create_session(&credentials())
        .await
        .unwrap();

    let headless = harness.manager_on(FixedEnvironment::headless(), SessionConfig::default());
    assert_eq!(headless.restore_session().await, None);
}

#[tokio::test]
async fn test_restore_without_origin_key_fails() {
    let harness = Harness::new();
    let manager = harness.manager(SessionConfig::default());
    manager.create_session(&credentials()).await.unwrap();

    harness.key_store.delete(NAMESPACE).await.unwrap();

    assert!(manager.can_auto_restore());
    assert_eq!(manager.restore_session().await, None);
}

#[tokio::test]
async fn test_restore_on_another_origin_fails() {
    // Same tab storage contents, but a different origin's durable store
    let harness = Harness::new();
    harness
        .manager(SessionConfig::default())
        .create_session(&credentials())
        .await
        .unwrap();

    let mut context = harness.context(laptop());
    context.key_store = Arc::new(MemoryKeyStore::new());
    let foreign = SessionManager::new(NAMESPACE, SessionConfig::default(), context).unwrap();

    assert_eq!(foreign.restore_session().await, None);
}

#[tokio::test]
async fn test_restore_with_a_regenerated_origin_key_fails() {
    let harness = Harness::new();
    let manager = harness.manager(SessionConfig::default());
    manager.create_session(&credentials()).await.unwrap();
    let record = harness.raw_record().unwrap();

    // A new session replaces the origin key once the old one is purged
    manager.purge().await;
    manager.create_session(&credentials()).await.unwrap();
    harness.records.set_item(RECORD_KEY, &record).unwrap();

    assert_eq!(manager.restore_session().await, None);
}

#[tokio::test]
async fn test_expired_origin_key_fails_restore() {
    let harness = Harness::new();
    let manager = harness
        .manager(SessionConfig::default())
        .with_origin_key_ttl(Duration::from_secs(3600));
    manager.create_session(&credentials()).await.unwrap();

    harness.advance_ms(2 * HOUR_MS);

    // Session itself is still within its 24 hours
    assert!(manager.has_active_session());
    assert_eq!(manager.restore_session().await, None);
}

#[tokio::test]
async fn test_expired_origin_key_is_replaced_on_create() {
    let harness = Harness::new();
    let manager = harness
        .manager(SessionConfig::default())
        .with_origin_key_ttl(Duration::from_secs(3600));
    manager.create_session(&credentials()).await.unwrap();
    let first = harness.key_store.load(NAMESPACE).await.unwrap().unwrap();

    harness.advance_ms(2 * HOUR_MS);
    manager.create_session(&credentials()).await.unwrap();
    let second = harness.key_store.load(NAMESPACE).await.unwrap().unwrap();

    assert!(second.created_at > first.created_at);
    assert_eq!(manager.restore_session().await, Some(credentials()));
}

#[tokio::test]
async fn test_key_store_read_failure_fails_restore() {
    let harness = Harness::new();
    let manager = harness.manager(SessionConfig::default());
    manager.create_session(&credentials()).await.unwrap();

    harness
        .key_store
        .inject_error(StorageError::Unavailable("IndexedDB blocked".to_string()))
        .await;

    assert_eq!(manager.restore_session().await, None);
    // One-shot failure: the next attempt succeeds and nothing was discarded
    assert_eq!(manager.restore_session().await, Some(credentials()));
}

#[tokio::test]
async fn test_swapped_wraps_fail_restore() {
    let harness = Harness::new();
    let manager = harness.manager(SessionConfig::default());
    manager.create_session(&credentials()).await.unwrap();

    let mut data = harness.stored_record().unwrap();
    std::mem::swap(&mut data.device, &mut data.origin);
    harness.write_record(&data);

    let (logs, _guard) = capture_logs();
    assert_eq!(manager.restore_session().await, None);
    assert!(logs.contents().contains("Key unwrapping mismatch"));
}

#[tokio::test]
async fn test_wraps_from_another_session_fail_restore() {
    // Splice the origin-side wrap of one session into another
    let harness = Harness::new();
    let manager = harness.manager(SessionConfig::default());

    manager.create_session(&credentials()).await.unwrap();
    let first = harness.stored_record().unwrap();
    manager.create_session(&credentials()).await.unwrap();
    let mut second = harness.stored_record().unwrap();

    second.origin = first.origin;
    harness.write_record(&second);

    assert_eq!(manager.restore_session().await, None);
}

#[tokio::test]
async fn test_tampered_ciphertext_fails_restore() {
    let harness = Harness::new();
    let manager = harness.manager(SessionConfig::default());
    manager.create_session(&credentials()).await.unwrap();

    let mut data = harness.stored_record().unwrap();
    let mut bytes: Vec<u8> = data.encrypted_credentials.into_bytes();
    // Flip one base64 character without leaving the alphabet
    bytes[4] = if bytes[4] == b'A' { b'B' } else { b'A' };
    data.encrypted_credentials = String::from_utf8(bytes).unwrap();
    harness.write_record(&data);

    assert_eq!(manager.restore_session().await, None);
}

#[tokio::test]
async fn test_stored_fingerprint_is_not_trusted() {
    let harness = Harness::new();
    let manager = harness.manager(SessionConfig::default());
    manager.create_session(&credentials()).await.unwrap();

    // Copy the record to another device along with a forged fingerprint field
    let mut data = harness.stored_record().unwrap();
    data.device_fingerprint = Some("0".repeat(64));
    harness.write_record(&data);

    let elsewhere = harness.manager_on(other_device(), SessionConfig::default());
    assert_eq!(elsewhere.restore_session().await, None);
    assert_eq!(manager.restore_session().await, Some(credentials()));
}

#[tokio::test]
async fn test_unbounded_origin_key_ttl_keeps_sessions_restorable() {
    let harness = Harness::new();
    let manager = harness
        .manager(SessionConfig::default())
        .with_origin_key_ttl(Duration::MAX);
    manager.create_session(&credentials()).await.unwrap();

    let record = harness.key_store.load(NAMESPACE).await.unwrap().unwrap();
    assert_eq!(record.expires_at, i64::MAX);
    assert_eq!(manager.restore_session().await, Some(credentials()));
}
