// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Device binding
//!
//! Derives a coarse per-device fingerprint from display geometry, timezone and
//! a canvas-rendering hash, and turns `(fingerprint, session_id)` into a
//! non-extractable wrap-only key with HKDF-SHA256.
//!
//! The fingerprint is a defence-in-depth signal, not an identity factor: it is
//! replay-resistant but not forgery-resistant, and an external monitor, a
//! display-scaling change or a timezone change will invalidate sessions.

use super::environment::EnvironmentFingerprinter;
use crate::crypto::{CryptoError, KeyHandle, KeyUsage, SymmetricKeyProvider};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

/// HKDF info string for device-bound session keys
pub const DEVICE_KEY_INFO: &[u8] = b"lnc-session-device-key-v1";

/// Text drawn for the canvas hash
pub const CANVAS_TEXT: &str = "lnc-session fingerprint \u{1F510} 0123456789";
pub const CANVAS_FONT: &str = "14px Arial";
pub const CANVAS_BASELINE: &str = "top";

/// Fingerprinting failed; the environment cannot create bindable sessions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("Device fingerprinting requires display geometry")]
    DisplayUnavailable,

    #[error("Device fingerprinting requires canvas rendering")]
    CanvasUnavailable,
}

/// Derives device fingerprints and device-bound session keys
#[derive(Clone)]
pub struct DeviceBinder {
    environment: Arc<dyn EnvironmentFingerprinter>,
    provider: Arc<dyn SymmetricKeyProvider>,
}

impl DeviceBinder {
    pub fn new(
        environment: Arc<dyn EnvironmentFingerprinter>,
        provider: Arc<dyn SymmetricKeyProvider>,
    ) -> Self {
        Self {
            environment,
            provider,
        }
    }

    /// Compute the 64-character hex device fingerprint
    ///
    /// Fails closed: there is no weaker fallback when the display or the
    /// rendering surface is missing.
    pub fn generate_fingerprint(&self) -> Result<String, FingerprintError> {
        let geometry = self
            .environment
            .display_geometry()
            .ok_or(FingerprintError::DisplayUnavailable)?;
        let timezone = self.environment.timezone();
        let raster = self
            .environment
            .rasterize_text(CANVAS_TEXT, CANVAS_FONT, CANVAS_BASELINE)
            .ok_or(FingerprintError::CanvasUnavailable)?;
        let canvas_hash = hex::encode(Sha256::digest(&raster));

        let combined = format!(
            "{}x{}x{}|{}|{}",
            geometry.width, geometry.height, geometry.color_depth, timezone, canvas_hash
        );
        Ok(hex::encode(Sha256::digest(combined.as_bytes())))
    }

    /// Derive the device-bound key for one session
    ///
    /// Deterministic in `(fingerprint, session_id)`, so restoring a session
    /// re-derives the same key without it ever being stored.
    pub async fn derive_session_key(
        &self,
        fingerprint: &str,
        session_id: &str,
    ) -> Result<KeyHandle, CryptoError> {
        self.provider
            .derive_key(
                fingerprint.as_bytes(),
                session_id.as_bytes(),
                DEVICE_KEY_INFO,
                KeyUsage::WrapUnwrap,
            )
            .await
            .map_err(|e| CryptoError::KeyDerivationFailed {
                operation: "device_session_key".to_string(),
                reason: e.to_string(),
            })
    }
}
