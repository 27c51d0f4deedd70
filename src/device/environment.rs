// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment signals used for device fingerprinting

use serde::{Deserialize, Serialize};

/// Display geometry as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayGeometry {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
}

/// Host capability exposing the signals a fingerprint is built from
pub trait EnvironmentFingerprinter: Send + Sync {
    /// Screen geometry, or `None` when there is no display
    fn display_geometry(&self) -> Option<DisplayGeometry>;

    /// Resolved IANA timezone name (e.g. "Europe/Berlin")
    fn timezone(&self) -> String;

    /// Rasterize `text` offscreen and return the raw pixel data, or `None`
    /// when no rendering surface is available
    fn rasterize_text(&self, text: &str, font: &str, baseline: &str) -> Option<Vec<u8>>;
}

/// Environment with explicitly supplied signals
///
/// Used by headless hosts and tests. `raster_seed` stands in for the
/// GPU/font-stack differences a real canvas would expose: two environments
/// with different seeds rasterize the same text differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedEnvironment {
    geometry: Option<DisplayGeometry>,
    timezone: String,
    raster_seed: Option<Vec<u8>>,
}

impl FixedEnvironment {
    pub fn new(geometry: DisplayGeometry, timezone: impl Into<String>) -> Self {
        Self {
            geometry: Some(geometry),
            timezone: timezone.into(),
            raster_seed: Some(Vec::new()),
        }
    }

    /// An environment with no display and no rendering surface
    pub fn headless() -> Self {
        Self {
            geometry: None,
            timezone: "UTC".to_string(),
            raster_seed: None,
        }
    }

    pub fn with_raster_seed(mut self, seed: impl Into<Vec<u8>>) -> Self {
        self.raster_seed = Some(seed.into());
        self
    }

    pub fn without_canvas(mut self) -> Self {
        self.raster_seed = None;
        self
    }

    pub fn with_geometry(mut self, geometry: DisplayGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}

impl Default for FixedEnvironment {
    fn default() -> Self {
        Self::new(
            DisplayGeometry {
                width: 1920,
                height: 1080,
                color_depth: 24,
            },
            "UTC",
        )
    }
}

impl EnvironmentFingerprinter for FixedEnvironment {
    fn display_geometry(&self) -> Option<DisplayGeometry> {
        self.geometry
    }

    fn timezone(&self) -> String {
        self.timezone.clone()
    }

    fn rasterize_text(&self, text: &str, font: &str, baseline: &str) -> Option<Vec<u8>> {
        let seed = self.raster_seed.as_ref()?;
        let mut raster = Vec::with_capacity(seed.len() + text.len() + font.len() + baseline.len());
        raster.extend_from_slice(seed);
        raster.extend_from_slice(font.as_bytes());
        raster.extend_from_slice(baseline.as_bytes());
        raster.extend_from_slice(text.as_bytes());
        Some(raster)
    }
}
