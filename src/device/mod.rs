// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod binder;
pub mod environment;

pub use binder::{DeviceBinder, FingerprintError, DEVICE_KEY_INFO};
pub use environment::{DisplayGeometry, EnvironmentFingerprinter, FixedEnvironment};
