// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod error;
pub mod record_store;

// Re-export main types for convenience
pub use error::StorageError;
pub use record_store::{EphemeralRecordStore, MemoryRecordStore, UnavailableRecordStore};
