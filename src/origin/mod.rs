// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod manager;
pub mod store;

pub use manager::{OriginKeyManager, DEFAULT_ORIGIN_KEY_TTL};
pub use store::{DurableKeyStore, MemoryKeyStore, OriginKeyRecord};
