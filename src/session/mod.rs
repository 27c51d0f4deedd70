// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod manager;
pub mod store;
pub mod types;

pub use manager::{SessionContext, SessionManager};
pub use store::SessionStore;
pub use types::{SessionData, SessionInfo};
