// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Device- and origin-bound session protection for node connections
//!
//! Stores the credentials needed to reconnect to a remote node so that a
//! page reload does not require re-entering them, while making the stored
//! record useless on any other device or origin. The credentials key is
//! wrapped under a key derived from the device fingerprint and under a
//! durable origin key; both must agree before anything is decrypted.
//!
//! ```ignore
//! let context = SessionContext::in_memory(Arc::new(FixedEnvironment::default()));
//! let manager = SessionManager::new("default", SessionConfig::default(), context)?;
//!
//! manager.create_session(&credentials).await?;
//! let restored = manager.restore_session().await;
//! ```

pub mod clock;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod device;
pub mod error;
pub mod origin;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use credentials::{CredentialsEncrypter, EncryptedCredentials, SessionCredentials};
pub use crypto::{CryptoError, KeyHandle, KeyWrapper, SoftwareKeyProvider, SymmetricKeyProvider};
pub use device::{
    DeviceBinder, DisplayGeometry, EnvironmentFingerprinter, FingerprintError, FixedEnvironment,
};
pub use error::{Result, SessionError};
pub use origin::{DurableKeyStore, MemoryKeyStore, OriginKeyManager, OriginKeyRecord};
pub use session::{SessionContext, SessionData, SessionInfo, SessionManager, SessionStore};
pub use storage::{EphemeralRecordStore, MemoryRecordStore, StorageError, UnavailableRecordStore};
