//! Key-value store backends exposed to script code.
//!
//! Both backends honor the same contract: `read` reports absence with
//! `None`, `write` and `delete` report whether the key existed before the
//! operation. Script code observes identical signatures regardless of
//! backend; only durability differs.

use std::collections::HashMap;
#[cfg(feature = "device-store")]
use std::sync::Arc;
use std::sync::Mutex;

use crate::error::SecureStoreError;

/// The uniform store contract installed under the script namespace.
///
/// All three operations are synchronous; callers run on the script thread.
pub trait KeyValueStore: Send + Sync + 'static {
    /// The stored value, or `None` if the key is absent. Never fails.
    fn read(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`. Returns true iff the key already existed
    /// (overwrite), false for a fresh insert or a backend failure.
    fn write(&self, key: &str, value: &str) -> bool;

    /// Remove `key`. Returns true iff the key existed; deleting an absent
    /// key is a no-op returning false.
    fn delete(&self, key: &str) -> bool;
}

/// Volatile process-lifetime backend.
///
/// Entries die with the process. The mutex makes the store safe to share
/// between the script thread and a host thread holding a clone of the
/// `Arc`; in steady state only the script thread touches it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.lock().unwrap().remove(key).is_some()
    }
}

/// The platform secure-storage capability the device backend delegates to.
///
/// Implementations wrap an OS credential facility (keychain, keystore).
/// The bridge only consumes this interface; it ships no OS implementation.
pub trait SecureStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, SecureStoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), SecureStoreError>;

    fn delete(&self, key: &str) -> Result<(), SecureStoreError>;
}

/// Durable backend over the platform credential store.
///
/// Secure-storage errors (denied, unavailable) collapse into the boolean
/// contract: script code cannot distinguish a platform denial from an
/// absent key.
#[cfg(feature = "device-store")]
pub struct DeviceStore {
    secure: Arc<dyn SecureStore>,
}

#[cfg(feature = "device-store")]
impl DeviceStore {
    pub fn new(secure: Arc<dyn SecureStore>) -> Self {
        Self { secure }
    }
}

#[cfg(feature = "device-store")]
impl KeyValueStore for DeviceStore {
    fn read(&self, key: &str) -> Option<String> {
        match self.secure.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!("secure storage read failed: {err}");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> bool {
        let existed = match self.secure.get(key) {
            Ok(prior) => prior.is_some(),
            Err(err) => {
                tracing::debug!("secure storage probe failed: {err}");
                return false;
            }
        };
        match self.secure.set(key, value) {
            Ok(()) => existed,
            Err(err) => {
                tracing::debug!("secure storage write failed: {err}");
                false
            }
        }
    }

    fn delete(&self, key: &str) -> bool {
        let existed = match self.secure.get(key) {
            Ok(prior) => prior.is_some(),
            Err(err) => {
                tracing::debug!("secure storage probe failed: {err}");
                return false;
            }
        };
        if !existed {
            return false;
        }
        match self.secure.delete(key) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("secure storage delete failed: {err}");
                false
            }
        }
    }
}
