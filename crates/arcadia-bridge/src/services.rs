//! Capabilities handed to the bridge at spawn time.
//!
//! The host constructs the stores and the dispatch registry, keeps what it
//! wants to observe (an `Arc` clone of the memory store, typically), and
//! moves the rest into the worker thread.

use std::sync::Arc;

use crate::dispatch::DispatchRegistry;
use crate::store::KeyValueStore;
use crate::store::MemoryStore;
#[cfg(feature = "device-store")]
use crate::store::{DeviceStore, SecureStore};

/// Stores and dispatch routes owned by one bridge runtime.
#[derive(Clone)]
pub struct BridgeServices {
    /// Volatile backend, always registered as `MemoryStore`.
    pub memory: Arc<MemoryStore>,

    /// Platform credential facility backing the `DeviceStore` backend.
    /// `None` leaves the backend unregistered.
    #[cfg(feature = "device-store")]
    pub device: Option<Arc<dyn SecureStore>>,

    /// Event name → script target routes, fixed at spawn time.
    pub dispatch: DispatchRegistry,
}

impl Default for BridgeServices {
    fn default() -> Self {
        Self {
            memory: Arc::new(MemoryStore::new()),
            #[cfg(feature = "device-store")]
            device: None,
            dispatch: DispatchRegistry::with_purchase_events(),
        }
    }
}

impl BridgeServices {
    /// Backend list in registration order. The registrar must not assume
    /// more than the volatile backend is present.
    pub(crate) fn backends(&self) -> Vec<(&'static str, Arc<dyn KeyValueStore>)> {
        let mut backends: Vec<(&'static str, Arc<dyn KeyValueStore>)> =
            vec![("MemoryStore", self.memory.clone() as Arc<dyn KeyValueStore>)];
        #[cfg(feature = "device-store")]
        if let Some(secure) = &self.device {
            backends.push(("DeviceStore", Arc::new(DeviceStore::new(secure.clone()))));
        }
        backends
    }
}
