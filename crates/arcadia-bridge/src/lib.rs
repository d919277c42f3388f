//! Arcadia script bridge.
//!
//! Connects a multi-threaded native host to an embedded single-threaded
//! JavaScript runtime (V8 via deno_core). The runtime lives on its own
//! thread; the host talks to it through a [`BridgeHandle`] whose commands
//! are delivered in FIFO order and executed only while the runtime is
//! still valid.
//!
//! # Architecture
//!
//! - Script code sees a namespace object (default `Arcadia`) carrying
//!   key-value store backends as static-function classes:
//!   `Arcadia.MemoryStore.{Read,Write,Delete}` and, when a platform
//!   secure store is supplied, `Arcadia.DeviceStore` with the same shape.
//! - Native platform callbacks (e.g. billing confirmations) are forwarded
//!   through a [`DispatchRegistry`]: the event's target function is
//!   resolved by name inside the script global graph at dispatch time and
//!   skipped silently if absent.
//! - Arbitrary command strings are evaluated via
//!   [`BridgeHandle::evaluate`], fire-and-forget, always on the runtime
//!   thread, dropped silently once the runtime is torn down.
//!
//! Nothing in this crate raises an error across the script boundary:
//! argument errors degrade to sentinel values, resolution misses skip,
//! backend failures collapse to `false`/`undefined`.

mod bindings;
mod command;
mod dispatch;
mod error;
mod handle;
pub mod marshal;
mod ops;
mod services;
mod spawn;
mod store;
mod types;
mod worker;

pub use dispatch::{DispatchRegistry, DispatchTarget, PURCHASE_SUCCESS, PurchaseEvent};
pub use error::{BridgeError, SecureStoreError};
pub use handle::BridgeHandle;
pub use services::BridgeServices;
pub use spawn::spawn_bridge;
#[cfg(feature = "device-store")]
pub use store::DeviceStore;
pub use store::{KeyValueStore, MemoryStore, SecureStore};
pub use types::BridgeOptions;
pub use worker::init_platform;
