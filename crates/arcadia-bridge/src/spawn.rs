//! Bridge spawn function.
//!
//! Creates the runtime thread and blocks only until the script world is
//! ready (namespace installed, prelude evaluated), so a returned handle
//! can be used immediately from any thread.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;

use deno_core::v8;
use tokio::sync::{mpsc, watch};

use crate::error::BridgeError;
use crate::handle::BridgeHandle;
use crate::services::BridgeServices;
use crate::types::BridgeOptions;
use crate::worker::{init_platform, run_worker};

/// Spawn a bridge runtime on its own thread.
///
/// Fails if the thread cannot be spawned or the prelude script errors;
/// after that, nothing about the runtime fails loudly again — see
/// `BridgeHandle` for the fire-and-forget contract.
pub fn spawn_bridge(
    options: BridgeOptions,
    services: BridgeServices,
) -> Result<BridgeHandle, BridgeError> {
    tracing::debug!("[spawn_bridge] starting {}", options.name);
    init_platform();

    let terminated = Arc::new(AtomicBool::new(false));
    let terminated_clone = terminated.clone();

    // Command channel; unbounded so submission never blocks a native
    // callback thread.
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

    // Shutdown signal (watch channel - multiple receivers can subscribe)
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Channel to receive the isolate handle once the script world is up
    let (init_tx, init_rx) = std::sync::mpsc::sync_channel::<Result<v8::IsolateHandle, String>>(1);

    let thread_name = options.name.clone();
    let thread_handle = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || -> Result<(), BridgeError> {
            tracing::debug!("[{}] thread started", thread_name);

            // Current-thread tokio runtime: the isolate never migrates.
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(BridgeError::SpawnFailed)?;

            let result = rt.block_on(run_worker(
                options,
                services,
                terminated_clone,
                cmd_rx,
                shutdown_rx,
                init_tx,
            ));

            rt.shutdown_background();
            tracing::debug!("[{}] thread exiting", thread_name);
            result
        })?;

    // Wait for initialization
    let isolate_handle = init_rx
        .recv()
        .map_err(|_| BridgeError::ChannelClosed)?
        .map_err(BridgeError::Script)?;

    Ok(BridgeHandle {
        cmd_tx,
        shutdown_tx,
        terminated,
        isolate_handle,
        thread_handle: std::sync::Mutex::new(Some(thread_handle)),
    })
}
