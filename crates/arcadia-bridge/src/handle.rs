//! Host-side handle to a bridge runtime.
//!
//! The handle is safe to use from any thread; every method that touches
//! script state only enqueues a command for the runtime thread. Nothing
//! here blocks, and nothing reports back: submission after teardown is a
//! silent no-op, which is the intended shutdown behavior, not an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use deno_core::v8;
use tokio::sync::{mpsc, watch};

use crate::command::RuntimeCommand;
use crate::dispatch::{PURCHASE_SUCCESS, PurchaseEvent};
use crate::error::BridgeError;

/// Handle to a spawned bridge runtime.
#[derive(Debug)]
pub struct BridgeHandle {
    /// Command sender; the worker drains this in FIFO order.
    pub(crate) cmd_tx: mpsc::UnboundedSender<RuntimeCommand>,
    /// Shutdown signal sender.
    pub(crate) shutdown_tx: watch::Sender<bool>,
    /// Whether the runtime has terminated.
    pub(crate) terminated: Arc<AtomicBool>,
    /// V8 isolate handle for forced termination.
    pub(crate) isolate_handle: v8::IsolateHandle,
    /// Thread join handle.
    pub(crate) thread_handle: std::sync::Mutex<Option<thread::JoinHandle<Result<(), BridgeError>>>>,
}

impl BridgeHandle {
    /// Queue `source` for evaluation on the runtime thread.
    ///
    /// Returns immediately; the evaluation happens later, in submission
    /// order relative to every other command on this handle, and its
    /// result value is discarded. If the runtime is torn down before the
    /// command runs, the command is silently dropped.
    pub fn evaluate(&self, source: impl Into<String>) {
        if self.terminated.load(Ordering::SeqCst) {
            tracing::debug!("evaluate dropped: bridge has terminated");
            return;
        }
        let command = RuntimeCommand::Evaluate {
            source: source.into(),
        };
        if self.cmd_tx.send(command).is_err() {
            tracing::debug!("evaluate dropped: bridge runtime is gone");
        }
    }

    /// Queue a native event for dispatch to its registered script target.
    ///
    /// Callable from whatever thread the platform callback arrives on;
    /// resolution and invocation happen on the runtime thread. An event
    /// with no registered target, or whose target does not resolve at
    /// dispatch time, is skipped silently.
    pub fn dispatch(&self, event: impl Into<String>, fields: Vec<String>) {
        if self.terminated.load(Ordering::SeqCst) {
            tracing::debug!("dispatch dropped: bridge has terminated");
            return;
        }
        let command = RuntimeCommand::Dispatch {
            event: event.into(),
            fields,
        };
        if self.cmd_tx.send(command).is_err() {
            tracing::debug!("dispatch dropped: bridge runtime is gone");
        }
    }

    /// Forward a completed purchase to script code.
    pub fn notify_purchase_success(&self, event: PurchaseEvent) {
        self.dispatch(PURCHASE_SUCCESS, event.into_fields());
    }

    /// Terminate the runtime.
    ///
    /// Signals the worker to shut down and forcefully terminates V8
    /// execution if a script is stuck. Commands still queued are dropped.
    pub fn terminate(&self) {
        if self.terminated.swap(true, Ordering::SeqCst) {
            return; // Already terminated
        }
        // Signal shutdown - this wakes the worker's select!
        let _ = self.shutdown_tx.send(true);
        // Force terminate V8 execution if it's stuck
        self.isolate_handle.terminate_execution();
    }

    /// Check if the runtime has terminated.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Wait for the runtime thread to finish.
    pub fn join(self) -> Result<(), BridgeError> {
        if let Some(handle) = self.thread_handle.lock().unwrap().take() {
            handle.join().map_err(|_| BridgeError::ThreadPanic)??;
        }
        Ok(())
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        self.terminate();
        // Wait for the thread to finish to ensure clean V8 shutdown
        if let Some(handle) = self.thread_handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}
