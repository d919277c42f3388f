//! Worker thread for the bridge runtime.
//!
//! One `JsRuntime` lives on one dedicated thread; every touch of script
//! state (namespace install, evaluation, event dispatch) happens here.
//! Other threads reach the runtime only through the command channel, which
//! gives evaluations and dispatches a single FIFO order.

use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use deno_core::JsRuntime;
use deno_core::PollEventLoopOptions;
use deno_core::RuntimeOptions;
use deno_core::v8;
use tokio::sync::{mpsc, watch};

use crate::bindings::{self, BindingState};
use crate::command::RuntimeCommand;
use crate::dispatch::DispatchTarget;
use crate::error::BridgeError;
use crate::marshal;
use crate::ops::arcadia_host;
use crate::services::BridgeServices;
use crate::types::BridgeOptions;

/// Ensure the V8 platform is initialized exactly once.
static V8_INIT: Once = Once::new();

/// Mutex to serialize V8 isolate creation.
/// Creating multiple isolates concurrently can cause crashes in V8.
pub(crate) static ISOLATE_CREATE_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Initialize the V8 platform. Call this before spawning any bridges.
/// Safe to call multiple times - will only initialize once.
pub fn init_platform() {
    V8_INIT.call_once(|| {
        JsRuntime::init_platform(None, false);
    });
}

/// The main worker loop that runs inside the spawned thread.
pub(crate) async fn run_worker(
    options: BridgeOptions,
    services: BridgeServices,
    terminated: Arc<AtomicBool>,
    mut cmd_rx: mpsc::UnboundedReceiver<RuntimeCommand>,
    mut shutdown_rx: watch::Receiver<bool>,
    init_tx: std::sync::mpsc::SyncSender<Result<v8::IsolateHandle, String>>,
) -> Result<(), BridgeError> {
    let mut js_runtime = {
        let _lock = ISOLATE_CREATE_LOCK.lock().unwrap();
        tracing::debug!("[{}] creating JsRuntime", options.name);
        JsRuntime::new(RuntimeOptions {
            extensions: vec![arcadia_host::init_ops_and_esm()],
            ..Default::default()
        })
    };

    let isolate_handle = js_runtime.v8_isolate().thread_safe_handle();

    // The registry is consulted here for every dispatch; the binding state
    // must stay alive as long as script can call into the backends.
    let registry = services.dispatch.clone();
    let bindings_state = BindingState::new(services.backends());
    {
        let scope = &mut js_runtime.handle_scope();
        bindings::install_namespace(scope, &options.namespace, &bindings_state);
    }

    if let Some(prelude) = options.prelude.clone() {
        if let Err(err) = js_runtime.execute_script("<prelude>", prelude) {
            let _ = init_tx.send(Err(err.to_string()));
            return Err(BridgeError::Script(err.to_string()));
        }
        if let Err(err) = js_runtime
            .run_event_loop(PollEventLoopOptions::default())
            .await
        {
            let _ = init_tx.send(Err(err.to_string()));
            return Err(BridgeError::Script(err.to_string()));
        }
    }

    let _ = init_tx.send(Ok(isolate_handle));
    tracing::debug!("[{}] entering command loop", options.name);

    loop {
        if *shutdown_rx.borrow() || terminated.load(Ordering::SeqCst) {
            tracing::debug!("[{}] shutdown signal received", options.name);
            break;
        }

        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    tracing::debug!("[{}] shutdown signal received", options.name);
                    break;
                }
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    tracing::debug!("[{}] command channel closed", options.name);
                    break;
                };
                match cmd {
                    RuntimeCommand::Evaluate { source } => {
                        if terminated.load(Ordering::SeqCst) {
                            tracing::debug!("[{}] dropping command after teardown", options.name);
                            continue;
                        }
                        evaluate_source(&mut js_runtime, source).await;
                    }
                    RuntimeCommand::Dispatch { event, fields } => {
                        if terminated.load(Ordering::SeqCst) {
                            tracing::debug!("[{}] dropping event after teardown", options.name);
                            continue;
                        }
                        match registry.target(&event) {
                            Some(target) => {
                                dispatch_into_script(&mut js_runtime, target, &fields);
                                let _ = js_runtime
                                    .run_event_loop(PollEventLoopOptions {
                                        wait_for_inspector: false,
                                        pump_v8_message_loop: true,
                                    })
                                    .await;
                            }
                            None => {
                                tracing::debug!(
                                    "[{}] no dispatch target registered for '{}'",
                                    options.name,
                                    event
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    tracing::debug!("[{}] worker finished", options.name);
    Ok(())
}

/// Evaluate a queued command string, discarding the result value.
///
/// Script errors are logged and swallowed: by the time the evaluation
/// runs, the submitter is long gone and has nowhere to hear about them.
async fn evaluate_source(js_runtime: &mut JsRuntime, source: String) {
    match js_runtime.execute_script("<evaluate>", source) {
        Ok(_) => {
            if let Err(err) = js_runtime
                .run_event_loop(PollEventLoopOptions::default())
                .await
            {
                tracing::debug!("evaluated command left a failing task: {err}");
            }
        }
        Err(err) => {
            tracing::debug!("evaluated command failed: {err}");
        }
    }
}

/// Resolve `globalThis.<object>.<function>` and invoke it with `fields`.
///
/// Late-bound by design: the handler need not exist until dispatch time.
/// Every resolution miss (object absent, property absent, not callable)
/// skips the dispatch silently. A throwing handler is caught and cleared
/// so subsequent calls are unaffected.
fn dispatch_into_script(js_runtime: &mut JsRuntime, target: &DispatchTarget, fields: &[String]) {
    let scope = &mut js_runtime.handle_scope();
    let context = scope.get_current_context();
    let global = context.global(scope);

    let Some(object_key) = v8::String::new(scope, &target.object) else {
        return;
    };
    let Some(receiver) = global.get(scope, object_key.into()) else {
        return;
    };
    let Ok(receiver_obj) = v8::Local::<v8::Object>::try_from(receiver) else {
        return;
    };

    let Some(function_key) = v8::String::new(scope, &target.function) else {
        return;
    };
    let Some(callee) = receiver_obj.get(scope, function_key.into()) else {
        return;
    };
    if !callee.is_function() {
        return;
    }
    let Ok(function) = v8::Local::<v8::Function>::try_from(callee) else {
        return;
    };

    let args: Vec<v8::Local<v8::Value>> = fields
        .iter()
        .map(|field| marshal::to_script_string(scope, field))
        .collect();

    let scope = &mut v8::TryCatch::new(scope);
    if function.call(scope, receiver, &args).is_none() && scope.has_caught() {
        let exception = scope.exception();
        let detail = match exception {
            Some(exception) => exception.to_rust_string_lossy(scope),
            None => String::new(),
        };
        tracing::debug!(
            "event handler {}.{} threw: {detail}",
            target.object,
            target.function
        );
    }
}
