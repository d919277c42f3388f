//! Host ops exposed to script code.
//!
//! Ops cover ambient host capabilities only (logging, clock); the store
//! surface is installed by the registrar as plain namespace functions.

use deno_core::op2;

/// Route script logging into the host tracing system.
#[op2(fast)]
pub fn op_host_log(#[string] level: &str, #[string] msg: &str) {
    match level {
        "error" => tracing::error!("{}", msg),
        "warn" => tracing::warn!("{}", msg),
        "info" => tracing::info!("{}", msg),
        "debug" => tracing::debug!("{}", msg),
        "trace" => tracing::trace!("{}", msg),
        _ => tracing::info!("{}", msg),
    }
}

/// Current timestamp in milliseconds.
#[op2(fast)]
#[bigint]
pub fn op_host_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

deno_core::extension!(
    arcadia_host,
    ops = [op_host_log, op_host_now],
    esm_entry_point = "ext:arcadia_host/bootstrap.js",
    esm = ["ext:arcadia_host/bootstrap.js" = "src/bootstrap.js"],
);
