//! Error types for the bridge.

/// Errors surfaced to the host. Script code never sees these: every failure
/// crossing the script boundary degrades to a sentinel value instead.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("bridge runtime has terminated")]
    Terminated,

    #[error("channel closed")]
    ChannelClosed,

    #[error("bridge thread panicked")]
    ThreadPanic,

    #[error("script error: {0}")]
    Script(String),

    #[error("failed to spawn thread: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

/// Errors from the platform secure-storage facility.
///
/// These never reach script code; the device backend collapses all of them
/// into its boolean/absent failure contract.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SecureStoreError {
    #[error("access denied")]
    Denied,

    #[error("secure storage unavailable")]
    Unavailable,

    #[error("secure storage failure: {0}")]
    Backend(String),
}
