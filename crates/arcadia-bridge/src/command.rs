//! Commands sent to the bridge worker thread.
//!
//! Both variants are fire-and-forget: the submitting thread gets no reply
//! channel. Ordering is the channel's FIFO order, shared by evaluations
//! and event dispatches alike.

/// Messages carried by the worker's command channel. Shutdown travels on a
/// separate watch channel so it can overtake queued work.
pub(crate) enum RuntimeCommand {
    /// Evaluate a source string on the script thread, discarding the result.
    Evaluate { source: String },

    /// Resolve a registered event target and invoke it with the fields.
    Dispatch { event: String, fields: Vec<String> },
}
