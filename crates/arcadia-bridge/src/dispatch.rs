//! Native event dispatch targets.
//!
//! Platform callbacks arrive on whatever OS thread the vendor SDK picked.
//! The bridge forwards them to script code by name: a registry maps an
//! event name to a `DispatchTarget`, and the worker resolves that target
//! inside the script global graph at dispatch time. The handler need not
//! exist until then; an unresolved target skips the dispatch silently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Event name for a completed store purchase.
pub const PURCHASE_SUCCESS: &str = "purchase.success";

/// Where an event lands inside the script global graph:
/// `globalThis.<object>.<function>(...)`, invoked with `object` as receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    pub object: String,
    pub function: String,
}

/// Registry of event name → dispatch target.
///
/// Targets are registered before the bridge is spawned and are immutable
/// afterwards; the worker thread owns the registry for the runtime's
/// lifetime. An event with no registered target is skipped, not an error.
#[derive(Debug, Clone, Default)]
pub struct DispatchRegistry {
    targets: HashMap<String, DispatchTarget>,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-wired with the purchase events the platform billing
    /// integration delivers.
    pub fn with_purchase_events() -> Self {
        let mut registry = Self::new();
        registry.register(PURCHASE_SUCCESS, "IapBridge", "OnPurchaseSuccess");
        registry
    }

    pub fn register(
        &mut self,
        event: impl Into<String>,
        object: impl Into<String>,
        function: impl Into<String>,
    ) {
        self.targets.insert(
            event.into(),
            DispatchTarget {
                object: object.into(),
                function: function.into(),
            },
        );
    }

    pub fn target(&self, event: &str) -> Option<&DispatchTarget> {
        self.targets.get(event)
    }
}

/// Payload of a completed purchase, captured once from the platform
/// callback and consumed by a single dispatch. Field order is the argument
/// order the script handler receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEvent {
    pub account_serial: String,
    pub product_id: String,
    pub purchase_token: String,
    pub interrupted: String,
    pub receipt_content: String,
    pub signature: String,
}

impl PurchaseEvent {
    pub(crate) fn into_fields(self) -> Vec<String> {
        vec![
            self.account_serial,
            self.product_id,
            self.purchase_token,
            self.interrupted,
            self.receipt_content,
            self.signature,
        ]
    }
}
