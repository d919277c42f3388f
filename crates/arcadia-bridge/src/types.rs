//! Bridge configuration.

use serde::{Deserialize, Serialize};

/// Options for one bridge runtime. Serde-enabled so hosts can carry this
/// in their own configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeOptions {
    /// Thread and log name for the runtime.
    pub name: String,

    /// Script-visible namespace object the store backends live under.
    pub namespace: String,

    /// Script evaluated on the runtime thread before the spawn call
    /// returns. Unlike `evaluate`, a failing prelude fails the spawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prelude: Option<String>,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            name: "arcadia-bridge".to_string(),
            namespace: "Arcadia".to_string(),
            prelude: None,
        }
    }
}
