//! End-to-end walkthrough: spawn a bridge, let script code persist data,
//! then deliver a native purchase confirmation from the host thread.
//!
//! Run with: cargo run -p arcadia-bridge --example purchase_flow

use std::time::Duration;

use anyhow::Result;
use arcadia_bridge::{BridgeOptions, BridgeServices, KeyValueStore, PurchaseEvent, spawn_bridge};

const PRELUDE: &str = r#"
globalThis.IapBridge = {
    OnPurchaseSuccess(accountSerial, productId, purchaseToken, interrupted, receipt, signature) {
        console.info("purchase confirmed for", productId);
        Arcadia.MemoryStore.Write("last-receipt", receipt);
        Arcadia.MemoryStore.Write("last-signature", signature);
    },
};
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let bridge = spawn_bridge(
        BridgeOptions {
            name: "purchase-flow".to_string(),
            prelude: Some(PRELUDE.to_string()),
            ..Default::default()
        },
        services,
    )?;

    // Script-side persistence, queued from the host thread.
    bridge.evaluate(r#"Arcadia.MemoryStore.Write("session", "started at " + host.now());"#);

    // A billing callback would land on an arbitrary OS thread; delivery
    // only enqueues, so this is safe from anywhere.
    bridge.notify_purchase_success(PurchaseEvent {
        account_serial: "serial-7".to_string(),
        product_id: "coins.large".to_string(),
        purchase_token: "tok-1".to_string(),
        interrupted: "0".to_string(),
        receipt_content: "{\"order\":\"GPA.1234\"}".to_string(),
        signature: "sig-abc".to_string(),
    });

    // Fire-and-forget contract: give the runtime a moment, then observe
    // the effects through the host-held store handle.
    std::thread::sleep(Duration::from_millis(200));
    println!("session      = {:?}", memory.read("session"));
    println!("last receipt = {:?}", memory.read("last-receipt"));

    bridge.terminate();
    bridge.join()?;
    Ok(())
}
