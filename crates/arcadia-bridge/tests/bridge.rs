//! End-to-end tests over the public bridge handle.
//!
//! The evaluator is fire-and-forget by contract, so effects are observed
//! through a host-held clone of the memory store with a bounded poll.

use std::time::{Duration, Instant};

use arcadia_bridge::{BridgeOptions, BridgeServices, KeyValueStore, PurchaseEvent, spawn_bridge};

fn options(name: &str) -> BridgeOptions {
    BridgeOptions {
        name: name.to_string(),
        ..Default::default()
    }
}

fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if cond() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("timed out waiting for {what}");
}

#[test]
fn write_then_read_round_trips() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let bridge = spawn_bridge(options("write-read"), services).unwrap();

    bridge.evaluate(r#"Arcadia.MemoryStore.Write("greeting", "hello");"#);
    wait_until("write to land", || {
        memory.read("greeting").as_deref() == Some("hello")
    });

    bridge.evaluate(r#"Arcadia.MemoryStore.Write("echo", Arcadia.MemoryStore.Read("greeting"));"#);
    wait_until("read-back echo", || {
        memory.read("echo").as_deref() == Some("hello")
    });
}

#[test]
fn write_signals_overwrite_and_delete_signals_existence() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let bridge = spawn_bridge(options("signals"), services).unwrap();

    bridge.evaluate(
        r#"(() => {
            const inserted = Arcadia.MemoryStore.Write("slot", "one");
            const overwrote = Arcadia.MemoryStore.Write("slot", "two");
            const ghost = Arcadia.MemoryStore.Delete("ghost");
            const present = Arcadia.MemoryStore.Delete("slot");
            const gone = Arcadia.MemoryStore.Read("slot");
            Arcadia.MemoryStore.Write(
                "signals",
                [inserted, overwrote, ghost, present, typeof gone].join(",")
            );
        })();"#,
    );
    wait_until("signals to land", || {
        memory.read("signals").as_deref() == Some("false,true,false,true,undefined")
    });
}

#[test]
fn wrong_arity_reports_failure_without_mutation() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let bridge = spawn_bridge(options("arity"), services).unwrap();

    bridge.evaluate(
        r#"(() => {
            const short = Arcadia.MemoryStore.Write("orphan");
            const wide = Arcadia.MemoryStore.Read("a", "b");
            const none = Arcadia.MemoryStore.Delete();
            const typed = Arcadia.MemoryStore.Write(42, "v");
            Arcadia.MemoryStore.Write(
                "arity-signals",
                [short, typeof wide, none, typed].join(",")
            );
        })();"#,
    );
    wait_until("arity signals", || {
        memory.read("arity-signals").as_deref() == Some("false,undefined,false,false")
    });
    assert_eq!(memory.read("orphan"), None);
    assert_eq!(memory.read("42"), None);
}

#[test]
fn evaluation_keeps_submission_order() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let bridge = spawn_bridge(options("ordering"), services).unwrap();

    for step in ["a", "b", "c", "d"] {
        bridge.evaluate(format!(
            r#"(() => {{
                const prior = Arcadia.MemoryStore.Read("journal") ?? "";
                Arcadia.MemoryStore.Write("journal", prior + {});
            }})();"#,
            serde_json::to_string(step).unwrap()
        ));
    }
    wait_until("journal in submission order", || {
        memory.read("journal").as_deref() == Some("abcd")
    });
}

#[test]
fn failing_command_does_not_poison_later_commands() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let bridge = spawn_bridge(options("poison"), services).unwrap();

    bridge.evaluate("throw new Error('boom');");
    bridge.evaluate(r#"Arcadia.MemoryStore.Write("after", "alive");"#);
    wait_until("command after failure", || {
        memory.read("after").as_deref() == Some("alive")
    });
}

#[test]
fn dispatch_without_handler_is_skipped() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let bridge = spawn_bridge(options("no-handler"), services).unwrap();

    // No IapBridge object exists; nothing must crash or mutate.
    bridge.notify_purchase_success(sample_purchase());
    // Unknown event names are skipped before resolution even starts.
    bridge.dispatch("session.renewed", vec!["x".to_string()]);

    bridge.evaluate(r#"Arcadia.MemoryStore.Write("marker", "done");"#);
    wait_until("marker after skipped dispatches", || {
        memory.read("marker").as_deref() == Some("done")
    });
    assert_eq!(memory.read("purchase"), None);
}

#[test]
fn dispatch_tolerates_a_non_callable_target() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let mut opts = options("not-callable");
    opts.prelude = Some("globalThis.IapBridge = { OnPurchaseSuccess: 'not a function' };".into());
    let bridge = spawn_bridge(opts, services).unwrap();

    bridge.notify_purchase_success(sample_purchase());
    bridge.evaluate(r#"Arcadia.MemoryStore.Write("marker", "done");"#);
    wait_until("marker after non-callable dispatch", || {
        memory.read("marker").as_deref() == Some("done")
    });
}

#[test]
fn dispatch_invokes_the_late_bound_handler() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let bridge = spawn_bridge(options("purchase"), services).unwrap();

    // The handler is installed after spawn: resolution happens at
    // dispatch time, not registration time.
    bridge.evaluate(
        r#"globalThis.IapBridge = {
            OnPurchaseSuccess(accountSerial, productId, purchaseToken, interrupted, receipt, signature) {
                Arcadia.MemoryStore.Write(
                    "purchase",
                    [accountSerial, productId, purchaseToken, interrupted, receipt, signature].join("|")
                );
            },
        };"#,
    );
    bridge.notify_purchase_success(sample_purchase());
    wait_until("purchase handler", || {
        memory.read("purchase").as_deref() == Some("serial-7|coins.large|tok-1|0|receipt-body|sig-abc")
    });
}

#[test]
fn throwing_handler_does_not_poison_later_commands() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let mut opts = options("throwing-handler");
    opts.prelude = Some(
        "globalThis.IapBridge = { OnPurchaseSuccess() { throw new Error('handler boom'); } };"
            .into(),
    );
    let bridge = spawn_bridge(opts, services).unwrap();

    bridge.notify_purchase_success(sample_purchase());
    bridge.evaluate(r#"Arcadia.MemoryStore.Write("after-throw", "alive");"#);
    wait_until("command after throwing handler", || {
        memory.read("after-throw").as_deref() == Some("alive")
    });
}

#[test]
fn commands_after_terminate_are_dropped_silently() {
    let services = BridgeServices::default();
    let memory = services.memory.clone();
    let bridge = spawn_bridge(options("teardown"), services).unwrap();

    bridge.terminate();
    assert!(bridge.is_terminated());
    bridge.evaluate(r#"Arcadia.MemoryStore.Write("late", "never");"#);
    bridge.notify_purchase_success(sample_purchase());
    bridge.join().unwrap();
    assert_eq!(memory.read("late"), None);
}

#[test]
fn failing_prelude_fails_the_spawn() {
    let mut opts = options("bad-prelude");
    opts.prelude = Some("throw new Error('prelude boom');".into());
    let err = spawn_bridge(opts, BridgeServices::default()).unwrap_err();
    assert!(err.to_string().contains("prelude boom"), "got: {err}");
}

fn sample_purchase() -> PurchaseEvent {
    PurchaseEvent {
        account_serial: "serial-7".into(),
        product_id: "coins.large".into(),
        purchase_token: "tok-1".into(),
        interrupted: "0".into(),
        receipt_content: "receipt-body".into(),
        signature: "sig-abc".into(),
    }
}

#[cfg(feature = "device-store")]
mod device {
    use super::*;
    use arcadia_bridge::{SecureStore, SecureStoreError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Stand-in for the platform credential facility.
    #[derive(Default)]
    struct FakeSecureStore {
        entries: Mutex<HashMap<String, String>>,
        deny: AtomicBool,
    }

    impl FakeSecureStore {
        fn check(&self) -> Result<(), SecureStoreError> {
            if self.deny.load(Ordering::SeqCst) {
                Err(SecureStoreError::Denied)
            } else {
                Ok(())
            }
        }
    }

    impl SecureStore for FakeSecureStore {
        fn get(&self, key: &str) -> Result<Option<String>, SecureStoreError> {
            self.check()?;
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), SecureStoreError> {
            self.check()?;
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<(), SecureStoreError> {
            self.check()?;
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[test]
    fn device_backend_is_isolated_from_the_memory_backend() {
        let fake = Arc::new(FakeSecureStore::default());
        let mut services = BridgeServices::default();
        services.device = Some(fake.clone());
        let memory = services.memory.clone();
        let bridge = spawn_bridge(options("device-isolation"), services).unwrap();

        bridge.evaluate(
            r#"(() => {
                const inserted = Arcadia.DeviceStore.Write("vault", "secret");
                const overwrote = Arcadia.DeviceStore.Write("vault", "second");
                const crossover = Arcadia.MemoryStore.Read("vault");
                Arcadia.MemoryStore.Write("memory-side", "plain");
                Arcadia.MemoryStore.Write(
                    "device-signals",
                    [inserted, overwrote, typeof crossover].join(",")
                );
            })();"#,
        );
        wait_until("device signals", || {
            memory.read("device-signals").as_deref() == Some("false,true,undefined")
        });
        assert_eq!(
            fake.entries.lock().unwrap().get("vault").map(String::as_str),
            Some("second")
        );
        // The secure store never sees memory-backend keys.
        assert!(!fake.entries.lock().unwrap().contains_key("memory-side"));
        assert_eq!(memory.read("vault"), None);
    }

    #[test]
    fn platform_denial_reads_as_absent() {
        let fake = Arc::new(FakeSecureStore::default());
        let mut services = BridgeServices::default();
        services.device = Some(fake.clone());
        let memory = services.memory.clone();
        let bridge = spawn_bridge(options("device-denied"), services).unwrap();

        bridge.evaluate(r#"Arcadia.DeviceStore.Write("vault", "secret");"#);
        wait_until("seed write", || {
            fake.entries.lock().unwrap().contains_key("vault")
        });

        fake.deny.store(true, Ordering::SeqCst);
        bridge.evaluate(
            r#"(() => {
                const write = Arcadia.DeviceStore.Write("vault", "again");
                const read = Arcadia.DeviceStore.Read("vault");
                const del = Arcadia.DeviceStore.Delete("vault");
                Arcadia.MemoryStore.Write("denied-signals", [write, typeof read, del].join(","));
            })();"#,
        );
        wait_until("denied signals", || {
            memory.read("denied-signals").as_deref() == Some("false,undefined,false")
        });
        fake.deny.store(false, Ordering::SeqCst);
        assert_eq!(
            fake.entries.lock().unwrap().get("vault").map(String::as_str),
            Some("secret")
        );
    }
}
