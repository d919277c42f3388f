//! Script-visible namespace registration.
//!
//! Installs the bridge namespace on the script global and attaches each
//! store backend as a named object carrying three native static functions
//! (`Read`, `Write`, `Delete`). Registration is idempotent: an existing
//! namespace object is reused, never replaced, so installing twice cannot
//! duplicate or corrupt it.
//!
//! The native functions reach their backend through a `v8::External`
//! pointing at a `BackendSlot`. The worker owns the `BindingState` for the
//! isolate's whole lifetime, which is what makes that pointer sound.

use std::sync::Arc;

use deno_core::v8;

use crate::marshal;
use crate::store::KeyValueStore;

/// One registered backend: its script-visible class name and the store
/// behind it. Boxed by `BindingState` so its address is stable.
pub(crate) struct BackendSlot {
    name: &'static str,
    store: Arc<dyn KeyValueStore>,
}

/// Owner of every `BackendSlot` referenced from script functions.
///
/// Must outlive all script execution in the isolate; the worker keeps it
/// alive until its command loop exits.
pub(crate) struct BindingState {
    slots: Vec<Box<BackendSlot>>,
}

impl BindingState {
    pub(crate) fn new(backends: Vec<(&'static str, Arc<dyn KeyValueStore>)>) -> Self {
        Self {
            slots: backends
                .into_iter()
                .map(|(name, store)| Box::new(BackendSlot { name, store }))
                .collect(),
        }
    }
}

/// Ensure `namespace` exists on the script global (check-then-create) and
/// attach every backend under it.
pub(crate) fn install_namespace(
    scope: &mut v8::HandleScope,
    namespace: &str,
    state: &BindingState,
) {
    let context = scope.get_current_context();
    let global = context.global(scope);

    let Some(ns_key) = v8::String::new(scope, namespace) else {
        return;
    };
    let existing = global
        .get(scope, ns_key.into())
        .and_then(|value| v8::Local::<v8::Object>::try_from(value).ok());
    let ns_obj = match existing {
        Some(namespace_obj) => namespace_obj,
        None => {
            let fresh = v8::Object::new(scope);
            global.set(scope, ns_key.into(), fresh.into());
            fresh
        }
    };

    for slot in &state.slots {
        attach_backend(scope, ns_obj, slot);
    }
}

fn attach_backend(scope: &mut v8::HandleScope, ns_obj: v8::Local<v8::Object>, slot: &BackendSlot) {
    let Some(class_key) = v8::String::new(scope, slot.name) else {
        return;
    };
    let class_obj = v8::Object::new(scope);
    let data = v8::External::new(
        scope,
        slot as *const BackendSlot as *mut std::ffi::c_void,
    );

    let ops = [
        ("Read", v8::Function::builder(js_read)),
        ("Write", v8::Function::builder(js_write)),
        ("Delete", v8::Function::builder(js_delete)),
    ];
    for (name, builder) in ops {
        let Some(key) = v8::String::new(scope, name) else {
            continue;
        };
        let Some(func) = builder.data(data.into()).build(scope) else {
            continue;
        };
        class_obj.set(scope, key.into(), func.into());
    }

    ns_obj.set(scope, class_key.into(), class_obj.into());
}

/// Recover the backend slot a function was bound with.
///
/// SAFETY: the `External` was created in `attach_backend` from a slot boxed
/// inside a `BindingState`, and the worker keeps that state alive for the
/// isolate's lifetime, so the pointer is valid whenever script can call us.
unsafe fn slot_from_data<'s>(data: v8::Local<'s, v8::Value>) -> Option<&'s BackendSlot> {
    let external = v8::Local::<v8::External>::try_from(data).ok()?;
    Some(unsafe { &*(external.value() as *const BackendSlot) })
}

fn js_read(
    scope: &mut v8::HandleScope,
    args: v8::FunctionCallbackArguments,
    mut rv: v8::ReturnValue,
) {
    let Some(slot) = (unsafe { slot_from_data(args.data()) }) else {
        return;
    };
    rv.set_undefined();
    let Some([key]) = marshal::string_args::<1>(scope, &args, slot.name, "Read") else {
        return;
    };
    if let Some(value) = slot.store.read(&key) {
        rv.set(marshal::to_script_string(scope, &value));
    }
}

fn js_write(
    scope: &mut v8::HandleScope,
    args: v8::FunctionCallbackArguments,
    mut rv: v8::ReturnValue,
) {
    let Some(slot) = (unsafe { slot_from_data(args.data()) }) else {
        return;
    };
    rv.set(marshal::to_script_bool(scope, false));
    let Some([key, value]) = marshal::string_args::<2>(scope, &args, slot.name, "Write") else {
        return;
    };
    let existed = slot.store.write(&key, &value);
    rv.set(marshal::to_script_bool(scope, existed));
}

fn js_delete(
    scope: &mut v8::HandleScope,
    args: v8::FunctionCallbackArguments,
    mut rv: v8::ReturnValue,
) {
    let Some(slot) = (unsafe { slot_from_data(args.data()) }) else {
        return;
    };
    rv.set(marshal::to_script_bool(scope, false));
    let Some([key]) = marshal::string_args::<1>(scope, &args, slot.name, "Delete") else {
        return;
    };
    let existed = slot.store.delete(&key);
    rv.set(marshal::to_script_bool(scope, existed));
}
