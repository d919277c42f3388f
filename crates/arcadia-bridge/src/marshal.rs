//! Script ↔ native value conversion.
//!
//! Conversions never raise across the runtime boundary: `to_native_*`
//! signal a type mismatch with `None`, and every call site aborts its
//! operation on `None` instead of using a partial value. Type checks run
//! before any V8 coercion, so a failed conversion leaves no pending
//! exception behind.

use deno_core::v8;

/// Native string from a script value, `None` unless the value is a string.
pub fn to_native_string(
    scope: &mut v8::HandleScope,
    value: v8::Local<v8::Value>,
) -> Option<String> {
    if !value.is_string() {
        return None;
    }
    Some(value.to_rust_string_lossy(scope))
}

/// Native bool from a script value, `None` unless the value is a boolean.
/// No truthiness coercion: only `true`/`false` convert.
pub fn to_native_bool(value: v8::Local<v8::Value>) -> Option<bool> {
    if value.is_true() {
        Some(true)
    } else if value.is_false() {
        Some(false)
    } else {
        None
    }
}

/// Script string from a native string. Strings beyond V8's length cap
/// degrade to the empty string rather than failing the call.
pub fn to_script_string<'s>(
    scope: &mut v8::HandleScope<'s>,
    value: &str,
) -> v8::Local<'s, v8::Value> {
    v8::String::new(scope, value)
        .map(Into::into)
        .unwrap_or_else(|| v8::String::empty(scope).into())
}

/// Script boolean from a native bool.
pub fn to_script_bool<'s>(scope: &mut v8::HandleScope<'s>, value: bool) -> v8::Local<'s, v8::Value> {
    v8::Boolean::new(scope, value).into()
}

/// Validate arity and convert every positional argument to a string.
///
/// Returns `None` — after logging the operation name and the expected
/// arity — if the argument count differs from `N` or any argument is not
/// a string. Callers return their failure sentinel without mutating.
pub fn string_args<const N: usize>(
    scope: &mut v8::HandleScope,
    args: &v8::FunctionCallbackArguments,
    class: &str,
    op: &str,
) -> Option<[String; N]> {
    let argc = args.length() as usize;
    if argc != N {
        tracing::warn!("{class}.{op}: wrong number of arguments: {argc}, was expecting {N}");
        return None;
    }
    let mut converted = Vec::with_capacity(N);
    for index in 0..N {
        match to_native_string(scope, args.get(index as i32)) {
            Some(value) => converted.push(value),
            None => {
                tracing::warn!("{class}.{op}: argument {index} is not a string");
                return None;
            }
        }
    }
    converted.try_into().ok()
}
