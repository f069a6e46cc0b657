//! The value marshaller
//!
//! [`pass_value_to_other_context`] is the single recursive primitive the
//! rest of the bridge is built on: given a value usable in one context, it
//! produces a semantically equivalent value usable in another, without ever
//! handing either context a raw reference into the other.
//!
//! Dispatch order matters and is first-match-wins: functions, promises,
//! errors, arrays, objects, null/undefined, then plain data. Arrays in
//! particular must be walked element-wise so that an array of functions or
//! promises gets each element proxied rather than the whole array treated
//! as an opaque object.

use std::rc::Rc;

use super::invoker::invoke_proxied;
use super::monitor::FunctionLifeMonitor;
use super::proxy::create_proxy_for_api;
use super::store::FrameStore;
use crate::context::Context;
use crate::engine::Engine;
use crate::runtime::function::FunctionRef;
use crate::value::{PlainValue, Value};

/// Marshal `value` from `source` into `destination`
///
/// Side effects: function values add an entry to `store` (with a lifetime
/// monitor on the returned proxy); promise values schedule settlement
/// reactions. Nothing else is mutated.
pub fn pass_value_to_other_context(
    engine: &Engine,
    source: &Context,
    destination: &Context,
    value: &Value,
    store: &Rc<FrameStore>,
) -> Value {
    // Proxy functions and monitor their lifetime in the new context so the
    // store entry is released at the right time.
    if let Value::Function(func) = value {
        let proxy = make_function_proxy(engine, func, source, destination, store);
        return Value::Function(proxy);
    }

    // Proxy promises: return a fresh pending promise in the destination
    // immediately and settle it from the source promise's reactions.
    if let Value::Promise(source_promise) = value {
        let proxied = destination.new_promise();

        // Each proxied promise gets its own pair of settlement closures, so
        // two promises marshalled back-to-back can never cross wires. The
        // store is captured weakly, like the function-proxy path: frame
        // teardown drops it, and a settlement arriving after that leaves
        // the proxied promise pending instead of reviving the registry.
        // Reactions marshal inside the source context's scope.
        let on_fulfilled = {
            let source = source.clone();
            let destination = destination.clone();
            let store = Rc::downgrade(store);
            let proxied = proxied.clone();
            move |engine: &Engine, result: Value| {
                let Some(store) = store.upgrade() else {
                    return;
                };
                let _scope = engine.enter(&source);
                let value =
                    pass_value_to_other_context(engine, &source, &destination, &result, &store);
                proxied.resolve(engine, value);
            }
        };
        let on_rejected = {
            let source = source.clone();
            let destination = destination.clone();
            let store = Rc::downgrade(store);
            let proxied = proxied.clone();
            move |engine: &Engine, reason: Value| {
                let Some(store) = store.upgrade() else {
                    return;
                };
                let _scope = engine.enter(&source);
                let value =
                    pass_value_to_other_context(engine, &source, &destination, &reason, &store);
                proxied.reject(engine, value);
            }
        };
        source_promise.then(engine, on_fulfilled, on_rejected);

        return Value::Promise(proxied);
    }

    // Errors aren't transferable as-is: pull the message out and rebuild a
    // fresh error in the destination. Stack and subclass identity are lost
    // deliberately.
    if let Value::Error(error) = value {
        return destination.new_error(error.message());
    }

    // Walk arrays manually and marshal each element positionally.
    if let Value::Array(array) = value {
        let cloned = destination.new_array(array.len());
        for i in 0..array.len() {
            let element = array.get(i).unwrap_or_default();
            cloned.set(
                i,
                pass_value_to_other_context(engine, source, destination, &element, store),
            );
        }
        return Value::Array(cloned);
    }

    // Plain objects get the full mirroring treatment.
    if let Value::Object(object) = value {
        let proxy = create_proxy_for_api(engine, object, source, destination, store);
        return Value::Object(proxy);
    }

    // Null and undefined belong to the destination, not the source.
    if value.is_null() {
        return Value::Null;
    }
    if value.is_undefined() {
        return Value::Undefined;
    }

    // Plain data goes through the engine-independent representation. A
    // value that cannot convert degrades to the destination's null; this
    // is the documented permissive fallback, not an error.
    match PlainValue::from_value(value) {
        Some(plain) => plain.into_value(destination),
        None => Value::Null,
    }
}

/// Register `func` in the store and build its destination-side proxy
///
/// The proxy carries exactly one piece of identity: its store id. The
/// store itself is captured weakly, so a proxy that outlives its frame
/// throws instead of touching freed state.
pub(crate) fn make_function_proxy(
    engine: &Engine,
    func: &FunctionRef,
    source: &Context,
    destination: &Context,
    store: &Rc<FrameStore>,
) -> FunctionRef {
    let func_id = store.take_id();
    store.insert(func_id, func.clone(), source.clone());

    let weak_store = Rc::downgrade(store);
    let name = func.name().unwrap_or("").to_owned();
    let proxy = destination.new_function(&name, move |engine, args| {
        match weak_store.upgrade() {
            Some(store) => invoke_proxied(engine, &store, func_id, args),
            None => {
                let message = "function proxy was invoked after its frame was destroyed";
                Err(engine
                    .current_context()
                    .map(|ctx| ctx.new_error(message))
                    .unwrap_or(Value::Undefined))
            }
        }
    });
    FunctionLifeMonitor::bind_to(engine, &proxy, store, func_id);
    proxy
}
