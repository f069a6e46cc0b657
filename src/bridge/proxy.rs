//! API object proxier
//!
//! Walks an API object property by property and builds its mirror in the
//! destination context. Integer-like keys are normalized to their decimal
//! string form, functions become registered proxies, nested plain objects
//! recurse, and everything else goes through the value marshaller. A
//! source whose keys can no longer be enumerated yields an empty proxy
//! rather than a partial one.

use std::rc::Rc;

use super::marshal::{make_function_proxy, pass_value_to_other_context};
use super::store::FrameStore;
use crate::context::Context;
use crate::engine::Engine;
use crate::runtime::object::ObjectRef;
use crate::value::Value;

/// Build a destination-context mirror of `api`
pub fn create_proxy_for_api(
    engine: &Engine,
    api: &ObjectRef,
    source: &Context,
    destination: &Context,
    store: &Rc<FrameStore>,
) -> ObjectRef {
    let proxy = destination.new_object();

    let Some(keys) = api.own_keys() else {
        return proxy;
    };

    for key in keys {
        let Some(value) = api.get(&key) else {
            continue;
        };
        match &value {
            Value::Function(func) => {
                let mirrored = make_function_proxy(engine, func, source, destination, store);
                proxy.set(&key, Value::Function(mirrored));
            }
            Value::Object(nested) => {
                let mirrored = create_proxy_for_api(engine, nested, source, destination, store);
                proxy.set(&key, Value::Object(mirrored));
            }
            _ => {
                let mirrored =
                    pass_value_to_other_context(engine, source, destination, &value, store);
                proxy.set(&key, mirrored);
            }
        }
    }

    proxy
}
