//! Recursive freezing of exposed object graphs
//!
//! Once an API proxy is installed on the other side it must not be
//! tamperable: every object and array reachable from the root is frozen,
//! children first, so a consumer cannot swap a method out from under the
//! code that trusts it.

use crate::runtime::array::ArrayRef;
use crate::runtime::object::ObjectRef;
use crate::value::Value;

/// Freeze `object` and every object or array reachable from it
pub fn deep_freeze(object: &ObjectRef) {
    if object.is_frozen() {
        return;
    }
    // Mark before descending so self-referential graphs terminate.
    object.freeze();
    for key in object.own_keys().unwrap_or_default() {
        if let Some(value) = object.get(&key) {
            deep_freeze_value(&value);
        }
    }
}

fn deep_freeze_array(array: &ArrayRef) {
    if array.is_frozen() {
        return;
    }
    array.freeze();
    for i in 0..array.len() {
        if let Some(value) = array.get(i) {
            deep_freeze_value(&value);
        }
    }
}

fn deep_freeze_value(value: &Value) {
    match value {
        Value::Object(object) => deep_freeze(object),
        Value::Array(array) => deep_freeze_array(array),
        _ => {}
    }
}
