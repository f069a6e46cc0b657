//! Array implementation
//!
//! Arrays are dense with "no-hole" semantics: every index from 0 to
//! length-1 is defined. Setting past the end extends the array with
//! undefined elements. Like objects, arrays carry a one-way frozen bit.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::WeakContext;
use crate::value::Value;

/// Maximum array length (2^30 - 1)
pub const MAX_ARRAY_LENGTH: u32 = (1 << 30) - 1;

/// Array heap data
pub struct JSArray {
    /// Owning context
    ctx: WeakContext,
    /// Element storage; len == elements.len()
    elements: Vec<Value>,
    /// Set once by freeze(); never cleared
    frozen: bool,
}

/// Handle to an array
#[derive(Clone)]
pub struct ArrayRef(Rc<RefCell<JSArray>>);

impl ArrayRef {
    /// Create an array of `length` undefined elements
    pub(crate) fn with_length(ctx: WeakContext, length: u32) -> Self {
        let len = length.min(MAX_ARRAY_LENGTH) as usize;
        ArrayRef(Rc::new(RefCell::new(JSArray {
            ctx,
            elements: vec![Value::Undefined; len],
            frozen: false,
        })))
    }

    /// Create an array from existing values
    pub(crate) fn from_values(ctx: WeakContext, values: Vec<Value>) -> Self {
        let mut elements = values;
        elements.truncate(MAX_ARRAY_LENGTH as usize);
        ArrayRef(Rc::new(RefCell::new(JSArray {
            ctx,
            elements,
            frozen: false,
        })))
    }

    /// The owning context
    pub(crate) fn context(&self) -> WeakContext {
        self.0.borrow().ctx.clone()
    }

    /// Array length
    #[inline]
    pub fn len(&self) -> u32 {
        self.0.borrow().elements.len() as u32
    }

    /// Check if the array is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().elements.is_empty()
    }

    /// Get the element at `index`
    pub fn get(&self, index: u32) -> Option<Value> {
        self.0.borrow().elements.get(index as usize).cloned()
    }

    /// Set the element at `index`, extending with undefined if needed
    ///
    /// Returns false (and changes nothing) if the array is frozen or the
    /// index exceeds the length cap.
    pub fn set(&self, index: u32, value: Value) -> bool {
        if index >= MAX_ARRAY_LENGTH {
            return false;
        }
        let mut arr = self.0.borrow_mut();
        if arr.frozen {
            return false;
        }
        let idx = index as usize;
        if idx >= arr.elements.len() {
            arr.elements.resize(idx + 1, Value::Undefined);
        }
        arr.elements[idx] = value;
        true
    }

    /// Append an element
    pub fn push(&self, value: Value) -> bool {
        let len = self.len();
        self.set(len, value)
    }

    /// Freeze this array (shallow)
    pub fn freeze(&self) {
        self.0.borrow_mut().frozen = true;
    }

    /// Check the frozen bit
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.0.borrow().frozen
    }

    /// Check handle identity
    #[inline]
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    #[test]
    fn test_with_length_fills_undefined() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let arr = ctx.new_array(3);

        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get(0), Some(Value::Undefined));
        assert_eq!(arr.get(2), Some(Value::Undefined));
        assert_eq!(arr.get(3), None);
    }

    #[test]
    fn test_set_extends_dense() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let arr = ctx.new_array(0);

        assert!(arr.set(2, Value::Int(9)));
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get(0), Some(Value::Undefined));
        assert_eq!(arr.get(2), Some(Value::Int(9)));
    }

    #[test]
    fn test_freeze_blocks_writes() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let arr = ctx.new_array_from(vec![Value::Int(1), Value::Int(2)]);

        arr.freeze();
        assert!(!arr.set(0, Value::Int(5)));
        assert!(!arr.push(Value::Int(3)));
        assert_eq!(arr.get(0), Some(Value::Int(1)));
        assert_eq!(arr.len(), 2);
    }
}
