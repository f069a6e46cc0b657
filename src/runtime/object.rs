//! Object representation
//!
//! Plain objects store their own enumerable properties in insertion order,
//! with a per-property writable bit and an object-level frozen bit. A write
//! that the object refuses (frozen object, read-only property) is a silent
//! no-op reported as `false`, matching non-strict assignment semantics.
//!
//! This module also holds the two small heap types that ride along with
//! objects: native errors (a printable message, nothing more) and externals
//! (opaque host handles with no cross-context representation).

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::WeakContext;
use crate::value::{OpaqueHandle, Value};

/// A property in an object's property list
#[derive(Clone)]
pub struct Property {
    /// Property key; integer-like keys are stored in their decimal form
    pub key: String,
    /// Property value
    pub value: Value,
    /// Cleared for read-only, non-configurable properties
    pub writable: bool,
}

/// Plain object heap data
pub struct JSObject {
    /// Owning context
    ctx: WeakContext,
    /// Own enumerable properties, insertion-ordered
    props: Vec<Property>,
    /// Set once by freeze(); never cleared
    frozen: bool,
}

/// Handle to a plain object
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<JSObject>>);

impl ObjectRef {
    /// Create an empty object owned by `ctx`
    pub(crate) fn new(ctx: WeakContext) -> Self {
        ObjectRef(Rc::new(RefCell::new(JSObject {
            ctx,
            props: Vec::new(),
            frozen: false,
        })))
    }

    /// The owning context
    pub(crate) fn context(&self) -> WeakContext {
        self.0.borrow().ctx.clone()
    }

    /// Get a property value by key
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .props
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.clone())
    }

    /// Check for an own property
    pub fn has(&self, key: &str) -> bool {
        self.0.borrow().props.iter().any(|p| p.key == key)
    }

    /// Set or add a property
    ///
    /// Returns false (and changes nothing) if the object is frozen or the
    /// property is read-only.
    pub fn set(&self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        let mut obj = self.0.borrow_mut();
        if obj.frozen {
            return false;
        }
        if let Some(prop) = obj.props.iter_mut().find(|p| p.key == key) {
            if !prop.writable {
                return false;
            }
            prop.value = value;
        } else {
            obj.props.push(Property {
                key,
                value,
                writable: true,
            });
        }
        true
    }

    /// Set a property under an integer-like key
    ///
    /// Integer keys are interoperable with their string form as object
    /// keys, so they are normalized to decimal strings at the door.
    pub fn set_index(&self, index: u32, value: Value) -> bool {
        self.set(index.to_string(), value)
    }

    /// Install a read-only, non-configurable property
    ///
    /// Overwrites an existing writable property under the same key.
    /// Returns false only if the object is frozen.
    pub fn define_read_only(&self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        let mut obj = self.0.borrow_mut();
        if obj.frozen {
            return false;
        }
        if let Some(prop) = obj.props.iter_mut().find(|p| p.key == key) {
            if !prop.writable {
                return false;
            }
            prop.value = value;
            prop.writable = false;
        } else {
            obj.props.push(Property {
                key,
                value,
                writable: false,
            });
        }
        true
    }

    /// Delete a property
    ///
    /// Returns false if the object is frozen or the property is
    /// non-configurable; deleting an absent key succeeds vacuously.
    pub fn delete(&self, key: &str) -> bool {
        let mut obj = self.0.borrow_mut();
        if obj.frozen {
            return false;
        }
        match obj.props.iter().position(|p| p.key == key) {
            Some(idx) => {
                if !obj.props[idx].writable {
                    return false;
                }
                obj.props.remove(idx);
                true
            }
            None => true,
        }
    }

    /// Enumerate own property keys in insertion order
    ///
    /// Fails (None) when the owning context has been destroyed; callers
    /// that mirror objects degrade to an empty mirror in that case.
    pub fn own_keys(&self) -> Option<Vec<String>> {
        let obj = self.0.borrow();
        if !obj.ctx.is_alive() {
            return None;
        }
        Some(obj.props.iter().map(|p| p.key.clone()).collect())
    }

    /// Number of own properties
    pub fn len(&self) -> usize {
        self.0.borrow().props.len()
    }

    /// Check if the object has no properties
    pub fn is_empty(&self) -> bool {
        self.0.borrow().props.is_empty()
    }

    /// Freeze this object (shallow)
    ///
    /// No property addition, deletion, reconfiguration, or assignment from
    /// now on. Freezing is one-way.
    pub fn freeze(&self) {
        let mut obj = self.0.borrow_mut();
        obj.frozen = true;
        for prop in &mut obj.props {
            prop.writable = false;
        }
    }

    /// Check the frozen bit
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.0.borrow().frozen
    }

    /// Check handle identity
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Native error heap data
pub struct ErrorData {
    ctx: WeakContext,
    message: String,
}

/// Handle to a native error value
#[derive(Clone)]
pub struct ErrorRef(Rc<ErrorData>);

impl ErrorRef {
    pub(crate) fn new(ctx: WeakContext, message: impl Into<String>) -> Self {
        ErrorRef(Rc::new(ErrorData {
            ctx,
            message: message.into(),
        }))
    }

    /// The printable message
    #[inline]
    pub fn message(&self) -> &str {
        &self.0.message
    }

    /// The owning context
    pub(crate) fn context(&self) -> WeakContext {
        self.0.ctx.clone()
    }

    /// Check handle identity
    #[inline]
    pub fn ptr_eq(&self, other: &ErrorRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Opaque host data attached to a context
pub struct ExternalData {
    ctx: WeakContext,
    opaque: OpaqueHandle,
}

/// Handle to an external value
#[derive(Clone)]
pub struct ExternalRef(Rc<ExternalData>);

impl ExternalRef {
    pub(crate) fn new(ctx: WeakContext, opaque: OpaqueHandle) -> Self {
        ExternalRef(Rc::new(ExternalData { ctx, opaque }))
    }

    /// The opaque payload
    pub fn opaque(&self) -> &OpaqueHandle {
        &self.0.opaque
    }

    /// The owning context
    pub(crate) fn context(&self) -> WeakContext {
        self.0.ctx.clone()
    }

    /// Check handle identity
    #[inline]
    pub fn ptr_eq(&self, other: &ExternalRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
