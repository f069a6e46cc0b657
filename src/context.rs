//! Execution contexts
//!
//! A `Context` is an isolated execution environment: it has its own global
//! object and its own notion of value ownership. Values are never shared
//! implicitly across contexts; moving a value from one context to another
//! is exactly what the bridge modules exist for.
//!
//! Contexts are created by the [`Engine`](crate::engine::Engine) and killed
//! by host frame destruction. A dead context keeps its allocations valid
//! (handles may still be held elsewhere) but own-property enumeration of
//! its objects starts failing, which the proxy builder degrades gracefully.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::engine::Engine;
use crate::runtime::array::ArrayRef;
use crate::runtime::function::{Completion, FunctionRef};
use crate::runtime::object::{ErrorRef, ExternalRef, ObjectRef};
use crate::runtime::promise::PromiseRef;
use crate::value::{JSString, OpaqueHandle, Value};

/// Per-context state
pub(crate) struct ContextData {
    /// Engine-assigned id, unique per engine
    id: u32,
    /// Debug name ("main-world", "isolated-world", ...)
    name: String,
    /// Cleared when the owning frame is destroyed
    alive: Cell<bool>,
    /// The context's global object
    global: ObjectRef,
}

/// Handle to an execution context
///
/// Cloning is cheap; all clones refer to the same context.
#[derive(Clone)]
pub struct Context(Rc<ContextData>);

impl Context {
    /// Create a new context (engine-internal)
    pub(crate) fn new(id: u32, name: &str) -> Self {
        let data = Rc::new_cyclic(|weak| {
            let global = ObjectRef::new(WeakContext(weak.clone()));
            ContextData {
                id,
                name: name.to_owned(),
                alive: Cell::new(true),
                global,
            }
        });
        Context(data)
    }

    /// Engine-assigned context id
    #[inline]
    pub fn id(&self) -> u32 {
        self.0.id
    }

    /// Debug name
    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Check whether the context is still live
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.0.alive.get()
    }

    /// Mark the context dead. Called on frame destruction, never reversed.
    pub(crate) fn kill(&self) {
        self.0.alive.set(false);
    }

    /// The context's global object
    pub fn global(&self) -> ObjectRef {
        self.0.global.clone()
    }

    /// Downgrade to a weak handle for storage inside heap values
    pub(crate) fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.0))
    }

    /// Check handle identity
    #[inline]
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // Value constructors. Each allocates in *this* context.

    /// Create an empty plain object
    pub fn new_object(&self) -> ObjectRef {
        ObjectRef::new(self.downgrade())
    }

    /// Create a dense array of `len` undefined elements
    pub fn new_array(&self, len: u32) -> ArrayRef {
        ArrayRef::with_length(self.downgrade(), len)
    }

    /// Create an array from existing values
    pub fn new_array_from(&self, values: Vec<Value>) -> ArrayRef {
        ArrayRef::from_values(self.downgrade(), values)
    }

    /// Create a string value
    pub fn new_string(&self, text: &str) -> Value {
        Value::Str(JSString::new(self.downgrade(), text))
    }

    /// Create a native error value carrying `message`
    pub fn new_error(&self, message: &str) -> Value {
        Value::Error(ErrorRef::new(self.downgrade(), message))
    }

    /// Create a native function
    ///
    /// The callable receives the engine and the argument list; it returns
    /// `Ok(value)` on normal completion or `Err(thrown)` to raise.
    pub fn new_function(
        &self,
        name: &str,
        callable: impl Fn(&Engine, &[Value]) -> Completion + 'static,
    ) -> FunctionRef {
        FunctionRef::new(self.downgrade(), Some(name.to_owned()), callable)
    }

    /// Create a pending promise
    pub fn new_promise(&self) -> PromiseRef {
        PromiseRef::new(self.downgrade())
    }

    /// Create an opaque external handle
    ///
    /// Externals are host data with no cross-context representation; the
    /// marshaller degrades them to the destination's null.
    pub fn new_external(&self, opaque: OpaqueHandle) -> Value {
        Value::External(ExternalRef::new(self.downgrade(), opaque))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Context(id={}, name={:?}, alive={})",
            self.id(),
            self.name(),
            self.is_alive()
        )
    }
}

/// Weak context handle stored inside heap values
///
/// Upgrading fails once the engine has dropped the context; a dead-but-held
/// context upgrades fine and reports `is_alive() == false`.
#[derive(Clone)]
pub struct WeakContext(pub(crate) Weak<ContextData>);

impl WeakContext {
    /// Try to recover the strong handle
    pub fn upgrade(&self) -> Option<Context> {
        self.0.upgrade().map(Context)
    }

    /// Check whether the context both exists and is live
    pub fn is_alive(&self) -> bool {
        self.0.upgrade().is_some_and(|data| data.alive.get())
    }

    /// The context id, if the context still exists
    pub fn id(&self) -> Option<u32> {
        self.0.upgrade().map(|data| data.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_identity() {
        let engine = Engine::new();
        let a = engine.new_context("a");
        let b = engine.new_context("b");

        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name(), "a");
    }

    #[test]
    fn test_kill_marks_dead() {
        let engine = Engine::new();
        let ctx = engine.new_context("doomed");
        assert!(ctx.is_alive());

        ctx.kill();
        assert!(!ctx.is_alive());
        // Allocations made before death stay valid.
        assert!(ctx.global().get("x").is_none());
    }

    #[test]
    fn test_weak_context() {
        let engine = Engine::new();
        let ctx = engine.new_context("w");
        let weak = ctx.downgrade();

        assert!(weak.is_alive());
        assert_eq!(weak.id(), Some(ctx.id()));

        ctx.kill();
        assert!(!weak.is_alive());
        // Still upgradable while a strong handle exists.
        assert!(weak.upgrade().is_some());

        drop(ctx);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_global_object_belongs_to_context() {
        let engine = Engine::new();
        let ctx = engine.new_context("g");
        let global = ctx.global();

        assert!(global.set("answer", Value::Int(42)));
        assert_eq!(ctx.global().get("answer"), Some(Value::Int(42)));
    }
}
