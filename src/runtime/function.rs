//! Function values
//!
//! Every callable in this heap is a native function: a boxed Rust closure
//! with an owning context and an optional name. Invocation goes through
//! [`Engine::call`](crate::engine::Engine::call), which enters the target
//! context scope first; the closure runs synchronously on the same stack.
//!
//! A call completes as `Ok(value)` or as `Err(thrown)` where the thrown
//! value is itself a [`Value`] (usually an error, but anything can be
//! thrown). This is the exception-capture primitive the bridge's invoker
//! wraps its try/catch semantics around.

use std::rc::Rc;

use crate::context::WeakContext;
use crate::engine::Engine;
use crate::value::Value;

/// Outcome of a call: normal completion or a thrown value
pub type Completion = Result<Value, Value>;

/// Native callable signature
pub type NativeFn = dyn Fn(&Engine, &[Value]) -> Completion;

/// Function heap data
pub struct FunctionData {
    /// Owning context
    ctx: WeakContext,
    /// Function name, if any (for diagnostics and Display)
    name: Option<String>,
    /// The callable body
    callable: Box<NativeFn>,
}

/// Handle to a function value
#[derive(Clone)]
pub struct FunctionRef(Rc<FunctionData>);

impl FunctionRef {
    pub(crate) fn new(
        ctx: WeakContext,
        name: Option<String>,
        callable: impl Fn(&Engine, &[Value]) -> Completion + 'static,
    ) -> Self {
        FunctionRef(Rc::new(FunctionData {
            ctx,
            name,
            callable: Box::new(callable),
        }))
    }

    /// The function name, if one was given
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// The owning context
    pub(crate) fn context(&self) -> WeakContext {
        self.0.ctx.clone()
    }

    /// Run the callable. Engine-internal; use `Engine::call`, which sets up
    /// the context scope this body observes.
    pub(crate) fn invoke(&self, engine: &Engine, args: &[Value]) -> Completion {
        (self.0.callable)(engine, args)
    }

    /// The backing allocation, for lifetime monitoring
    pub(crate) fn as_rc(&self) -> &Rc<FunctionData> {
        &self.0
    }

    /// Check handle identity
    #[inline]
    pub fn ptr_eq(&self, other: &FunctionRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_passes_args() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");

        let sum = ctx.new_function("sum", |_, args| {
            let total: i32 = args.iter().filter_map(Value::to_i32).sum();
            Ok(Value::Int(total))
        });

        let result = engine
            .call(&ctx, &sum, &[Value::Int(1), Value::Int(2), Value::Int(3)])
            .unwrap();
        assert_eq!(result, Value::Int(6));
        assert_eq!(sum.name(), Some("sum"));
    }

    #[test]
    fn test_identity_is_per_handle() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");

        let f = ctx.new_function("f", |_, _| Ok(Value::Undefined));
        let g = ctx.new_function("f", |_, _| Ok(Value::Undefined));
        assert!(f.ptr_eq(&f.clone()));
        assert!(!f.ptr_eq(&g));
    }
}
