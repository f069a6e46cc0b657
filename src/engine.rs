//! Engine: the single-threaded host for all contexts
//!
//! The engine models the slice of a script engine the bridge consumes:
//! context creation, a context-scope stack (the "current context" during a
//! call), synchronous function invocation with exception capture, a FIFO
//! microtask queue for promise settlement, and a weak-reference+finalizer
//! registry for lifetime monitoring.
//!
//! Everything runs on one thread; the handle is `Rc`-backed and deliberately
//! `!Send`, so confinement of all shared state to the owning thread is
//! enforced by the type system rather than by locks.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::context::Context;
use crate::gc::MonitorTable;
use crate::runtime::function::{Completion, FunctionRef};
use crate::value::Value;

/// A queued microtask
type Microtask = Box<dyn FnOnce(&Engine)>;

struct EngineState {
    /// Monotonic context id counter
    next_context_id: u32,
    /// Context-scope stack; the top is the current context
    scopes: Vec<Context>,
    /// Pending microtasks, FIFO
    microtasks: VecDeque<Microtask>,
    /// Weak-reference + finalizer registry
    monitors: MonitorTable,
}

/// Handle to the engine
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct Engine {
    state: Rc<RefCell<EngineState>>,
}

impl Engine {
    /// Create a new engine with no contexts
    pub fn new() -> Self {
        Engine {
            state: Rc::new(RefCell::new(EngineState {
                next_context_id: 0,
                scopes: Vec::new(),
                microtasks: VecDeque::new(),
                monitors: MonitorTable::new(),
            })),
        }
    }

    /// Create a fresh context with a debug name
    pub fn new_context(&self, name: &str) -> Context {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_context_id;
            state.next_context_id += 1;
            id
        };
        Context::new(id, name)
    }

    /// Enter a context scope
    ///
    /// While the returned guard is live, `context` is the current context.
    /// Scopes nest; dropping the guard restores the previous one.
    pub fn enter(&self, context: &Context) -> ContextScope<'_> {
        self.state.borrow_mut().scopes.push(context.clone());
        ContextScope { engine: self }
    }

    /// The context at the top of the scope stack, if any
    pub fn current_context(&self) -> Option<Context> {
        self.state.borrow().scopes.last().cloned()
    }

    /// Call a function inside `context`
    ///
    /// This is fully synchronous: the callable runs on the current stack
    /// with `context` entered, and a thrown value comes back as `Err`.
    pub fn call(&self, context: &Context, func: &FunctionRef, args: &[Value]) -> Completion {
        let _scope = self.enter(context);
        func.invoke(self, args)
    }

    /// Queue a microtask
    pub fn enqueue_microtask(&self, task: impl FnOnce(&Engine) + 'static) {
        self.state.borrow_mut().microtasks.push_back(Box::new(task));
    }

    /// Drain the microtask queue
    ///
    /// Tasks scheduled while draining run in the same pass, in FIFO order.
    pub fn run_microtasks(&self) {
        loop {
            let task = self.state.borrow_mut().microtasks.pop_front();
            match task {
                Some(task) => task(self),
                None => break,
            }
        }
    }

    /// Attach a lifetime monitor to a heap allocation
    ///
    /// `on_collect` runs exactly once, during the first collection cycle
    /// after the target's last strong reference is gone.
    pub fn attach_monitor<T: 'static>(
        &self,
        target: &Rc<T>,
        on_collect: impl FnOnce() + 'static,
    ) {
        self.state.borrow_mut().monitors.attach(target, on_collect);
    }

    /// Run a collection cycle
    ///
    /// In this reference-counted heap, memory itself is reclaimed as soon
    /// as the last handle drops; the collection cycle exists to deliver
    /// pending finalizer callbacks, like a deferred-finalization GC.
    /// Returns the number of monitors that fired.
    pub fn collect_garbage(&self) -> usize {
        let finalizers = self.state.borrow_mut().monitors.sweep();
        let count = finalizers.len();
        for finalizer in finalizers {
            finalizer();
        }
        if count > 0 {
            tracing::debug!(count, "lifetime monitors fired");
        }
        count
    }

    /// Number of live (not yet fired) lifetime monitors
    pub fn pending_monitors(&self) -> usize {
        self.state.borrow().monitors.len()
    }

    /// Number of queued microtasks
    pub fn pending_microtasks(&self) -> usize {
        self.state.borrow().microtasks.len()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

/// RAII guard for a context scope
pub struct ContextScope<'e> {
    engine: &'e Engine,
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        self.engine.state.borrow_mut().scopes.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_stack() {
        let engine = Engine::new();
        let a = engine.new_context("a");
        let b = engine.new_context("b");

        assert!(engine.current_context().is_none());
        {
            let _outer = engine.enter(&a);
            assert!(engine.current_context().unwrap().ptr_eq(&a));
            {
                let _inner = engine.enter(&b);
                assert!(engine.current_context().unwrap().ptr_eq(&b));
            }
            assert!(engine.current_context().unwrap().ptr_eq(&a));
        }
        assert!(engine.current_context().is_none());
    }

    #[test]
    fn test_call_enters_context() {
        let engine = Engine::new();
        let ctx = engine.new_context("callee");

        let expected = ctx.clone();
        let func = ctx.new_function("whereami", move |engine, _| {
            let current = engine.current_context().unwrap();
            Ok(Value::Bool(current.ptr_eq(&expected)))
        });

        let result = engine.call(&ctx, &func, &[]).unwrap();
        assert_eq!(result, Value::Bool(true));
    }

    #[test]
    fn test_call_captures_thrown_value() {
        let engine = Engine::new();
        let ctx = engine.new_context("thrower");

        let func = ctx.new_function("boom", |_, _| Err(Value::Int(13)));
        let thrown = engine.call(&ctx, &func, &[]).unwrap_err();
        assert_eq!(thrown, Value::Int(13));
    }

    #[test]
    fn test_microtasks_run_fifo_including_nested() {
        let engine = Engine::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        engine.enqueue_microtask(move |engine| {
            o1.borrow_mut().push(1);
            let o3 = Rc::clone(&o1);
            engine.enqueue_microtask(move |_| o3.borrow_mut().push(3));
        });
        engine.enqueue_microtask(move |_| o2.borrow_mut().push(2));

        engine.run_microtasks();
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
        assert_eq!(engine.pending_microtasks(), 0);
    }

    #[test]
    fn test_monitor_fires_once_after_drop() {
        let engine = Engine::new();
        let fired = Rc::new(RefCell::new(0));

        let target = Rc::new(17u32);
        let counter = Rc::clone(&fired);
        engine.attach_monitor(&target, move || *counter.borrow_mut() += 1);

        assert_eq!(engine.collect_garbage(), 0);
        assert_eq!(*fired.borrow(), 0);

        drop(target);
        assert_eq!(engine.collect_garbage(), 1);
        assert_eq!(*fired.borrow(), 1);

        // Gone from the registry: never fires again.
        assert_eq!(engine.collect_garbage(), 0);
        assert_eq!(*fired.borrow(), 1);
    }
}
