//! Promises
//!
//! A promise settles at most once. Reactions registered with [`then`]
//! before settlement are queued; settlement schedules them as engine
//! microtasks in registration order (first-settled-first-reacted per
//! promise, no ordering imposed across promises). Reactions registered
//! after settlement are scheduled immediately. Either way a reaction runs
//! asynchronously, never inside `resolve`/`reject`.
//!
//! [`then`]: PromiseRef::then

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use crate::context::WeakContext;
use crate::engine::Engine;
use crate::value::Value;

/// A fulfillment/rejection handler pair
struct Reaction {
    on_fulfilled: Box<dyn FnOnce(&Engine, Value)>,
    on_rejected: Box<dyn FnOnce(&Engine, Value)>,
}

enum PromiseState {
    Pending(Vec<Reaction>),
    Fulfilled(Value),
    Rejected(Value),
}

/// Promise heap data
pub struct JSPromise {
    /// Owning context
    ctx: WeakContext,
    state: PromiseState,
}

/// Handle to a promise
#[derive(Clone)]
pub struct PromiseRef(Rc<RefCell<JSPromise>>);

impl PromiseRef {
    /// Create a pending promise owned by `ctx`
    pub(crate) fn new(ctx: WeakContext) -> Self {
        PromiseRef(Rc::new(RefCell::new(JSPromise {
            ctx,
            state: PromiseState::Pending(Vec::new()),
        })))
    }

    /// The owning context
    pub(crate) fn context(&self) -> WeakContext {
        self.0.borrow().ctx.clone()
    }

    /// Register a reaction pair
    ///
    /// Exactly one of the two handlers will eventually run, as a
    /// microtask, with a clone of the settlement value.
    pub fn then(
        &self,
        engine: &Engine,
        on_fulfilled: impl FnOnce(&Engine, Value) + 'static,
        on_rejected: impl FnOnce(&Engine, Value) + 'static,
    ) {
        let mut promise = self.0.borrow_mut();
        match &mut promise.state {
            PromiseState::Pending(reactions) => {
                reactions.push(Reaction {
                    on_fulfilled: Box::new(on_fulfilled),
                    on_rejected: Box::new(on_rejected),
                });
            }
            PromiseState::Fulfilled(value) => {
                let value = value.clone();
                drop(promise);
                engine.enqueue_microtask(move |engine| on_fulfilled(engine, value));
            }
            PromiseState::Rejected(reason) => {
                let reason = reason.clone();
                drop(promise);
                engine.enqueue_microtask(move |engine| on_rejected(engine, reason));
            }
        }
    }

    /// Fulfill the promise. No effect if already settled.
    pub fn resolve(&self, engine: &Engine, value: Value) {
        self.settle(engine, value, true);
    }

    /// Reject the promise. No effect if already settled.
    pub fn reject(&self, engine: &Engine, reason: Value) {
        self.settle(engine, reason, false);
    }

    fn settle(&self, engine: &Engine, value: Value, fulfilled: bool) {
        let mut promise = self.0.borrow_mut();
        let reactions = match &mut promise.state {
            PromiseState::Pending(reactions) => mem::take(reactions),
            _ => return,
        };
        promise.state = if fulfilled {
            PromiseState::Fulfilled(value.clone())
        } else {
            PromiseState::Rejected(value.clone())
        };
        drop(promise);

        for reaction in reactions {
            let value = value.clone();
            if fulfilled {
                engine.enqueue_microtask(move |engine| (reaction.on_fulfilled)(engine, value));
            } else {
                engine.enqueue_microtask(move |engine| (reaction.on_rejected)(engine, value));
            }
        }
    }

    /// Check if the promise is still pending
    pub fn is_pending(&self) -> bool {
        matches!(self.0.borrow().state, PromiseState::Pending(_))
    }

    /// The fulfillment value, if fulfilled
    pub fn fulfilled_value(&self) -> Option<Value> {
        match &self.0.borrow().state {
            PromiseState::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// The rejection reason, if rejected
    pub fn rejection_reason(&self) -> Option<Value> {
        match &self.0.borrow().state {
            PromiseState::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Check handle identity
    #[inline]
    pub fn ptr_eq(&self, other: &PromiseRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settles_once() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let promise = ctx.new_promise();

        assert!(promise.is_pending());
        promise.resolve(&engine, Value::Int(1));
        promise.resolve(&engine, Value::Int(2));
        promise.reject(&engine, Value::Int(3));

        assert_eq!(promise.fulfilled_value(), Some(Value::Int(1)));
        assert_eq!(promise.rejection_reason(), None);
    }

    #[test]
    fn test_reaction_runs_as_microtask() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let promise = ctx.new_promise();

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        promise.then(
            &engine,
            move |_, value| *sink.borrow_mut() = Some(value),
            |_, _| panic!("unexpected rejection"),
        );

        promise.resolve(&engine, Value::Int(42));
        // Not yet: settlement only schedules.
        assert!(seen.borrow().is_none());

        engine.run_microtasks();
        assert_eq!(*seen.borrow(), Some(Value::Int(42)));
    }

    #[test]
    fn test_then_after_settlement() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let promise = ctx.new_promise();
        promise.reject(&engine, Value::Int(-1));
        engine.run_microtasks();

        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        promise.then(
            &engine,
            |_, _| panic!("unexpected fulfillment"),
            move |_, reason| *sink.borrow_mut() = Some(reason),
        );
        engine.run_microtasks();
        assert_eq!(*seen.borrow(), Some(Value::Int(-1)));
    }

    #[test]
    fn test_reactions_fifo_per_promise() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let promise = ctx.new_promise();

        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let sink = Rc::clone(&order);
            promise.then(
                &engine,
                move |_, _| sink.borrow_mut().push(i),
                |_, _| {},
            );
        }

        promise.resolve(&engine, Value::Undefined);
        engine.run_microtasks();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
