//! Per-frame handle store
//!
//! When a function crosses the context boundary, the real function and its
//! owning context are parked here under a fresh integer id, and the proxy
//! installed on the other side carries only that id. Ids come from a
//! monotonic counter and are never recycled, so a late-firing finalizer can
//! never erase (or a stale proxy ever reach) somebody else's entry.
//!
//! Entries leave the store in exactly one of two ways: the proxy's
//! lifetime monitor fires, or the owning frame is destroyed and discards
//! the whole store.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::context::Context;
use crate::runtime::function::FunctionRef;

/// A registered cross-context function
#[derive(Clone)]
pub struct StoreEntry {
    /// The real function, held strongly for as long as a proxy may call it
    pub func: FunctionRef,
    /// The context the function must be invoked in
    pub owning_context: Context,
}

/// Registry of proxied-function identities for one frame
pub struct FrameStore {
    /// Next id to hand out; monotonic, never reused
    next_id: Cell<u64>,
    /// Live entries by id
    functions: RefCell<HashMap<u64, StoreEntry>>,
}

impl FrameStore {
    /// Create an empty store
    pub fn new() -> Self {
        FrameStore {
            next_id: Cell::new(0),
            functions: RefCell::new(HashMap::new()),
        }
    }

    /// Take a fresh id
    pub fn take_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Register a function under `id`
    pub fn insert(&self, id: u64, func: FunctionRef, owning_context: Context) {
        tracing::trace!(id, context = owning_context.id(), "registered proxied function");
        self.functions.borrow_mut().insert(
            id,
            StoreEntry {
                func,
                owning_context,
            },
        );
    }

    /// Look up the entry at `id`
    pub fn get(&self, id: u64) -> Option<StoreEntry> {
        self.functions.borrow().get(&id).cloned()
    }

    /// Erase the entry at `id`
    ///
    /// Returns whether an entry was actually removed. Called only by the
    /// lifetime monitor; erasing an already-gone id is harmless (a frame
    /// teardown may have raced a pending finalizer).
    pub fn erase(&self, id: u64) -> bool {
        let removed = self.functions.borrow_mut().remove(&id).is_some();
        if removed {
            tracing::trace!(id, "erased proxied function");
        }
        removed
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.functions.borrow().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.functions.borrow().is_empty()
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        FrameStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::value::Value;

    #[test]
    fn test_ids_monotonic_never_reused() {
        let store = FrameStore::new();
        let a = store.take_id();
        let b = store.take_id();
        assert_eq!(b, a + 1);

        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let f = ctx.new_function("f", |_, _| Ok(Value::Undefined));
        store.insert(a, f, ctx);

        // Erasing does not free the id for reuse.
        assert!(store.erase(a));
        let c = store.take_id();
        assert_eq!(c, b + 1);
    }

    #[test]
    fn test_insert_get_erase() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let store = FrameStore::new();

        let f = ctx.new_function("f", |_, _| Ok(Value::Undefined));
        let id = store.take_id();
        store.insert(id, f.clone(), ctx.clone());

        assert_eq!(store.len(), 1);
        let entry = store.get(id).unwrap();
        assert!(entry.func.ptr_eq(&f));
        assert!(entry.owning_context.ptr_eq(&ctx));

        assert!(store.erase(id));
        assert!(store.get(id).is_none());
        assert!(store.is_empty());

        // Double erase is a no-op.
        assert!(!store.erase(id));
    }
}
