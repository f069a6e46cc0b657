//! Function lifetime monitor
//!
//! Binds a finalizer to a destination-side proxy function: when the proxy
//! becomes unreachable and a collection cycle runs, the matching handle
//! store entry is erased, releasing the real function (and everything it
//! closes over) on the source side. Without this, every function ever
//! exposed would stay alive for the life of the frame.

use std::rc::Rc;

use super::store::FrameStore;
use crate::engine::Engine;
use crate::runtime::function::FunctionRef;

pub struct FunctionLifeMonitor;

impl FunctionLifeMonitor {
    /// Attach the monitor to `proxy`
    ///
    /// Called exactly once per proxy, at creation time. The store is held
    /// weakly: if the frame is torn down first, the late finalizer finds
    /// nothing to erase and does nothing.
    pub fn bind_to(engine: &Engine, proxy: &FunctionRef, store: &Rc<FrameStore>, func_id: u64) {
        let store = Rc::downgrade(store);
        engine.attach_monitor(proxy.as_rc(), move || {
            if let Some(store) = store.upgrade() {
                store.erase(func_id);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_monitor_erases_entry_on_collect() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let store = Rc::new(FrameStore::new());

        let real = ctx.new_function("real", |_, _| Ok(Value::Undefined));
        let id = store.take_id();
        store.insert(id, real, ctx.clone());

        let proxy = ctx.new_function("proxy", |_, _| Ok(Value::Undefined));
        FunctionLifeMonitor::bind_to(&engine, &proxy, &store, id);

        // Proxy still reachable: nothing happens.
        engine.collect_garbage();
        assert_eq!(store.len(), 1);

        drop(proxy);
        assert_eq!(engine.collect_garbage(), 1);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_late_finalizer_after_store_discard() {
        let engine = Engine::new();
        let ctx = engine.new_context("t");
        let store = Rc::new(FrameStore::new());

        let real = ctx.new_function("real", |_, _| Ok(Value::Undefined));
        let id = store.take_id();
        store.insert(id, real, ctx.clone());

        let proxy = ctx.new_function("proxy", |_, _| Ok(Value::Undefined));
        FunctionLifeMonitor::bind_to(&engine, &proxy, &store, id);

        // Frame teardown discards the store before the proxy dies.
        drop(store);
        drop(proxy);

        // The finalizer still fires once, harmlessly.
        assert_eq!(engine.collect_garbage(), 1);
    }
}
