//! Frame: a paired main world and isolated world
//!
//! Bridged contexts always come in pairs that live and die together. The
//! frame owns both contexts plus the lazily created function store, and
//! destroying it is the single discard point for everything the bridge
//! registered on its behalf.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bridge::store::FrameStore;
use crate::context::Context;
use crate::engine::Engine;

pub struct Frame {
    engine: Engine,
    main_world: Context,
    isolated_world: Context,
    store: RefCell<Option<Rc<FrameStore>>>,
}

impl Frame {
    pub fn new(engine: &Engine) -> Self {
        Frame {
            engine: engine.clone(),
            main_world: engine.new_context("main-world"),
            isolated_world: engine.new_context("isolated-world"),
            store: RefCell::new(None),
        }
    }

    #[inline]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[inline]
    pub fn main_world(&self) -> &Context {
        &self.main_world
    }

    #[inline]
    pub fn isolated_world(&self) -> &Context {
        &self.isolated_world
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.main_world.is_alive() && self.isolated_world.is_alive()
    }

    /// The frame's function store, created on first use
    pub(crate) fn store(&self) -> Rc<FrameStore> {
        let mut slot = self.store.borrow_mut();
        match &*slot {
            Some(store) => Rc::clone(store),
            None => {
                let store = Rc::new(FrameStore::new());
                *slot = Some(Rc::clone(&store));
                store
            }
        }
    }

    /// Tear down both worlds and discard every registered function
    ///
    /// Proxies already handed out stay callable as values but raise an
    /// error when invoked. Destroying twice is a no-op.
    pub fn destroy(&self) {
        if let Some(store) = self.store.borrow_mut().take() {
            tracing::debug!(functions = store.len(), "discarding frame store");
        }
        self.main_world.kill();
        self.isolated_world.kill();
    }

    /// Number of functions currently registered for this frame
    #[cfg(debug_assertions)]
    pub fn proxied_function_count(&self) -> usize {
        self.store.borrow().as_ref().map_or(0, |store| store.len())
    }
}
