//! Context bridge
//!
//! Exposes an API object built in a frame's isolated world to its main
//! world without ever sharing a mutable handle across the boundary:
//! - `expose_api_in_main_world` installs a frozen, read-only proxy on the
//!   main world's global object
//! - `pass_value_to_other_context` mirrors a single value across contexts
//! - every function crossing the boundary is registered in the frame's
//!   store and represented by a proxy on the far side

pub mod freeze;
pub mod invoker;
pub mod marshal;
pub mod monitor;
pub mod proxy;
pub mod store;

pub use freeze::deep_freeze;
pub use marshal::pass_value_to_other_context;
pub use monitor::FunctionLifeMonitor;
pub use proxy::create_proxy_for_api;
pub use store::{FrameStore, StoreEntry};

use crate::frame::Frame;
use crate::runtime::object::ObjectRef;

/// Failures surfaced to the embedder when binding an API
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("cannot bind an API on top of an existing property on the window object")]
    NameCollision(String),
    #[error("frame has already been destroyed")]
    FrameDestroyed,
}

/// Bind `api` on the main world's global object under `key`
///
/// The installed binding is a deep-frozen proxy, defined read-only, so
/// main-world code can call into it but cannot replace or mutate it. An
/// existing property under `key` is never shadowed.
pub fn expose_api_in_main_world(
    frame: &Frame,
    key: &str,
    api: &ObjectRef,
) -> Result<(), BridgeError> {
    if !frame.is_alive() {
        return Err(BridgeError::FrameDestroyed);
    }

    let global = frame.main_world().global();
    if global.has(key) {
        return Err(BridgeError::NameCollision(key.to_owned()));
    }

    let store = frame.store();
    let proxy = create_proxy_for_api(
        frame.engine(),
        api,
        frame.isolated_world(),
        frame.main_world(),
        &store,
    );
    deep_freeze(&proxy);
    global.define_read_only(key, crate::value::Value::Object(proxy));
    tracing::debug!(key, functions = store.len(), "exposed API in main world");
    Ok(())
}
