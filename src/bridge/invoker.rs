//! Function proxy invoker
//!
//! The body behind every proxy function. From the caller's point of view
//! the whole thing is one synchronous call: arguments are marshalled into
//! the owning context, the real function runs there on the same stack, and
//! the result is marshalled back. Exceptions cross the boundary as text
//! only: the thrown value's message is extracted best-effort and re-raised
//! as a brand-new error in the calling context.

use std::rc::Rc;

use super::marshal::pass_value_to_other_context;
use super::store::FrameStore;
use crate::engine::Engine;
use crate::runtime::function::Completion;
use crate::value::Value;

/// Raised when a thrown value yields no usable message
pub const UNKNOWN_EXCEPTION_MESSAGE: &str =
    "An unknown exception occurred in the isolated context, an error occurred \
     but a valid exception was not thrown.";

/// Invoke the registered function behind `func_id`
///
/// The calling context is whichever context the proxy is being invoked
/// from right now, which may differ from the context the proxy was created
/// in (re-exported proxies). The owning context is the one recorded at
/// registration.
pub(crate) fn invoke_proxied(
    engine: &Engine,
    store: &Rc<FrameStore>,
    func_id: u64,
    args: &[Value],
) -> Completion {
    let Some(entry) = store.get(func_id) else {
        // The lifetime monitor keeps the proxy alive exactly as long as its
        // id is valid; a miss here means a finalizer fired for a live
        // proxy, which is a broken invariant, not a recoverable state.
        panic!("proxied function {func_id} erased while its proxy was still callable");
    };

    // Invoked outside any scope behaves as an intra-context call.
    let calling_context = engine
        .current_context()
        .unwrap_or_else(|| entry.owning_context.clone());

    let mut proxied_args = Vec::with_capacity(args.len());
    for arg in args {
        proxied_args.push(pass_value_to_other_context(
            engine,
            &calling_context,
            &entry.owning_context,
            arg,
            store,
        ));
    }

    match engine.call(&entry.owning_context, &entry.func, &proxied_args) {
        Ok(return_value) => Ok(pass_value_to_other_context(
            engine,
            &entry.owning_context,
            &calling_context,
            &return_value,
            store,
        )),
        Err(thrown) => {
            let message =
                exception_message(&thrown).unwrap_or_else(|| UNKNOWN_EXCEPTION_MESSAGE.to_owned());
            Err(calling_context.new_error(&message))
        }
    }
}

/// Best-effort extraction of a printable message from a thrown value
fn exception_message(thrown: &Value) -> Option<String> {
    match thrown {
        Value::Error(error) => Some(error.message().to_owned()),
        Value::Str(text) => Some(text.as_str().to_owned()),
        _ => None,
    }
}
