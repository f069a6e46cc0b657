//! Context Bridge - cross-context value marshalling for embedded script engines
//!
//! This crate lets a privileged execution context (an "isolated world")
//! expose an API object graph into a less-privileged context (the "main
//! world") without sharing object identity or raw references between the
//! two, while keeping the call-through illusion intact: functions, promises,
//! errors, arrays and plain data all cross the boundary with their natural
//! semantics.
//!
//! # Features
//! - Function proxying with per-frame handle registration and GC-driven
//!   entry cleanup (no leak, no use-after-free)
//! - Promise proxying that preserves settlement semantics across contexts
//! - Error mirroring (message preserved, identity intentionally lost)
//! - Deep element-wise array copying and recursive object mirroring
//! - Deep-freeze of the exposed surface against main-world tampering
//!
//! # Example
//! ```
//! use contextbridge::{expose_api_in_main_world, Engine, Frame, Value};
//!
//! let engine = Engine::new();
//! let frame = Frame::new(&engine);
//!
//! let api = frame.isolated_world().new_object();
//! let add = frame
//!     .isolated_world()
//!     .new_function("add", |_, args| {
//!         let a = args.first().and_then(Value::to_i32).unwrap_or(0);
//!         let b = args.get(1).and_then(Value::to_i32).unwrap_or(0);
//!         Ok(Value::Int(a + b))
//!     });
//! api.set("add", Value::Function(add));
//!
//! expose_api_in_main_world(&frame, "myApi", &api).unwrap();
//! ```

// Core modules
pub mod context;
pub mod engine;
pub mod value;

// Garbage collection support (weak references + finalizers)
pub mod gc;

// Runtime value heap (objects, arrays, functions, promises)
pub mod runtime;

// The bridge itself
pub mod bridge;

// Host frame model
pub mod frame;

// Re-export main types
pub use bridge::{expose_api_in_main_world, BridgeError};
pub use context::Context;
pub use engine::Engine;
pub use frame::Frame;
pub use value::Value;
