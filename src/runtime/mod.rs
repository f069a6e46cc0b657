//! Runtime value heap
//!
//! This module contains the per-context heap value types:
//! - Object representation (properties, freezing)
//! - Array handling (dense, no-hole)
//! - Function values (native callables)
//! - Promises (settlement + reactions via the engine's microtask queue)

pub mod array;
pub mod function;
pub mod object;
pub mod promise;

pub use array::{ArrayRef, MAX_ARRAY_LENGTH};
pub use function::{Completion, FunctionRef};
pub use object::{ErrorRef, ExternalRef, ObjectRef, Property};
pub use promise::PromiseRef;
