//! Garbage collection support
//!
//! The heap itself is reference-counted, so storage is reclaimed eagerly
//! when the last handle drops. What this module adds is the piece the
//! bridge actually needs from a collector: *weak references with attached
//! finalizers*. A monitor is registered against a live allocation; the
//! next collection cycle after the allocation dies delivers its callback,
//! exactly once.
//!
//! This mirrors engines whose finalizers run at GC time rather than at the
//! instant of unreachability: cleanup is deferred until someone runs a
//! cycle, and code must stay correct under late-firing finalizers.

mod monitor;

pub use monitor::MonitorTable;
