//! Weak-reference + finalizer registry

use std::any::Any;
use std::rc::{Rc, Weak};

/// One registered monitor
struct MonitorEntry {
    /// Weak handle to the watched allocation
    target: Weak<dyn Any>,
    /// Runs once the target is gone
    on_collect: Box<dyn FnOnce()>,
}

/// Registry of lifetime monitors
///
/// Entries are keyed by the watched allocation itself (weakly held), not by
/// any id, so a monitor can never outlive or mismatch its target.
pub struct MonitorTable {
    entries: Vec<MonitorEntry>,
}

impl MonitorTable {
    /// Create an empty registry
    pub fn new() -> Self {
        MonitorTable {
            entries: Vec::new(),
        }
    }

    /// Attach a finalizer to an allocation
    ///
    /// The registry holds the target weakly: attaching does not keep it
    /// alive. `on_collect` fires during the first [`sweep`](Self::sweep)
    /// after the last strong reference is dropped.
    pub fn attach<T: 'static>(&mut self, target: &Rc<T>, on_collect: impl FnOnce() + 'static) {
        // Method-call clone so the unsized coercion happens at the binding.
        let target: Rc<dyn Any> = target.clone();
        self.entries.push(MonitorEntry {
            target: Rc::downgrade(&target),
            on_collect: Box::new(on_collect),
        });
    }

    /// Remove dead entries and hand back their finalizers
    ///
    /// The caller runs the callbacks after the registry borrow ends, so a
    /// finalizer may freely re-enter other shared state.
    pub fn sweep(&mut self) -> Vec<Box<dyn FnOnce()>> {
        let mut fired = Vec::new();
        let mut live = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.target.strong_count() == 0 {
                fired.push(entry.on_collect);
            } else {
                live.push(entry);
            }
        }
        self.entries = live;
        fired
    }

    /// Number of live monitors
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MonitorTable {
    fn default() -> Self {
        MonitorTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_attach_does_not_keep_alive() {
        let mut table = MonitorTable::new();
        let target = Rc::new(String::from("watched"));
        table.attach(&target, || {});

        assert_eq!(Rc::strong_count(&target), 1);
    }

    #[test]
    fn test_sweep_returns_dead_finalizers_once() {
        let mut table = MonitorTable::new();
        let fired = Rc::new(Cell::new(0));

        let keep = Rc::new(1u8);
        let die = Rc::new(2u8);
        let f1 = Rc::clone(&fired);
        let f2 = Rc::clone(&fired);
        table.attach(&keep, move || f1.set(f1.get() + 1));
        table.attach(&die, move || f2.set(f2.get() + 10));

        drop(die);
        for finalizer in table.sweep() {
            finalizer();
        }
        assert_eq!(fired.get(), 10);
        assert_eq!(table.len(), 1);

        // A second sweep with nothing newly dead fires nothing.
        assert!(table.sweep().is_empty());

        drop(keep);
        for finalizer in table.sweep() {
            finalizer();
        }
        assert_eq!(fired.get(), 11);
        assert!(table.is_empty());
    }

    #[test]
    fn test_targets_of_distinct_types_share_one_table() {
        let mut table = MonitorTable::new();
        let fired = Rc::new(Cell::new(0));

        let a = Rc::new(String::from("a"));
        let b = Rc::new(vec![1u32, 2, 3]);
        let f1 = Rc::clone(&fired);
        let f2 = Rc::clone(&fired);
        table.attach(&a, move || f1.set(f1.get() + 1));
        table.attach(&b, move || f2.set(f2.get() + 1));

        drop(a);
        drop(b);
        for finalizer in table.sweep() {
            finalizer();
        }
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_multiple_monitors_same_target() {
        let mut table = MonitorTable::new();
        let fired = Rc::new(Cell::new(0));

        let target = Rc::new(0u8);
        for _ in 0..3 {
            let f = Rc::clone(&fired);
            table.attach(&target, move || f.set(f.get() + 1));
        }

        drop(target);
        for finalizer in table.sweep() {
            finalizer();
        }
        assert_eq!(fired.get(), 3);
    }
}
