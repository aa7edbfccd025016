//! Listener registries with snapshot-on-notify semantics.
//!
//! Every notification source in the engine (modifier changes, attribute value
//! changes, effect applied/ceased, ability casts, hits) keeps its callbacks in a
//! [`Listeners`] registry.
//!
//! `notify` copies the current entries before invoking any of them. A listener
//! may therefore add or remove listeners, including itself, while it runs; the
//! change is visible from the next notification on.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use rust_combat::core::Listeners;
//!
//! let listeners: Rc<Listeners<u32>> = Rc::new(Listeners::new());
//! let total = Rc::new(Cell::new(0));
//!
//! let sum = total.clone();
//! listeners.add(move |value: &u32| sum.set(sum.get() + *value));
//!
//! listeners.notify(&3);
//! listeners.notify(&4);
//! assert_eq!(total.get(), 7);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

/// Shared listener callback.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Handle returned when a listener is registered; used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// An ordered registry of callbacks for events of type `E`.
pub struct Listeners<E> {
    next_id: Cell<u64>,
    entries: RefCell<SmallVec<[(ListenerId, Listener<E>); 4]>>,
}

impl<E> Listeners<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(SmallVec::new()),
        }
    }

    /// Register a listener.
    pub fn add(&self, listener: impl Fn(&E) + 'static) -> ListenerId {
        self.add_shared(Rc::new(listener))
    }

    /// Register an already shared listener.
    ///
    /// Used when one callback is registered on several sources.
    pub fn add_shared(&self, listener: Listener<E>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Invoke every registered listener with `event`.
    pub fn notify(&self, event: &E) {
        let snapshot: SmallVec<[Listener<E>; 4]> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Remove every listener.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_notify_in_order() {
        let listeners = Listeners::<u8>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = log.clone();
        listeners.add(move |_| first.borrow_mut().push("first"));
        let second = log.clone();
        listeners.add(move |_| second.borrow_mut().push("second"));

        listeners.notify(&0);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_remove() {
        let listeners = Listeners::<u8>::new();
        let id = listeners.add(|_| {});

        assert_eq!(listeners.len(), 1);
        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_listener_removes_itself_during_notify() {
        let listeners = Rc::new(Listeners::<u8>::new());
        let calls = Rc::new(Cell::new(0));
        let own_id = Rc::new(Cell::new(None));

        let registry = Rc::downgrade(&listeners);
        let counter = calls.clone();
        let slot = own_id.clone();
        let id = listeners.add(move |_| {
            counter.set(counter.get() + 1);
            if let (Some(registry), Some(id)) = (registry.upgrade(), slot.get()) {
                registry.remove(id);
            }
        });
        own_id.set(Some(id));

        listeners.notify(&1);
        listeners.notify(&2);

        assert_eq!(calls.get(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_listener_added_during_notify_runs_next_time() {
        let listeners = Rc::new(Listeners::<u8>::new());
        let late_calls = Rc::new(Cell::new(0));

        let registry = Rc::downgrade(&listeners);
        let late = late_calls.clone();
        let added = Cell::new(false);
        listeners.add(move |_| {
            if !added.replace(true) {
                if let Some(registry) = registry.upgrade() {
                    let late = late.clone();
                    registry.add(move |_| late.set(late.get() + 1));
                }
            }
        });

        listeners.notify(&0);
        assert_eq!(late_calls.get(), 0);

        listeners.notify(&0);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_shared_listener() {
        let a = Listeners::<u8>::new();
        let b = Listeners::<u8>::new();
        let calls = Rc::new(Cell::new(0));

        let counter = calls.clone();
        let shared: Listener<u8> = Rc::new(move |_| counter.set(counter.get() + 1));
        a.add_shared(shared.clone());
        b.add_shared(shared);

        a.notify(&0);
        b.notify(&0);
        assert_eq!(calls.get(), 2);
    }
}
