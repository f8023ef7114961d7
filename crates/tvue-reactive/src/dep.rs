#![forbid(unsafe_code)]

//! Per-property dependency registry.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashSet;

use crate::context::{EvalContext, Subscriber, SubscriberId};

/// The set of subscribers interested in one observed property.
///
/// Subscribers are kept in registration order and deduplicated by
/// [`SubscriberId`]. There is no unsubscription: a registry lives as long as
/// the property that owns it.
#[derive(Default)]
pub struct Dep {
    subscribers: RefCell<Vec<Rc<dyn Subscriber>>>,
    ids: RefCell<AHashSet<SubscriberId>>,
}

impl Dep {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber`. Returns `false` if it was already registered.
    pub fn add(&self, subscriber: &Rc<dyn Subscriber>) -> bool {
        if !self.ids.borrow_mut().insert(subscriber.id()) {
            return false;
        }
        self.subscribers.borrow_mut().push(Rc::clone(subscriber));
        true
    }

    /// Register the context's active subscriber, if there is one.
    pub fn depend(&self, cx: &EvalContext) {
        if let Some(subscriber) = cx.active() {
            if self.add(subscriber) {
                tracing::trace!(subscriber = %subscriber.id(), "dep subscribed");
            }
        }
    }

    /// Invoke every subscriber registered at the time of the call, in order.
    ///
    /// The subscriber list is snapshotted first so a subscriber may register
    /// new subscribers (or trigger nested notifications) while this runs.
    pub fn notify(&self) {
        let snapshot: Vec<Rc<dyn Subscriber>> = self.subscribers.borrow().clone();
        tracing::trace!(subscribers = snapshot.len(), "dep notify");
        for subscriber in snapshot {
            subscriber.update();
        }
    }

    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.ids.borrow().contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_empty()
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("subscribers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Probe {
        id: SubscriberId,
        log: Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
    }

    impl Subscriber for Probe {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn update(&self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    fn probe(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Rc<dyn Subscriber> {
        Rc::new(Probe {
            id: SubscriberId::next(),
            log: Rc::clone(log),
            name,
        })
    }

    #[test]
    fn notify_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dep = Dep::new();
        dep.add(&probe(&log, "a"));
        dep.add(&probe(&log, "b"));
        dep.add(&probe(&log, "c"));

        dep.notify();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dep = Dep::new();
        let sub = probe(&log, "a");
        assert!(dep.add(&sub));
        assert!(!dep.add(&sub));
        assert_eq!(dep.len(), 1);

        dep.notify();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn depend_without_active_subscriber_is_noop() {
        let dep = Dep::new();
        dep.depend(&EvalContext::untracked());
        assert!(dep.is_empty());
    }

    #[test]
    fn depend_registers_active_subscriber() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dep = Dep::new();
        let sub = probe(&log, "a");
        let cx = EvalContext::tracking(Rc::clone(&sub));
        dep.depend(&cx);
        dep.depend(&cx);
        assert_eq!(dep.len(), 1);
        assert!(dep.contains(sub.id()));
    }

    struct Registrar {
        id: SubscriberId,
        dep: Rc<Dep>,
        fired: Rc<Cell<u32>>,
    }

    impl Subscriber for Registrar {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn update(&self) {
            self.fired.set(self.fired.get() + 1);
            let late: Rc<dyn Subscriber> = Rc::new(Registrar {
                id: SubscriberId::next(),
                dep: Rc::clone(&self.dep),
                fired: Rc::clone(&self.fired),
            });
            self.dep.add(&late);
        }
    }

    #[test]
    fn subscribers_added_during_notify_run_next_time() {
        let dep = Rc::new(Dep::new());
        let fired = Rc::new(Cell::new(0));
        let first: Rc<dyn Subscriber> = Rc::new(Registrar {
            id: SubscriberId::next(),
            dep: Rc::clone(&dep),
            fired: Rc::clone(&fired),
        });
        dep.add(&first);

        dep.notify();
        assert_eq!(fired.get(), 1, "only the snapshot runs");
        assert_eq!(dep.len(), 2);
    }

    #[test]
    fn debug_reports_count() {
        let dep = Dep::new();
        assert!(format!("{dep:?}").contains("subscribers: 0"));
    }
}
