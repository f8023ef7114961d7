#![forbid(unsafe_code)]

//! Evaluation context threaded through tracked reads.
//!
//! Rather than a process-wide "current subscriber" slot, the subscriber that
//! is evaluating is carried by an [`EvalContext`] value passed to
//! [`ObservedValue::read`](crate::ObservedValue::read). A context exists only
//! for the duration of one evaluation, so the active subscriber is cleared
//! when the context is dropped and can never leak into an unrelated read.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a subscriber, used for deduplication in a [`Dep`](crate::Dep).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Allocate a fresh, process-unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something a [`Dep`](crate::Dep) can notify.
pub trait Subscriber {
    fn id(&self) -> SubscriberId;

    /// Called synchronously after a property this subscriber read has changed.
    fn update(&self);
}

/// The subscriber (if any) on whose behalf reads are being performed.
#[derive(Clone, Default)]
pub struct EvalContext {
    active: Option<Rc<dyn Subscriber>>,
}

impl EvalContext {
    /// A context that registers nothing on read.
    #[must_use]
    pub fn untracked() -> Self {
        Self::default()
    }

    /// A context whose reads subscribe `subscriber`.
    #[must_use]
    pub fn tracking(subscriber: Rc<dyn Subscriber>) -> Self {
        Self {
            active: Some(subscriber),
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<&Rc<dyn Subscriber>> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.active.is_some()
    }
}

impl fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalContext")
            .field("active", &self.active.as_ref().map(|s| s.id()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop(SubscriberId);

    impl Subscriber for Noop {
        fn id(&self) -> SubscriberId {
            self.0
        }

        fn update(&self) {}
    }

    #[test]
    fn ids_are_unique() {
        let a = SubscriberId::next();
        let b = SubscriberId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn untracked_has_no_active_subscriber() {
        let cx = EvalContext::untracked();
        assert!(!cx.is_tracking());
        assert!(cx.active().is_none());
    }

    #[test]
    fn tracking_exposes_subscriber() {
        let id = SubscriberId::next();
        let cx = EvalContext::tracking(Rc::new(Noop(id)));
        assert_eq!(cx.active().map(|s| s.id()), Some(id));
        assert!(format!("{cx:?}").contains(&id.get().to_string()));
    }
}
