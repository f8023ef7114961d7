#![forbid(unsafe_code)]

//! Observation and dependency tracking for tvue.
//!
//! This crate provides the reactive half of the runtime:
//!
//! - [`observe`]: converts a plain JSON object into a [`ReactiveObject`] whose
//!   every property is an [`ObservedValue`] with its own [`Dep`].
//! - [`Dep`]: the per-property registry of subscribers to notify on change.
//! - [`EvalContext`]: carries the active subscriber (if any) through a read,
//!   so reads performed on its behalf subscribe it.
//! - [`Watcher`]: one live binding between a property path and a callback.
//!
//! # Invariants
//!
//! 1. The accessor on [`ObservedValue`] is the only way to reach the stored
//!    value, so every tracked read and every notifying write goes through it.
//! 2. Writing a value equal to the current one notifies nobody.
//! 3. Subscribers are notified synchronously, in registration order, and a
//!    subscriber is registered at most once per property.
//! 4. No borrow is held while a subscriber runs: subscribers may read, write,
//!    or create new watchers re-entrantly.
//!
//! # Accepted limitations
//!
//! Properties cannot be added to an object once it has been observed, and
//! subscribers are never removed from a [`Dep`].

pub mod context;
pub mod dep;
pub mod error;
pub mod observer;
pub mod watcher;

pub use context::{EvalContext, Subscriber, SubscriberId};
pub use dep::Dep;
pub use error::{BindingError, Result};
pub use observer::{Data, ObservedValue, ReactiveObject, WeakObject, observe};
pub use watcher::Watcher;
