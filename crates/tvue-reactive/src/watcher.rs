#![forbid(unsafe_code)]

//! Live binding between an observed property path and a callback.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::context::{EvalContext, Subscriber, SubscriberId};
use crate::error::Result;
use crate::observer::{Data, ReactiveObject, WeakObject};

/// Subscribes to a property path on construction and calls its callback with
/// the freshly read value whenever that path changes.
///
/// Every read, initial or on update, goes through a tracking context, so a
/// path whose intermediate object is replaced is re-subscribed on the new
/// object.
///
/// A watcher is never torn down: every [`Dep`](crate::Dep) it subscribed to
/// keeps it alive. It holds the data root weakly, so once the root is dropped
/// notifications are ignored.
pub struct Watcher {
    id: SubscriberId,
    this: Weak<Watcher>,
    root: WeakObject,
    path: String,
    on_change: Box<dyn Fn(&Data)>,
}

impl Watcher {
    /// Create a watcher on `path` of `root`.
    ///
    /// The path is read once through a tracking [`EvalContext`] so every
    /// segment along it records this watcher. The value read is discarded.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingError`](crate::BindingError) if `path` does not name
    /// an observed property.
    pub fn new(
        root: &ReactiveObject,
        path: impl Into<String>,
        on_change: impl Fn(&Data) + 'static,
    ) -> Result<Rc<Self>> {
        let watcher = Rc::new_cyclic(|this| Self {
            id: SubscriberId::next(),
            this: this.clone(),
            root: root.downgrade(),
            path: path.into(),
            on_change: Box::new(on_change),
        });
        let _ = watcher.tracked_read(root)?;

        tracing::debug!(watcher = %watcher.id, path = %watcher.path, "watcher created");
        Ok(watcher)
    }

    /// Read the path with this watcher as the active subscriber.
    fn tracked_read(&self, root: &ReactiveObject) -> Result<Data> {
        let cx = match self.this.upgrade() {
            Some(this) => EvalContext::tracking(this as Rc<dyn Subscriber>),
            None => EvalContext::untracked(),
        };
        root.read_path(&self.path, &cx)
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current value of the watched path, or `None` if the root is gone.
    #[must_use]
    pub fn value(&self) -> Option<Data> {
        let root = self.root.upgrade()?;
        root.get_path(&self.path).ok()
    }
}

impl Subscriber for Watcher {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn update(&self) {
        let Some(root) = self.root.upgrade() else {
            return;
        };
        match self.tracked_read(&root) {
            Ok(value) => {
                tracing::trace!(watcher = %self.id, path = %self.path, "watcher update");
                (self.on_change)(&value);
            }
            Err(err) => {
                tracing::warn!(watcher = %self.id, error = %err, "watcher path no longer resolves");
            }
        }
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}
