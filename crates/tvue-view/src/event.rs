#![forbid(unsafe_code)]

//! View events.

use bitflags::bitflags;

use crate::node::ViewNode;

bitflags! {
    /// Dispatch state accumulated by listeners.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventFlags: u8 {
        const PROPAGATION_STOPPED = 1 << 0;
        const DEFAULT_PREVENTED = 1 << 1;
    }
}

/// An event travelling from its target up through the target's ancestors.
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    target: Option<ViewNode>,
    current_target: Option<ViewNode>,
    flags: EventFlags,
}

impl Event {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            target: None,
            current_target: None,
            flags: EventFlags::empty(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node the event was dispatched to.
    #[must_use]
    pub fn target(&self) -> Option<&ViewNode> {
        self.target.as_ref()
    }

    /// The node whose listeners are currently running.
    #[must_use]
    pub fn current_target(&self) -> Option<&ViewNode> {
        self.current_target.as_ref()
    }

    /// Stop bubbling once the current node's listeners have run.
    pub fn stop_propagation(&mut self) {
        self.flags.insert(EventFlags::PROPAGATION_STOPPED);
    }

    pub fn prevent_default(&mut self) {
        self.flags.insert(EventFlags::DEFAULT_PREVENTED);
    }

    #[must_use]
    pub fn is_propagation_stopped(&self) -> bool {
        self.flags.contains(EventFlags::PROPAGATION_STOPPED)
    }

    #[must_use]
    pub fn is_default_prevented(&self) -> bool {
        self.flags.contains(EventFlags::DEFAULT_PREVENTED)
    }

    #[must_use]
    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    pub(crate) fn set_target(&mut self, node: ViewNode) {
        self.target = Some(node);
    }

    pub(crate) fn set_current_target(&mut self, node: Option<ViewNode>) {
        self.current_target = node;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_is_clean() {
        let event = Event::new("click");
        assert_eq!(event.kind(), "click");
        assert!(event.flags().is_empty());
        assert!(event.target().is_none());
    }

    #[test]
    fn flags_accumulate() {
        let mut event = Event::new("click");
        event.stop_propagation();
        assert!(event.is_propagation_stopped());
        assert!(!event.is_default_prevented());
        event.prevent_default();
        assert_eq!(
            event.flags(),
            EventFlags::PROPAGATION_STOPPED | EventFlags::DEFAULT_PREVENTED
        );
    }
}
