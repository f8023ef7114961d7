#![forbid(unsafe_code)]

//! Live view-tree nodes.
//!
//! A [`ViewNode`] is a cheap-to-clone handle; clones refer to the same node.
//! Parents own their children, children point back at their parent weakly.
//!
//! # Invariants
//!
//! 1. A node has at most one parent; appending it elsewhere detaches it first.
//! 2. A node is never appended beneath itself.
//! 3. Setting an element's form value never dispatches an event.
//! 4. Listeners are snapshotted before they run, so a listener may add
//!    listeners or restructure the tree during dispatch.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::event::Event;
use crate::markup;

/// Structural classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

type Listener = Rc<dyn Fn(&mut Event)>;

#[derive(Default)]
struct NodeState {
    /// Text or comment content. Unused for elements.
    content: String,
    attributes: Vec<(String, String)>,
    children: Vec<ViewNode>,
    value: String,
    value_dirty: bool,
}

struct NodeInner {
    kind: NodeKind,
    tag: String,
    state: RefCell<NodeState>,
    parent: RefCell<Weak<NodeInner>>,
    listeners: RefCell<Vec<(String, Listener)>>,
}

/// Shared handle to a node in a view tree.
#[derive(Clone)]
pub struct ViewNode {
    inner: Rc<NodeInner>,
}

impl ViewNode {
    fn with_kind(kind: NodeKind, tag: String, content: String) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                kind,
                tag,
                state: RefCell::new(NodeState {
                    content,
                    ..NodeState::default()
                }),
                parent: RefCell::new(Weak::new()),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// A new element. Tag names are case-insensitive and stored lowercase.
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self::with_kind(NodeKind::Element, tag.to_ascii_lowercase(), String::new())
    }

    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text, String::new(), content.into())
    }

    #[must_use]
    pub fn comment(content: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Comment, String::new(), content.into())
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.inner.kind
    }

    #[must_use]
    pub fn is_element(&self) -> bool {
        self.inner.kind == NodeKind::Element
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.inner.kind == NodeKind::Text
    }

    /// Element tag name; empty for text and comment nodes.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -----------------------------------------------------------------------
    // Attributes and form value
    // -----------------------------------------------------------------------

    /// Attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.inner.state.borrow().attributes.clone()
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner
            .state
            .borrow()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Set or replace an attribute. The `value` attribute also seeds the form
    /// value until the value is set directly.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut state = self.inner.state.borrow_mut();
        if name == "value" && !state.value_dirty {
            state.value.clone_from(&value);
        }
        match state.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => state.attributes.push((name.to_owned(), value)),
        }
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let mut state = self.inner.state.borrow_mut();
        let index = state.attributes.iter().position(|(n, _)| n == name)?;
        Some(state.attributes.remove(index).1)
    }

    /// Current form value (what an `input` element holds).
    #[must_use]
    pub fn value(&self) -> String {
        self.inner.state.borrow().value.clone()
    }

    /// Set the form value. Does not dispatch any event.
    pub fn set_value(&self, value: impl Into<String>) {
        let mut state = self.inner.state.borrow_mut();
        state.value = value.into();
        state.value_dirty = true;
    }

    // -----------------------------------------------------------------------
    // Tree structure
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.inner.state.borrow().children.clone()
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Self> {
        self.inner.state.borrow().children.first().cloned()
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Self { inner })
    }

    /// Whether `self` is `other` or one of its ancestors.
    fn contains(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Append `child`, detaching it from its current parent first. Appending a
    /// node beneath itself is ignored.
    pub fn append_child(&self, child: &Self) {
        if child.contains(self) {
            tracing::warn!(tag = %self.tag(), "refusing to append a node beneath itself");
            return;
        }
        child.detach();
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        self.inner.state.borrow_mut().children.push(child.clone());
    }

    /// Remove this node from its parent, if it has one.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .inner
                .state
                .borrow_mut()
                .children
                .retain(|c| !c.ptr_eq(self));
        }
        *self.inner.parent.borrow_mut() = Weak::new();
    }

    /// Replace every child with `children`.
    pub fn replace_children(&self, children: Vec<Self>) {
        let old = std::mem::take(&mut self.inner.state.borrow_mut().children);
        for child in &old {
            *child.inner.parent.borrow_mut() = Weak::new();
        }
        for child in &children {
            child.detach();
            *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        }
        self.inner.state.borrow_mut().children = children;
    }

    /// Depth-first, pre-order search including `self`.
    #[must_use]
    pub fn find(&self, predicate: &dyn Fn(&Self) -> bool) -> Option<Self> {
        if predicate(self) {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.find(predicate))
    }

    /// First element (including `self`) whose `id` attribute is `id`.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<Self> {
        self.find(&|node: &Self| node.is_element() && node.attribute("id").as_deref() == Some(id))
    }

    /// First element (including `self`) with tag `tag`.
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> Option<Self> {
        let tag = tag.to_ascii_lowercase();
        self.find(&|node: &Self| node.is_element() && node.tag() == tag)
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Own content for text and comment nodes; concatenated descendant text
    /// for elements.
    #[must_use]
    pub fn text_content(&self) -> String {
        match self.inner.kind {
            NodeKind::Text | NodeKind::Comment => self.inner.state.borrow().content.clone(),
            NodeKind::Element => {
                let mut out = String::new();
                self.collect_text(&mut out);
                out
            }
        }
    }

    fn collect_text(&self, out: &mut String) {
        for child in self.inner.state.borrow().children.iter() {
            match child.kind() {
                NodeKind::Text => out.push_str(&child.inner.state.borrow().content),
                NodeKind::Element => child.collect_text(out),
                NodeKind::Comment => {}
            }
        }
    }

    /// Replace the content. An element's children are replaced by a single
    /// text node (or none, for an empty string).
    pub fn set_text_content(&self, content: impl Into<String>) {
        let content = content.into();
        match self.inner.kind {
            NodeKind::Text | NodeKind::Comment => {
                self.inner.state.borrow_mut().content = content;
            }
            NodeKind::Element => {
                let children = if content.is_empty() {
                    Vec::new()
                } else {
                    vec![Self::text(content)]
                };
                self.replace_children(children);
            }
        }
    }

    /// Serialized children.
    #[must_use]
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.inner.state.borrow().children.iter() {
            markup::write_node(child, &mut out);
        }
        out
    }

    /// Replace the children with the parsed `markup`. On a text or comment
    /// node the markup is stored as plain content.
    pub fn set_inner_html(&self, markup: &str) {
        match self.inner.kind {
            NodeKind::Element => self.replace_children(markup::parse_fragment(markup)),
            NodeKind::Text | NodeKind::Comment => self.set_text_content(markup),
        }
    }

    #[must_use]
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        markup::write_node(self, &mut out);
        out
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn add_event_listener(&self, kind: impl Into<String>, listener: impl Fn(&mut Event) + 'static) {
        self.inner
            .listeners
            .borrow_mut()
            .push((kind.into(), Rc::new(listener)));
    }

    #[must_use]
    pub fn listener_count(&self, kind: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| k == kind)
            .count()
    }

    fn listeners_for(&self, kind: &str) -> Vec<Listener> {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| k == kind)
            .map(|(_, l)| Rc::clone(l))
            .collect()
    }

    /// Dispatch `event` at this node and bubble it through the ancestors.
    /// Returns the event so callers can inspect its flags.
    pub fn dispatch_event(&self, mut event: Event) -> Event {
        event.set_target(self.clone());
        let mut current = Some(self.clone());
        while let Some(node) = current {
            event.set_current_target(Some(node.clone()));
            for listener in node.listeners_for(event.kind()) {
                listener(&mut event);
            }
            if event.is_propagation_stopped() {
                break;
            }
            current = node.parent();
        }
        event.set_current_target(None);
        event
    }

    /// Simulate user input: set the form value, then dispatch `input`.
    pub fn input(&self, value: impl Into<String>) -> Event {
        self.set_value(value);
        self.dispatch_event(Event::new("input"))
    }

    pub fn click(&self) -> Event {
        self.dispatch_event(Event::new("click"))
    }
}

impl fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            NodeKind::Element => f
                .debug_struct("Element")
                .field("tag", &self.inner.tag)
                .field("children", &self.inner.state.borrow().children.len())
                .finish(),
            NodeKind::Text => f.debug_tuple("Text").field(&self.text_content()).finish(),
            NodeKind::Comment => f.debug_tuple("Comment").field(&self.text_content()).finish(),
        }
    }
}
