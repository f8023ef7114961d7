#![forbid(unsafe_code)]

//! DOM-like view tree for tvue.
//!
//! - [`ViewNode`]: shared handle to an element, text or comment node. The tree
//!   is mutated in place; there is no diffing.
//! - [`Event`]: dispatched to a node and bubbled through its ancestors.
//! - [`parse_fragment`] / [`parse_template`]: lenient HTML-subset parser.
//!
//! Everything here is single-threaded (`Rc`-based) and synchronous.

pub mod event;
pub mod markup;
pub mod node;

pub use event::{Event, EventFlags};
pub use markup::{ParseError, parse_fragment, parse_template};
pub use node::{NodeKind, ViewNode};
