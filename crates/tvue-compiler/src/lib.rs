#![forbid(unsafe_code)]

//! Template compilation for tvue.
//!
//! [`compile`] walks a component's view tree once. Every interpolation and
//! value directive it finds gets an initial render plus one
//! [`Watcher`](tvue_reactive::Watcher) that keeps the rendered fragment live;
//! every action directive gets an event listener.
//!
//! | Syntax | Effect |
//! |---|---|
//! | `{{ key }}` in text | interpolate `data[key]` |
//! | `v-text="key"` | element text follows `data[key]` |
//! | `v-model="key"` | element value and `data[key]` follow each other |
//! | `v-html="key"` | element markup follows `data[key]` |
//! | `v-on:event="method"`, `@event="method"` | call `method` on `event` |
//! | `.stop`, `.prevent` | stop propagation / prevent default first |
//!
//! Markers are configurable through [`DirectiveSyntax`].

pub mod compiler;
pub mod config;
pub mod directive;
pub mod error;
pub mod host;

pub use compiler::{Compiler, compile};
pub use config::{ConfigError, DirectiveSyntax};
pub use directive::{Directive, DirectiveKind, Interpolation, Modifiers};
pub use error::{CompileError, Result};
pub use host::{Component, Method, Methods};
