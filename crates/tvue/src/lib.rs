#![forbid(unsafe_code)]

//! tvue public facade.
//!
//! Re-exports the reactive core, the view tree and the template compiler,
//! and provides [`App`], a ready-made host component:
//!
//! ```
//! use tvue::prelude::*;
//! use serde_json::json;
//!
//! let app = App::builder()
//!     .data(json!({ "name": "Ada" }))
//!     .template("<p>Hello, {{ name }}!</p>")
//!     .build()
//!     .unwrap();
//! assert_eq!(app.root().text_content(), "Hello, Ada!");
//!
//! app.set("name", "Grace").unwrap();
//! assert_eq!(app.root().text_content(), "Hello, Grace!");
//! ```

pub mod app;
#[cfg(feature = "logging")]
pub mod logging;

pub use app::{App, AppBuilder, AppError};

pub use tvue_compiler::{
    CompileError, Compiler, Component, ConfigError, Directive, DirectiveKind, DirectiveSyntax,
    Interpolation, Method, Methods, Modifiers, compile,
};
pub use tvue_reactive::{
    BindingError, Data, Dep, EvalContext, ObservedValue, ReactiveObject, Subscriber, SubscriberId,
    WeakObject, Watcher, observe,
};
pub use tvue_view::{Event, EventFlags, NodeKind, ParseError, ViewNode, parse_fragment, parse_template};

pub mod prelude {
    pub use crate::app::{App, AppBuilder, AppError};
    pub use tvue_compiler::{Component, DirectiveSyntax, Methods};
    pub use tvue_reactive::{Data, ReactiveObject, Watcher, observe};
    pub use tvue_view::{Event, ViewNode};
}
