#![forbid(unsafe_code)]

//! The built-in host component.
//!
//! An [`App`] owns the three things the compiler needs: an observed data
//! root, a view tree and a method table. [`AppBuilder::build`] assembles them
//! in the required order (observe, parse, compile) so that every binding is
//! live by the time the app is handed out.
//!
//! # Invariants
//!
//! 1. The data root is observed before any view work happens.
//! 2. The view tree is compiled exactly once, during `build`.
//! 3. Methods receive the same data root the bindings read from.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use tvue_compiler::{CompileError, Compiler, Component, ConfigError, DirectiveSyntax, Methods};
use tvue_reactive::{BindingError, Data, ReactiveObject, observe};
use tvue_view::{ParseError, ViewNode, parse_template};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("app data must be a JSON object")]
    DataNotObject,

    #[error("app has neither a template nor a mount node")]
    MissingTemplate,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Binding(#[from] BindingError),
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    data: ReactiveObject,
    root: ViewNode,
    methods: Methods,
}

impl App {
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    /// Read `key` (a dotted path) without subscribing.
    pub fn get(&self, key: &str) -> Result<Data, BindingError> {
        self.data.get_path(key)
    }

    /// Write `key` (a dotted path). Returns whether the value changed.
    pub fn set(&self, key: &str, value: impl Into<Data>) -> Result<bool, BindingError> {
        self.data.set_path(key, value)
    }

    /// Invoke a registered method by name, as an action directive would.
    pub fn call(&self, name: &str) -> bool {
        match self.methods.get(name) {
            Some(method) => {
                method(&self.data);
                true
            }
            None => false,
        }
    }
}

impl Component for App {
    fn data(&self) -> &ReactiveObject {
        &self.data
    }

    fn root(&self) -> &ViewNode {
        &self.root
    }

    fn methods(&self) -> &Methods {
        &self.methods
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("data", &self.data.to_json())
            .field("root", &self.root)
            .field("methods", &self.methods)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppBuilder {
    data: Option<Value>,
    template: Option<String>,
    mount: Option<ViewNode>,
    methods: Methods,
    syntax: DirectiveSyntax,
}

impl AppBuilder {
    /// Initial data. Defaults to an empty object.
    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Markup with exactly one root element.
    #[must_use]
    pub fn template(mut self, markup: impl Into<String>) -> Self {
        self.template = Some(markup.into());
        self
    }

    /// An existing tree to compile. With a template as well, the parsed
    /// template is appended to this node and the node becomes the root.
    #[must_use]
    pub fn mount(mut self, node: ViewNode) -> Self {
        self.mount = Some(node);
        self
    }

    #[must_use]
    pub fn method(mut self, name: impl Into<String>, method: impl Fn(&ReactiveObject) + 'static) -> Self {
        self.methods.insert(name, method);
        self
    }

    #[must_use]
    pub fn methods(mut self, methods: Methods) -> Self {
        self.methods = methods;
        self
    }

    #[must_use]
    pub fn syntax(mut self, syntax: DirectiveSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn build(self) -> Result<App, AppError> {
        self.syntax.validate()?;
        let data = observe(self.data.unwrap_or_else(|| Value::Object(Default::default())))
            .ok_or(AppError::DataNotObject)?;

        let root = match (self.template, self.mount) {
            (Some(markup), None) => parse_template(&markup)?,
            (None, Some(mount)) => mount,
            (Some(markup), Some(mount)) => {
                mount.append_child(&parse_template(&markup)?);
                mount
            }
            (None, None) => return Err(AppError::MissingTemplate),
        };

        let app = App {
            data,
            root,
            methods: self.methods,
        };
        Compiler::new(&app).with_syntax(self.syntax).compile()?;
        tracing::debug!(methods = app.methods.len(), "app mounted");
        Ok(app)
    }
}
