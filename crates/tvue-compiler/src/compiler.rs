#![forbid(unsafe_code)]

//! Single-pass template compiler.
//!
//! The walk is pre-order, starting at the root itself. Each node is handled
//! according to its [`NodeKind`]; afterwards the walk descends into the node's
//! children as they are at that moment, so a node may carry directives and
//! still have directive-bearing descendants. Markup inserted by `v-html`'s
//! initial render is therefore compiled too.
//!
//! Every binding gets exactly one initial render and exactly one [`Watcher`].
//! Watchers are kept alive by the dependency registries they subscribe to, so
//! the compiler does not hold on to them.

use tvue_reactive::{Data, ReactiveObject, WeakObject, Watcher};
use tvue_view::{Event, NodeKind, ViewNode};

use crate::config::DirectiveSyntax;
use crate::directive::{Directive, DirectiveKind, Interpolation, Modifiers};
use crate::error::{CompileError, Result};
use crate::host::{Component, Methods};

#[derive(Debug, Default, Clone, Copy)]
struct CompileStats {
    nodes: usize,
    watchers: usize,
    listeners: usize,
    ignored: usize,
}

/// Compiles one component's view tree against its data and methods.
pub struct Compiler<'a> {
    data: &'a ReactiveObject,
    methods: &'a Methods,
    root: &'a ViewNode,
    syntax: DirectiveSyntax,
    stats: CompileStats,
}

impl<'a> Compiler<'a> {
    #[must_use]
    pub fn new<C: Component + ?Sized>(component: &'a C) -> Self {
        Self {
            data: component.data(),
            methods: component.methods(),
            root: component.root(),
            syntax: DirectiveSyntax::default(),
            stats: CompileStats::default(),
        }
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: DirectiveSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Walk the whole tree once, rendering and binding as it goes.
    ///
    /// # Errors
    ///
    /// Fails on the first binding that names an unobserved property or an
    /// unregistered method. Bindings created before the failure stay live.
    pub fn compile(mut self) -> Result<()> {
        let root = self.root;
        let _span = tracing::debug_span!("compile", root = %root.tag()).entered();
        self.compile_node(root)?;
        tracing::debug!(
            nodes = self.stats.nodes,
            watchers = self.stats.watchers,
            listeners = self.stats.listeners,
            ignored = self.stats.ignored,
            "template compiled"
        );
        Ok(())
    }

    fn compile_node(&mut self, node: &ViewNode) -> Result<()> {
        self.stats.nodes += 1;
        tracing::trace!(?node, "visit");
        match node.kind() {
            NodeKind::Text => self.compile_text(node)?,
            NodeKind::Element => self.compile_element(node)?,
            NodeKind::Comment => tracing::trace!("skipping comment"),
        }
        for child in node.children() {
            self.compile_node(&child)?;
        }
        Ok(())
    }

    fn compile_text(&mut self, node: &ViewNode) -> Result<()> {
        let Some(interpolation) = Interpolation::find(&node.text_content(), &self.syntax) else {
            return Ok(());
        };
        let key = interpolation.key.clone();
        let describe = || {
            format!(
                "{} {key} {}",
                self.syntax.interpolation_open, self.syntax.interpolation_close
            )
        };

        let value = self
            .data
            .get_path(&key)
            .map_err(|err| CompileError::binding(describe(), err))?;
        node.set_text_content(interpolation.render(&value));

        let target = node.clone();
        Watcher::new(self.data, key.as_str(), move |value| {
            target.set_text_content(interpolation.render(value));
        })
        .map_err(|err| CompileError::binding(describe(), err))?;
        self.stats.watchers += 1;
        Ok(())
    }

    fn compile_element(&mut self, node: &ViewNode) -> Result<()> {
        let directives: Vec<Directive> = node
            .attributes()
            .iter()
            .filter_map(|(name, value)| Directive::parse(name, value, &self.syntax))
            .collect();
        for directive in directives {
            self.apply(node, directive)?;
        }
        Ok(())
    }

    fn apply(&mut self, node: &ViewNode, directive: Directive) -> Result<()> {
        match &directive.kind {
            DirectiveKind::Text => self.bind_value(node, &directive, |node, value| {
                node.set_text_content(value.to_string());
            }),
            DirectiveKind::Html => self.bind_value(node, &directive, |node, value| {
                node.set_inner_html(&value.to_string());
            }),
            DirectiveKind::Model => {
                self.bind_value(node, &directive, |node, value| {
                    node.set_value(value.to_string());
                })?;
                self.listen_for_input(node, &directive.expression);
                Ok(())
            }
            DirectiveKind::On { event, modifiers } => {
                self.bind_event(node, &directive, event, *modifiers)
            }
            DirectiveKind::Unknown(name) => {
                self.stats.ignored += 1;
                tracing::debug!(directive = %name, attribute = %directive.attribute, "ignoring unknown directive");
                Ok(())
            }
        }
    }

    /// Initial render plus a watcher re-applying `render` on change.
    fn bind_value(
        &mut self,
        node: &ViewNode,
        directive: &Directive,
        render: fn(&ViewNode, &Data),
    ) -> Result<()> {
        let key = directive.expression.as_str();
        let value = self
            .data
            .get_path(key)
            .map_err(|err| CompileError::binding(directive.attribute.clone(), err))?;
        render(node, &value);

        let target = node.clone();
        Watcher::new(self.data, key, move |value| render(&target, value))
            .map_err(|err| CompileError::binding(directive.attribute.clone(), err))?;
        self.stats.watchers += 1;
        tracing::debug!(attribute = %directive.attribute, key, "value binding created");
        Ok(())
    }

    /// Write the element's value back into `data[key]` on every `input` event.
    fn listen_for_input(&mut self, node: &ViewNode, key: &str) {
        let data: WeakObject = self.data.downgrade();
        let key = key.to_owned();
        node.add_event_listener("input", move |event: &mut Event| {
            let (Some(data), Some(target)) = (data.upgrade(), event.current_target()) else {
                return;
            };
            if let Err(err) = data.set_path(&key, target.value()) {
                tracing::warn!(error = %err, "two-way binding write failed");
            }
        });
        self.stats.listeners += 1;
    }

    fn bind_event(
        &mut self,
        node: &ViewNode,
        directive: &Directive,
        event: &str,
        modifiers: Modifiers,
    ) -> Result<()> {
        if event.is_empty() {
            self.stats.ignored += 1;
            tracing::debug!(attribute = %directive.attribute, "ignoring event directive without an event name");
            return Ok(());
        }
        let method = self
            .methods
            .get(&directive.expression)
            .cloned()
            .ok_or_else(|| CompileError::MissingMethod {
                name: directive.expression.clone(),
                event: event.to_owned(),
            })?;

        let data = self.data.downgrade();
        node.add_event_listener(event, move |event: &mut Event| {
            fire(event, modifiers, |_| {
                if let Some(data) = data.upgrade() {
                    method(&data);
                }
            });
        });
        self.stats.listeners += 1;
        tracing::debug!(event, method = %directive.expression, ?modifiers, "event binding created");
        Ok(())
    }
}

/// Stop propagation, then prevent the default, then run `handler`.
fn fire(event: &mut Event, modifiers: Modifiers, handler: impl FnOnce(&Event)) {
    if modifiers.contains(Modifiers::STOP) {
        event.stop_propagation();
    }
    if modifiers.contains(Modifiers::PREVENT) {
        event.prevent_default();
    }
    handler(event);
}

/// Compile `component`'s view tree with the default syntax.
pub fn compile<C: Component + ?Sized>(component: &C) -> Result<()> {
    Compiler::new(component).compile()
}
