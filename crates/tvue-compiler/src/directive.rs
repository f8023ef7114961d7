#![forbid(unsafe_code)]

//! Directive and interpolation parsing.
//!
//! An attribute is a directive when its name starts with the configured
//! prefix (`v-`) or event shorthand (`@`). The directive kind is resolved once,
//! here, into a closed [`DirectiveKind`]; the compiler dispatches on it.

use bitflags::bitflags;
use tvue_reactive::Data;

use crate::config::DirectiveSyntax;

bitflags! {
    /// Event modifiers, applied in declaration order of the flags before the
    /// handler runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const STOP = 1 << 0;
        const PREVENT = 1 << 1;
    }
}

impl Modifiers {
    /// The modifier named by a `.token` suffix, if it is recognized.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "stop" => Some(Self::STOP),
            "prevent" => Some(Self::PREVENT),
            _ => None,
        }
    }
}

/// What a directive does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Replace the element's text.
    Text,
    /// Two-way bind the element's form value.
    Model,
    /// Replace the element's markup.
    Html,
    /// Call a method when `event` fires.
    On { event: String, modifiers: Modifiers },
    /// A prefixed attribute with no handler. Ignored by the compiler.
    Unknown(String),
}

/// A parsed directive attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The attribute name as written.
    pub attribute: String,
    pub kind: DirectiveKind,
    /// Property key for value directives, method name for `On`.
    pub expression: String,
}

impl Directive {
    /// Parse an attribute. Returns `None` for attributes that are not
    /// directives at all.
    #[must_use]
    pub fn parse(name: &str, value: &str, syntax: &DirectiveSyntax) -> Option<Self> {
        let expression = value.trim().to_owned();
        let kind = if let Some(rest) = name.strip_prefix(syntax.event_shorthand.as_str()) {
            on_directive(rest)
        } else {
            let rest = name.strip_prefix(syntax.prefix.as_str())?;
            let (head, tokens) = split_modifiers(rest);
            match head {
                "text" => DirectiveKind::Text,
                "model" => DirectiveKind::Model,
                "html" => DirectiveKind::Html,
                _ if head == syntax.event_directive => on_directive(""),
                _ => match head
                    .strip_prefix(syntax.event_directive.as_str())
                    .and_then(|h| h.strip_prefix(':'))
                {
                    Some(_) => {
                        let after = &rest[syntax.event_directive.len() + 1..];
                        on_directive(after)
                    }
                    None => {
                        if !tokens.is_empty() {
                            tracing::trace!(attribute = name, "modifiers on unknown directive");
                        }
                        DirectiveKind::Unknown(head.to_owned())
                    }
                },
            }
        };
        Some(Self {
            attribute: name.to_owned(),
            kind,
            expression,
        })
    }
}

/// Split `head.mod1.mod2` into the head and its modifier tokens.
fn split_modifiers(s: &str) -> (&str, Vec<&str>) {
    let mut parts = s.split('.');
    let head = parts.next().unwrap_or_default();
    (head, parts.collect())
}

/// Build an `On` kind from `event.mod1.mod2`.
fn on_directive(name: &str) -> DirectiveKind {
    let (event, tokens) = split_modifiers(name);
    let modifiers = tokens.iter().fold(Modifiers::empty(), |acc, token| {
        match Modifiers::from_token(token) {
            Some(m) => acc | m,
            None => {
                tracing::debug!(modifier = *token, event, "ignoring unknown event modifier");
                acc
            }
        }
    });
    DirectiveKind::On {
        event: event.to_owned(),
        modifiers,
    }
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// A text node containing one `{{ key }}` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    pub prefix: String,
    pub key: String,
    pub suffix: String,
}

impl Interpolation {
    /// Find the first delimited expression in `text`. Empty expressions and
    /// unterminated delimiters are not interpolations.
    #[must_use]
    pub fn find(text: &str, syntax: &DirectiveSyntax) -> Option<Self> {
        let open = text.find(syntax.interpolation_open.as_str())?;
        let body_start = open + syntax.interpolation_open.len();
        let close = text[body_start..].find(syntax.interpolation_close.as_str())?;
        let key = text[body_start..body_start + close].trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            prefix: text[..open].to_owned(),
            key: key.to_owned(),
            suffix: text[body_start + close + syntax.interpolation_close.len()..].to_owned(),
        })
    }

    /// The text with `value` in place of the expression.
    #[must_use]
    pub fn render(&self, value: &Data) -> String {
        format!("{}{value}{}", self.prefix, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str, value: &str) -> Option<Directive> {
        Directive::parse(name, value, &DirectiveSyntax::default())
    }

    fn kind(name: &str) -> DirectiveKind {
        parse(name, "x").expect("is a directive").kind
    }

    #[test]
    fn plain_attributes_are_not_directives() {
        assert!(parse("class", "a").is_none());
        assert!(parse("id", "b").is_none());
    }

    #[test]
    fn value_directives() {
        assert_eq!(kind("v-text"), DirectiveKind::Text);
        assert_eq!(kind("v-model"), DirectiveKind::Model);
        assert_eq!(kind("v-html"), DirectiveKind::Html);
    }

    #[test]
    fn expression_is_trimmed() {
        assert_eq!(parse("v-text", "  msg ").unwrap().expression, "msg");
    }

    #[test]
    fn shorthand_and_long_form_are_equivalent() {
        let short = kind("@click.stop.prevent");
        let long = kind("v-on:click.stop.prevent");
        assert_eq!(short, long);
        assert_eq!(
            short,
            DirectiveKind::On {
                event: "click".into(),
                modifiers: Modifiers::STOP | Modifiers::PREVENT
            }
        );
    }

    #[test]
    fn unknown_modifiers_are_dropped() {
        assert_eq!(
            kind("@keyup.enter.stop"),
            DirectiveKind::On {
                event: "keyup".into(),
                modifiers: Modifiers::STOP
            }
        );
    }

    #[test]
    fn on_without_event_has_empty_event() {
        assert_eq!(
            kind("v-on"),
            DirectiveKind::On {
                event: String::new(),
                modifiers: Modifiers::empty()
            }
        );
    }

    #[test]
    fn on_prefix_does_not_swallow_other_names() {
        assert_eq!(kind("v-once"), DirectiveKind::Unknown("once".into()));
        assert_eq!(kind("v-foo"), DirectiveKind::Unknown("foo".into()));
    }

    #[test]
    fn custom_syntax() {
        let syntax = DirectiveSyntax {
            prefix: "x-".into(),
            event_shorthand: "!".into(),
            event_directive: "bind".into(),
            ..DirectiveSyntax::default()
        };
        let d = Directive::parse("x-bind:submit.prevent", "go", &syntax).unwrap();
        assert_eq!(
            d.kind,
            DirectiveKind::On {
                event: "submit".into(),
                modifiers: Modifiers::PREVENT
            }
        );
        assert!(Directive::parse("v-text", "m", &syntax).is_none());
        assert!(Directive::parse("!click", "go", &syntax).is_some());
    }

    #[test]
    fn finds_interpolation() {
        let syntax = DirectiveSyntax::default();
        let interp = Interpolation::find("Hello, {{ name }}!", &syntax).unwrap();
        assert_eq!(interp.key, "name");
        assert_eq!(interp.render(&Data::from("Ada")), "Hello, Ada!");
    }

    #[test]
    fn only_first_interpolation_is_recognized() {
        let syntax = DirectiveSyntax::default();
        let interp = Interpolation::find("{{a}} and {{b}}", &syntax).unwrap();
        assert_eq!(interp.key, "a");
        assert_eq!(interp.suffix, " and {{b}}");
    }

    #[test]
    fn rejects_empty_and_unterminated() {
        let syntax = DirectiveSyntax::default();
        assert!(Interpolation::find("plain text", &syntax).is_none());
        assert!(Interpolation::find("{{  }}", &syntax).is_none());
        assert!(Interpolation::find("{{ open", &syntax).is_none());
    }
}
