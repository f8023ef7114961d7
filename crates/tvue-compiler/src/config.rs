#![forbid(unsafe_code)]

//! Template syntax configuration.
//!
//! The defaults match the usual `v-`/`@`/`{{ }}` template syntax. Any subset
//! of fields may be overridden from TOML:
//!
//! ```toml
//! prefix = "x-"
//! interpolation_open = "[["
//! interpolation_close = "]]"
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid directive syntax TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("directive syntax marker `{field}` must not be empty")]
    EmptyMarker { field: &'static str },

    #[error("interpolation delimiters must differ, both are `{delimiter}`")]
    SameDelimiters { delimiter: String },
}

/// Markers the compiler recognizes in templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveSyntax {
    /// Prefix of every value and long-form action directive (`v-`).
    pub prefix: String,
    /// Shorthand for the action directive (`@`).
    pub event_shorthand: String,
    /// Name of the long-form action directive after the prefix (`on`).
    pub event_directive: String,
    pub interpolation_open: String,
    pub interpolation_close: String,
}

impl Default for DirectiveSyntax {
    fn default() -> Self {
        Self {
            prefix: "v-".to_owned(),
            event_shorthand: "@".to_owned(),
            event_directive: "on".to_owned(),
            interpolation_open: "{{".to_owned(),
            interpolation_close: "}}".to_owned(),
        }
    }
}

impl DirectiveSyntax {
    /// Parse and validate a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let syntax: Self = toml::from_str(source)?;
        syntax.validate()?;
        Ok(syntax)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let markers = [
            ("prefix", &self.prefix),
            ("event_shorthand", &self.event_shorthand),
            ("event_directive", &self.event_directive),
            ("interpolation_open", &self.interpolation_open),
            ("interpolation_close", &self.interpolation_close),
        ];
        if let Some((field, _)) = markers.into_iter().find(|(_, marker)| marker.is_empty()) {
            return Err(ConfigError::EmptyMarker { field });
        }
        if self.interpolation_open == self.interpolation_close {
            return Err(ConfigError::SameDelimiters {
                delimiter: self.interpolation_open.clone(),
            });
        }
        Ok(())
    }
}
