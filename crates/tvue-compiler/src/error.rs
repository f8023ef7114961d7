use thiserror::Error;
use tvue_reactive::BindingError;

pub type Result<T> = std::result::Result<T, CompileError>;

/// A template referenced something that does not exist.
///
/// Plain markup never produces these: unknown directives and text without
/// interpolation compile to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("`{directive}`: {source}")]
    Binding {
        directive: String,
        #[source]
        source: BindingError,
    },

    #[error("binding resolution failure: `{event}` handler `{name}` is not a registered method")]
    MissingMethod { name: String, event: String },
}

impl CompileError {
    pub(crate) fn binding(directive: impl Into<String>, source: BindingError) -> Self {
        Self::Binding {
            directive: directive.into(),
            source,
        }
    }
}
