use thiserror::Error;

pub type Result<T> = std::result::Result<T, BindingError>;

/// A binding could not be resolved against the observed data.
///
/// Both variants indicate a malformed template or a programming mistake,
/// never missing optional content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("binding resolution failure: property `{path}` is not observed")]
    UnobservedProperty { path: String },

    #[error("binding resolution failure: `{segment}` in `{path}` is not an object")]
    NotAnObject { path: String, segment: String },
}

impl BindingError {
    #[must_use]
    pub fn unobserved(path: impl Into<String>) -> Self {
        Self::UnobservedProperty { path: path.into() }
    }

    /// The full property path the failed binding referred to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::UnobservedProperty { path } | Self::NotAnObject { path, .. } => path,
        }
    }
}
