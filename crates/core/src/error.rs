use crate::hierarchy::Level;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A string did not fully match the expected hierarchy id pattern(s).
    #[error("Invalid {target}: expected '{expected}', got '{input}'")]
    Format {
        /// Name of the type that was being parsed, e.g. `ShotId`.
        target: &'static str,
        /// Anchored pattern(s) the input was matched against.
        expected: String,
        input: String,
    },

    /// A hierarchy id of the wrong level (or an unsupported value kind)
    /// was supplied where a specific level is required.
    #[error("Type mismatch: expected {expected} level, got {actual}")]
    TypeMismatch { expected: Level, actual: String },

    /// A raw scenario tree is not shaped like a project hierarchy.
    #[error("Structural error at {path}: {message}")]
    Structural { path: String, message: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    pub(crate) fn structural(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            path: path.into(),
            message: message.into(),
        }
    }
}
