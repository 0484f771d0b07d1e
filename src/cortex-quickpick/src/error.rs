//! Prompter error types.

use thiserror::Error;

/// Errors surfaced by [`QuickPickPrompter::prompt_user`](crate::QuickPickPrompter::prompt_user)
/// and settings parsing.
///
/// Load failures are not part of this enum: they are recovered inside
/// `load_items` and shown as an error row instead.
#[derive(Error, Debug)]
pub enum PromptError {
    /// The surface dropped its event channel without reporting a hide.
    #[error("Picker surface closed before a selection was made")]
    SurfaceClosed,

    /// The accepted item's deferred value failed to resolve.
    #[error("Failed to resolve value for '{label}': {source}")]
    Deferred {
        label: String,
        #[source]
        source: anyhow::Error,
    },

    /// Settings could not be parsed.
    #[error("Invalid prompter settings: {0}")]
    Settings(String),
}

impl From<toml::de::Error> for PromptError {
    fn from(err: toml::de::Error) -> Self {
        PromptError::Settings(err.to_string())
    }
}

/// Result type for prompter operations.
pub type Result<T> = std::result::Result<T, PromptError>;
