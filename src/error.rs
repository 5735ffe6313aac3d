use thiserror::Error;

/// Errors raised by the select component family.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// The options panel has no maximum height, so there is no bound to
    /// decide whether it fits above or below the trigger.
    #[error("Select options must have an explicit max height!")]
    MissingMaxHeight,
    /// A value was selected programmatically that none of the options carry.
    #[error("No option with this value exists.")]
    UnknownValue,
}

/// Errors raised while loading a theme.
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("failed to parse theme: {0}")]
    Parse(#[from] serde_json::Error),
}
