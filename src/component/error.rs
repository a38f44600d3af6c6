//! Component tree errors

use thiserror::Error;

/// Errors raised while inspecting or rebuilding a component tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// Two nodes in the same layout carry the same identifier
    #[error("Duplicate component id: {0}")]
    DuplicateId(String),

    /// No node in the layout carries this identifier
    #[error("Unknown component id: {0}")]
    UnknownId(String),
}

/// Result type alias for component operations
pub type ComponentResult<T> = Result<T, ComponentError>;
