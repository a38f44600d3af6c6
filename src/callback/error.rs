//! Callback error types
//!
//! Three layers, matching when the problem can be detected:
//! - [`CallbackError`]: raised by a callback function for one set of values
//! - [`RegistryError`]: wiring mistakes caught when a binding is registered
//! - [`DispatchError`]: failures while invoking a binding

use thiserror::Error;

use super::reference::PropRef;

/// Errors raised from inside a callback function
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallbackError {
    /// An argument could not be used (e.g. text where a number is required)
    #[error("Invalid value for argument {index}: {reason}")]
    InvalidInput { index: usize, reason: String },

    /// The function asked for more arguments than the binding declares
    #[error("Missing argument {0}")]
    MissingArgument(usize),

    /// Any other failure
    #[error("Callback failed: {0}")]
    Failed(String),

    /// Leave every output as it is; not a failure
    #[error("Update prevented")]
    PreventUpdate,
}

/// Result type for callback functions
pub type CallbackResult<T> = Result<T, CallbackError>;

/// Errors raised while registering bindings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A callback needs at least one output")]
    NoOutputs,

    #[error("A callback needs at least one input")]
    NoInputs,

    /// Each output may be written by exactly one binding
    #[error("Output {0} is already bound by another callback")]
    DuplicateOutput(PropRef),

    /// A binding listed one of its own outputs as an input
    #[error("Callback output {0} is also one of its inputs")]
    SelfDependency(PropRef),

    /// Outputs feeding inputs form a loop
    #[error("Callback graph has a cycle through {0}")]
    Cycle(PropRef),

    /// A reference names a component that is not in the layout
    #[error("Callback references {0}, but no component has that id")]
    UnknownComponent(PropRef),
}

/// Result type for registration
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while invoking a binding
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The callback function itself failed
    #[error("Callback for {output} failed: {source}")]
    Callback {
        output: String,
        #[source]
        source: CallbackError,
    },

    /// The function returned the wrong number of values
    #[error("Callback for {output} returned {returned} values, expected {expected}")]
    ShapeMismatch {
        output: String,
        expected: usize,
        returned: usize,
    },

    /// The caller supplied the wrong number of argument values
    #[error("Callback for {output} takes {expected} arguments, got {received}")]
    ArgumentCount {
        output: String,
        expected: usize,
        received: usize,
    },

    /// No binding writes the requested outputs
    #[error("No callback bound to {0}")]
    UnknownBinding(String),

    /// A textual reference could not be parsed
    #[error("Invalid property reference {0}")]
    InvalidReference(String),
}

impl DispatchError {
    /// True when the callback opted out of updating rather than failing
    pub fn is_prevent_update(&self) -> bool {
        matches!(
            self,
            DispatchError::Callback {
                source: CallbackError::PreventUpdate,
                ..
            }
        )
    }
}

/// Result type for dispatch
pub type DispatchResult<T> = Result<T, DispatchError>;
