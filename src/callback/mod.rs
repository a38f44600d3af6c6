//! Callbacks
//!
//! Declarative input→output bindings between component properties:
//! - [`reference`]: `id.property` references and the multi-output form
//! - [`registry`]: registration, validation and topological ordering
//! - [`session`]: per-client property state and dispatch

mod args;
mod error;
pub mod reference;
pub mod registry;
pub mod session;

pub use args::{CallbackArgs, Outputs};
pub use error::{
    CallbackError, CallbackResult, DispatchError, DispatchResult, RegistryError, RegistryResult,
};
pub use reference::{format_outputs, parse_outputs, PropRef};
pub use registry::{BindingHandle, CallbackBinding, CallbackFn, CallbackRegistry, Dependency};
pub use session::{BindingFailure, Dispatch, PropUpdate, PropertyStore, Session};
