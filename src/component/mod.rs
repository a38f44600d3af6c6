//! Component trees
//!
//! Declarative UI descriptions: [`html`] elements, [`widgets`], and a
//! [`generate_table`] helper for datasets.

pub mod widgets;
mod error;
pub mod html;
mod node;
mod table;

pub use error::{ComponentError, ComponentResult};
pub use node::{Child, Component, Namespace, CHILDREN};
pub use table::generate_table;
