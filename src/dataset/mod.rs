//! Datasets
//!
//! Read-only tables loaded once at startup and shared with callbacks through
//! `Arc`. Callbacks narrow them with [`DatasetView`] filters, which borrow the
//! table instead of copying it.

mod error;
mod source;
mod table;
mod view;

pub use error::{DatasetError, DatasetResult};
pub use source::{load, source_for, DataSource, LocalFile, RemoteCsv};
pub use table::{number_value, Cell, Dataset};
pub use view::{DatasetView, Row};
