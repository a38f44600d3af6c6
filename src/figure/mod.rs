//! Figures
//!
//! Serializable chart descriptions in the shape a plotting front end
//! consumes: a list of traces plus a layout. Rendering happens elsewhere.

mod layout;
mod trace;

use serde::Serialize;
use serde_json::Value;

pub use layout::{Axis, AxisType, Font, Layout, Legend, Margin};
pub use trace::{Line, Marker, Trace, TraceKind};

/// A complete chart
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new(data: Vec<Trace>, layout: Layout) -> Self {
        Self { data, layout }
    }

    /// JSON form, as stored in a graph's `figure` property
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<Figure> for Value {
    fn from(figure: Figure) -> Self {
        figure.to_value()
    }
}
