//! Interactive widget builders
//!
//! Graphs, inputs, dropdowns, sliders and markdown blocks. Widgets that take
//! part in callbacks are created with their identifier up front.

use serde_json::{json, Value};

use super::node::{Component, Namespace};

fn widget(kind: &str) -> Component {
    Component::new(Namespace::Core, kind)
}

/// Chart container; its `figure` prop holds a serialized figure
pub fn graph(id: impl Into<String>) -> Component {
    widget("Graph").id(id)
}

/// Free-form input box
pub fn input(id: impl Into<String>, input_type: &str, value: impl Into<Value>) -> Component {
    widget("Input")
        .id(id)
        .prop("type", input_type)
        .prop("value", value)
}

/// Single-select dropdown over `(label, value)` pairs
pub fn dropdown<I, V>(id: impl Into<String>, options: I, value: impl Into<Value>) -> Component
where
    I: IntoIterator<Item = (String, V)>,
    V: Into<Value>,
{
    let options: Vec<Value> = options
        .into_iter()
        .map(|(label, value)| json!({ "label": label, "value": value.into() }))
        .collect();

    widget("Dropdown")
        .id(id)
        .prop("options", Value::Array(options))
        .prop("value", value)
}

/// Numeric slider; `marks` maps positions to labels
pub fn slider(
    id: impl Into<String>,
    min: impl Into<Value>,
    max: impl Into<Value>,
    value: impl Into<Value>,
    marks: serde_json::Map<String, Value>,
) -> Component {
    widget("Slider")
        .id(id)
        .prop("min", min)
        .prop("max", max)
        .prop("value", value)
        .prop("marks", Value::Object(marks))
}

/// CommonMark text block
pub fn markdown(text: impl Into<String>) -> Component {
    widget("Markdown").child(text.into())
}
