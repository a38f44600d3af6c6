//! Component tree nodes
//!
//! A [`Component`] is an immutable description of one UI element: a kind
//! (`Div`, `Graph`, ...), the library namespace it belongs to, a property map
//! and an ordered list of children. Trees are built once with the builder
//! methods and rebuilt (never mutated) when a property changes.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use super::error::{ComponentError, ComponentResult};

/// Property name holding a component's children
pub const CHILDREN: &str = "children";

/// Component library a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Plain HTML elements (Div, H1, Table, ...)
    Html,
    /// Interactive widgets (Graph, Input, Dropdown, Slider, Markdown)
    Core,
}

impl Namespace {
    /// Name used by the rendering runtime to resolve the component
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Html => "dash_html_components",
            Namespace::Core => "dash_core_components",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single child: literal text or a nested component
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Text(String),
    Node(Component),
}

impl Child {
    fn to_value(&self) -> Value {
        match self {
            Child::Text(text) => Value::String(text.clone()),
            Child::Node(node) => node.to_value(),
        }
    }
}

impl From<Component> for Child {
    fn from(node: Component) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

/// Immutable UI description node
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    kind: String,
    namespace: Namespace,
    props: BTreeMap<String, Value>,
    children: Vec<Child>,
}

impl Component {
    /// Create an empty node of the given kind
    pub fn new(namespace: Namespace, kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            namespace,
            props: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set the identifier used for callback wiring
    pub fn id(self, id: impl Into<String>) -> Self {
        self.prop("id", Value::String(id.into()))
    }

    /// Builder: set an arbitrary property
    ///
    /// Setting `children` through here replaces any typed children.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_prop(&key.into(), value.into());
        self
    }

    /// Builder: set the inline style map
    pub fn style(self, style: Value) -> Self {
        self.prop("style", style)
    }

    /// Builder: set the CSS class name
    pub fn class_name(self, class: impl Into<String>) -> Self {
        self.prop("className", Value::String(class.into()))
    }

    /// Builder: append a child
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.props.remove(CHILDREN);
        self.children.push(child.into());
        self
    }

    /// Builder: append several children
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.props.remove(CHILDREN);
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The wiring identifier, if one was assigned
    pub fn component_id(&self) -> Option<&str> {
        self.props.get("id").and_then(Value::as_str)
    }

    pub fn child_nodes(&self) -> &[Child] {
        &self.children
    }

    /// Read a property, including `children` rendered as a value
    pub fn get_prop(&self, key: &str) -> Option<Value> {
        if key == CHILDREN {
            return self.children_value();
        }
        self.props.get(key).cloned()
    }

    /// All properties, with `children` folded in when present
    pub fn props(&self) -> Map<String, Value> {
        let mut map: Map<String, Value> = self
            .props
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(children) = self.children_value() {
            map.insert(CHILDREN.to_string(), children);
        }
        map
    }

    /// Children as the runtime expects them: a bare string for a single text
    /// child, otherwise a list
    fn children_value(&self) -> Option<Value> {
        match self.children.as_slice() {
            [] => self.props.get(CHILDREN).cloned(),
            [Child::Text(text)] => Some(Value::String(text.clone())),
            [Child::Node(node)] => Some(node.to_value()),
            many => Some(Value::Array(many.iter().map(Child::to_value).collect())),
        }
    }

    fn set_prop(&mut self, key: &str, value: Value) {
        if key != CHILDREN {
            self.props.insert(key.to_string(), value);
            return;
        }

        self.children.clear();
        self.props.remove(CHILDREN);
        match value {
            Value::String(text) => self.children.push(Child::Text(text)),
            other => {
                self.props.insert(CHILDREN.to_string(), other);
            }
        }
    }

    /// Serialize into the runtime's layout format
    pub fn to_value(&self) -> Value {
        let mut node = Map::new();
        node.insert("type".to_string(), Value::String(self.kind.clone()));
        node.insert(
            "namespace".to_string(),
            Value::String(self.namespace.as_str().to_string()),
        );
        node.insert("props".to_string(), Value::Object(self.props()));
        Value::Object(node)
    }

    /// Find the node carrying `id` (depth-first, pre-order)
    pub fn find(&self, id: &str) -> Option<&Component> {
        if self.component_id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            Child::Node(node) => node.find(id),
            Child::Text(_) => None,
        })
    }

    /// Every node in the tree, pre-order
    pub fn descendants(&self) -> Vec<&Component> {
        let mut out = Vec::new();
        self.collect_nodes(&mut out);
        out
    }

    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a Component>) {
        out.push(self);
        for child in &self.children {
            if let Child::Node(node) = child {
                node.collect_nodes(out);
            }
        }
    }

    /// Identifiers of every wired node, pre-order
    pub fn ids(&self) -> Vec<&str> {
        self.descendants()
            .into_iter()
            .filter_map(Component::component_id)
            .collect()
    }

    /// Reject trees where two nodes share an identifier
    pub fn validate_ids(&self) -> ComponentResult<()> {
        let mut seen = HashSet::new();
        for id in self.ids() {
            if !seen.insert(id) {
                return Err(ComponentError::DuplicateId(id.to_string()));
            }
        }
        Ok(())
    }

    /// Return a new tree with one property of node `id` replaced
    pub fn with_prop(&self, id: &str, property: &str, value: Value) -> ComponentResult<Component> {
        self.rebuild_with(id, property, &value)
            .ok_or_else(|| ComponentError::UnknownId(id.to_string()))
    }

    fn rebuild_with(&self, id: &str, property: &str, value: &Value) -> Option<Component> {
        if self.component_id() == Some(id) {
            let mut next = self.clone();
            next.set_prop(property, value.clone());
            return Some(next);
        }

        for (idx, child) in self.children.iter().enumerate() {
            if let Child::Node(node) = child {
                if let Some(replaced) = node.rebuild_with(id, property, value) {
                    let mut next = self.clone();
                    next.children[idx] = Child::Node(replaced);
                    return Some(next);
                }
            }
        }
        None
    }
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Component {
        Component::new(Namespace::Html, "Div")
            .child(Component::new(Namespace::Html, "H1").child("Title"))
            .child(
                Component::new(Namespace::Core, "Input")
                    .id("my-input")
                    .prop("value", "initial value"),
            )
            .child(Component::new(Namespace::Html, "Div").id("my-div"))
    }

    #[test]
    fn test_serialize_layout() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["type"], "Div");
        assert_eq!(value["namespace"], "dash_html_components");
        assert_eq!(value["props"]["children"][0]["props"]["children"], "Title");
        assert_eq!(value["props"]["children"][1]["namespace"], "dash_core_components");
        assert_eq!(value["props"]["children"][1]["props"]["value"], "initial value");
    }

    #[test]
    fn test_find_and_ids() {
        let tree = sample();

        assert_eq!(tree.ids(), vec!["my-input", "my-div"]);
        assert_eq!(tree.find("my-input").unwrap().kind(), "Input");
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let tree = Component::new(Namespace::Html, "Div")
            .child(Component::new(Namespace::Html, "P").id("a"))
            .child(Component::new(Namespace::Html, "P").id("a"));

        assert!(matches!(
            tree.validate_ids(),
            Err(ComponentError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_with_prop_rebuilds_without_mutation() {
        let tree = sample();
        let next = tree
            .with_prop("my-div", CHILDREN, json!("You've entered \"x\""))
            .unwrap();

        assert_eq!(tree.find("my-div").unwrap().get_prop(CHILDREN), None);
        assert_eq!(
            next.find("my-div").unwrap().get_prop(CHILDREN),
            Some(json!("You've entered \"x\""))
        );
        assert!(tree.with_prop("nope", "value", json!(1)).is_err());
    }

    #[test]
    fn test_structured_children_prop() {
        let node = Component::new(Namespace::Html, "Div")
            .child("old")
            .prop(CHILDREN, json!([1, 2]));

        assert!(node.child_nodes().is_empty());
        assert_eq!(node.get_prop(CHILDREN), Some(json!([1, 2])));

        let mut numeric = node.clone();
        numeric.set_prop(CHILDREN, json!(25));
        assert_eq!(numeric.get_prop(CHILDREN), Some(json!(25)));
        assert_eq!(numeric.to_value()["props"]["children"], json!(25));

        numeric.set_prop(CHILDREN, json!(true));
        assert_eq!(numeric.get_prop(CHILDREN), Some(json!(true)));
    }
}
