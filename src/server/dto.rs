//! Data Transfer Objects
//!
//! Request and response types for the HTTP endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::callback::PropRef;

/// One property value supplied with an update request
#[derive(Debug, Clone, Deserialize)]
pub struct PropValue {
    pub id: String,
    pub property: String,
    /// Absent when the browser has no value yet; an explicit null is a value
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl PropValue {
    fn matches(&self, target: &PropRef) -> bool {
        self.id == target.id && self.property == target.property
    }
}

/// POST /_dash-update-component body
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    /// Output spec of the binding to run
    pub output: String,
    #[serde(default)]
    pub inputs: Vec<PropValue>,
    #[serde(default)]
    pub state: Vec<PropValue>,
}

impl UpdateRequest {
    /// Values for `refs`, in the order the binding declares them
    ///
    /// Returns the first reference without a supplied value on failure.
    pub fn values_for(supplied: &[PropValue], refs: &[PropRef]) -> Result<Vec<Value>, PropRef> {
        refs.iter()
            .map(|target| {
                supplied
                    .iter()
                    .find(|p| p.matches(target))
                    .and_then(|p| p.value.clone())
                    .ok_or_else(|| target.clone())
            })
            .collect()
    }
}

/// POST /_dash-update-component response: `{id: {property: value}}`
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub response: Map<String, Value>,
}

impl UpdateResponse {
    pub fn from_outputs(outputs: Vec<(PropRef, Value)>) -> Self {
        let mut response = Map::new();
        for (target, value) in outputs {
            let entry = response
                .entry(target.id)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(props) = entry {
                props.insert(target.property, value);
            }
        }
        Self { response }
    }
}

/// GET /_dash-config response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub name: String,
    pub title: String,
    pub external_stylesheets: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or degraded
    pub status: String,
    /// Served app name
    pub app: String,
    /// Registered callback bindings
    pub bindings: usize,
    /// Open WebSocket sessions
    pub sessions: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_follow_declared_order() {
        let supplied: Vec<PropValue> = serde_json::from_value(json!([
            {"id": "b", "property": "value", "value": 2},
            {"id": "a", "property": "value", "value": 1},
            {"id": "c", "property": "value"},
            {"id": "d", "property": "value", "value": null}
        ]))
        .unwrap();

        let refs = [PropRef::new("a", "value"), PropRef::new("b", "value")];
        assert_eq!(
            UpdateRequest::values_for(&supplied, &refs).unwrap(),
            vec![json!(1), json!(2)]
        );

        let cleared = [PropRef::new("d", "value")];
        assert_eq!(
            UpdateRequest::values_for(&supplied, &cleared).unwrap(),
            vec![Value::Null]
        );

        let missing = [PropRef::new("c", "value")];
        assert_eq!(
            UpdateRequest::values_for(&supplied, &missing),
            Err(PropRef::new("c", "value"))
        );
    }

    #[test]
    fn test_response_groups_by_component() {
        let response = UpdateResponse::from_outputs(vec![
            (PropRef::new("graph", "figure"), json!({})),
            (PropRef::new("graph", "style"), json!({"height": 300})),
            (PropRef::new("label", "children"), json!("hi")),
        ]);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"response": {
                "graph": {"figure": {}, "style": {"height": 300}},
                "label": {"children": "hi"}
            }})
        );
    }
}
