//! Sessions
//!
//! A [`Session`] holds the current property values of one client and drives
//! the registry: one startup pass populating every output, then one dispatch
//! per input change. Outputs are written only when a binding succeeds; a
//! failing binding leaves its previous outputs in place.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::error::DispatchError;
use super::reference::PropRef;
use super::registry::{BindingHandle, CallbackRegistry};
use crate::component::{Component, ComponentResult};

/// Current value of every known property
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    values: HashMap<PropRef, Value>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from every property of every component carrying an id
    pub fn from_layout(layout: &Component) -> Self {
        let mut values = HashMap::new();
        for node in layout.descendants() {
            let Some(id) = node.component_id() else {
                continue;
            };
            for (property, value) in node.props() {
                values.insert(PropRef::new(id, property), value);
            }
        }
        Self { values }
    }

    pub fn get(&self, target: &PropRef) -> Option<&Value> {
        self.values.get(target)
    }

    /// Store a value, returning the previous one
    pub fn set(&mut self, target: PropRef, value: Value) -> Option<Value> {
        self.values.insert(target, value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values for a list of references; unknown properties read as null
    fn collect(&self, refs: &[PropRef]) -> Vec<Value> {
        refs.iter()
            .map(|r| self.values.get(r).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// A property written by a binding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropUpdate {
    #[serde(flatten)]
    pub target: PropRef,
    pub value: Value,
}

/// A binding that failed during a dispatch
#[derive(Debug, Clone)]
pub struct BindingFailure {
    /// Output spec of the failing binding
    pub output: String,
    pub error: DispatchError,
}

/// Outcome of one startup pass or one input change
#[derive(Debug, Default)]
pub struct Dispatch {
    /// Written outputs, in the order they were written
    pub updates: Vec<PropUpdate>,
    /// Bindings that failed; their outputs were left untouched
    pub failures: Vec<BindingFailure>,
    /// Number of bindings invoked
    pub invoked: usize,
}

impl Dispatch {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Last value written to `target` in this dispatch
    pub fn value_of(&self, target: &PropRef) -> Option<&Value> {
        self.updates
            .iter()
            .rev()
            .find(|u| &u.target == target)
            .map(|u| &u.value)
    }
}

/// Property state of one client, driven by a shared registry
#[derive(Debug)]
pub struct Session<'r> {
    registry: &'r CallbackRegistry,
    store: PropertyStore,
}

impl<'r> Session<'r> {
    pub fn new(registry: &'r CallbackRegistry, layout: &Component) -> Self {
        Self {
            registry,
            store: PropertyStore::from_layout(layout),
        }
    }

    pub fn with_store(registry: &'r CallbackRegistry, store: PropertyStore) -> Self {
        Self { registry, store }
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    pub fn get(&self, target: &PropRef) -> Option<&Value> {
        self.store.get(target)
    }

    /// Invoke every binding once with initial values, upstream first
    pub fn start(&mut self) -> Dispatch {
        let mut dispatch = Dispatch::default();
        for handle in self.registry.handles_in_order() {
            self.run(handle, &mut dispatch);
        }

        tracing::debug!(
            invoked = dispatch.invoked,
            updates = dispatch.updates.len(),
            failures = dispatch.failures.len(),
            "Session started"
        );
        dispatch
    }

    /// Record a new input value and re-run every binding it triggers
    ///
    /// Bindings chained through the written outputs run in the same
    /// dispatch, each at most once, upstream first.
    pub fn apply_input_change(&mut self, target: PropRef, value: Value) -> Dispatch {
        let mut dispatch = Dispatch::default();
        let mut pending: BTreeSet<(usize, BindingHandle)> = self.ranked(&target);
        let mut done: HashSet<BindingHandle> = HashSet::new();

        self.store.set(target, value);

        while let Some((_, handle)) = pending.pop_first() {
            if !done.insert(handle) {
                continue;
            }
            for written in self.run(handle, &mut dispatch) {
                pending.extend(
                    self.ranked(&written)
                        .into_iter()
                        .filter(|(_, h)| !done.contains(h)),
                );
            }
        }

        dispatch
    }

    /// Current layout with every bound property folded back in
    pub fn snapshot(&self, layout: &Component) -> ComponentResult<Component> {
        let mut refs: Vec<&PropRef> = Vec::new();
        for handle in self.registry.handles_in_order() {
            if let Some(binding) = self.registry.get(handle) {
                refs.extend(binding.inputs().iter().chain(binding.outputs()));
            }
        }

        let mut current = layout.clone();
        for target in refs {
            if let Some(value) = self.store.get(target) {
                current = current.with_prop(&target.id, &target.property, value.clone())?;
            }
        }
        Ok(current)
    }

    fn ranked(&self, target: &PropRef) -> BTreeSet<(usize, BindingHandle)> {
        self.registry
            .triggered_by(target)
            .into_iter()
            .map(|h| (self.registry.rank(h), h))
            .collect()
    }

    /// Invoke one binding; returns the outputs it wrote
    fn run(&mut self, handle: BindingHandle, dispatch: &mut Dispatch) -> Vec<PropRef> {
        let registry = self.registry;
        let Some(binding) = registry.get(handle) else {
            return Vec::new();
        };

        let inputs = self.store.collect(binding.inputs());
        let states = self.store.collect(binding.states());
        dispatch.invoked += 1;

        match binding.invoke(&inputs, &states) {
            Ok(results) => {
                let mut written = Vec::with_capacity(results.len());
                for (target, value) in results {
                    self.store.set(target.clone(), value.clone());
                    dispatch.updates.push(PropUpdate {
                        target: target.clone(),
                        value,
                    });
                    written.push(target);
                }
                written
            }
            Err(e) if e.is_prevent_update() => {
                tracing::debug!(output = %binding.output_spec(), "Callback prevented update");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    output = %binding.output_spec(),
                    error = %e,
                    "Callback failed, keeping previous outputs"
                );
                dispatch.failures.push(BindingFailure {
                    output: binding.output_spec(),
                    error: e,
                });
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{CallbackArgs, CallbackError, Outputs};
    use crate::component::{html, widgets};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn r(spec: &str) -> PropRef {
        spec.parse().unwrap()
    }

    fn layout() -> Component {
        html::div()
            .child(widgets::input("num", "number", 3))
            .child(html::div().id("double"))
            .child(html::div().id("label"))
    }

    fn registry() -> CallbackRegistry {
        let mut registry = CallbackRegistry::new();
        registry
            .register(vec![r("label.children")], vec![r("double.children")], vec![], |args: &CallbackArgs<'_>| {
                Ok(json!(format!("double is {}", args.text(0)?)).into())
            })
            .unwrap();
        registry
            .register(vec![r("double.children")], vec![r("num.value")], vec![], |args: &CallbackArgs<'_>| {
                Ok(json!(args.f64(0)? * 2.0).into())
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_store_seeded_from_layout() {
        let store = PropertyStore::from_layout(&layout());
        assert_eq!(store.get(&r("num.value")), Some(&json!(3)));
        assert_eq!(store.get(&r("num.type")), Some(&json!("number")));
        assert_eq!(store.get(&r("double.children")), None);
    }

    #[test]
    fn test_startup_populates_each_output_once() {
        let registry = registry();
        let mut session = Session::new(&registry, &layout());
        let dispatch = session.start();

        assert!(dispatch.is_ok());
        assert_eq!(dispatch.invoked, 2);
        assert_eq!(dispatch.updates.len(), 2);
        // Upstream binding ran first, so the label saw the computed value
        assert_eq!(session.get(&r("double.children")), Some(&json!(6.0)));
        assert_eq!(session.get(&r("label.children")), Some(&json!("double is 6.0")));
    }

    #[test]
    fn test_input_change_runs_chain() {
        let registry = registry();
        let mut session = Session::new(&registry, &layout());
        session.start();

        let dispatch = session.apply_input_change(r("num.value"), json!(10));
        assert_eq!(dispatch.invoked, 2);
        assert_eq!(dispatch.value_of(&r("double.children")), Some(&json!(20.0)));
        assert_eq!(dispatch.value_of(&r("label.children")), Some(&json!("double is 20.0")));
    }

    #[test]
    fn test_failure_keeps_previous_outputs() {
        let registry = registry();
        let mut session = Session::new(&registry, &layout());
        session.start();
        session.apply_input_change(r("num.value"), json!(4));

        let dispatch = session.apply_input_change(r("num.value"), json!("four"));

        assert_eq!(dispatch.failures.len(), 1);
        assert!(dispatch.updates.is_empty());
        assert!(matches!(
            dispatch.failures[0].error,
            DispatchError::Callback {
                source: CallbackError::InvalidInput { .. },
                ..
            }
        ));
        assert_eq!(session.get(&r("double.children")), Some(&json!(8.0)));
        assert_eq!(session.get(&r("label.children")), Some(&json!("double is 8.0")));
        // The input itself reflects what the user typed
        assert_eq!(session.get(&r("num.value")), Some(&json!("four")));
    }

    #[test]
    fn test_unrelated_change_invokes_nothing() {
        let registry = registry();
        let mut session = Session::new(&registry, &layout());
        session.start();

        let dispatch = session.apply_input_change(r("num.type"), json!("text"));
        assert_eq!(dispatch.invoked, 0);
        assert!(dispatch.updates.is_empty());
    }

    #[test]
    fn test_prevent_update_is_not_a_failure() {
        let mut registry = CallbackRegistry::new();
        registry
            .register(vec![r("double.children")], vec![r("num.value")], vec![], |args: &CallbackArgs<'_>| {
                if args.get(0)?.is_null() {
                    return Err(CallbackError::PreventUpdate);
                }
                Ok(Outputs::from(json!("set")))
            })
            .unwrap();

        let mut session = Session::new(&registry, &layout());
        session.start();
        let dispatch = session.apply_input_change(r("num.value"), Value::Null);

        assert!(dispatch.is_ok());
        assert!(dispatch.updates.is_empty());
        assert_eq!(session.get(&r("double.children")), Some(&json!("set")));
    }

    #[test]
    fn test_diamond_runs_each_binding_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = CallbackRegistry::new();
        registry
            .register(vec![r("a.children")], vec![r("num.value")], vec![], |_: &CallbackArgs<'_>| {
                Ok(json!("a").into())
            })
            .unwrap();
        registry
            .register(vec![r("b.children")], vec![r("num.value")], vec![], |_: &CallbackArgs<'_>| {
                Ok(json!("b").into())
            })
            .unwrap();
        let counter = Arc::clone(&calls);
        registry
            .register(
                vec![r("c.children")],
                vec![r("a.children"), r("b.children")],
                vec![],
                move |args: &CallbackArgs<'_>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(format!("{}{}", args.text(0)?, args.text(1)?)).into())
                },
            )
            .unwrap();

        let layout = html::div()
            .child(widgets::input("num", "number", 1))
            .children(["a", "b", "c"].map(|id| html::div().id(id)));
        let mut session = Session::new(&registry, &layout);
        session.apply_input_change(r("num.value"), json!(2));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.get(&r("c.children")), Some(&json!("ab")));
    }

    #[test]
    fn test_snapshot_folds_values_into_layout() {
        let registry = registry();
        let layout = layout();
        let mut session = Session::new(&registry, &layout);
        session.start();

        let snapshot = session.snapshot(&layout).unwrap();
        assert_eq!(
            snapshot.find("label").unwrap().get_prop("children"),
            Some(json!("double is 6.0"))
        );
        assert_eq!(layout.find("label").unwrap().get_prop("children"), None);
    }
}
