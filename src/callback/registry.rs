//! Callback Registry
//!
//! Holds every binding of an app: ordered output references, ordered input
//! references, ordered state references and a pure function. Registration
//! happens once at setup; afterwards the registry is only read, so one
//! instance can serve any number of sessions.
//!
//! Wiring mistakes are rejected at registration time:
//! - an output written by two bindings
//! - a binding reading its own output
//! - a cycle through chained bindings
//!
//! Bindings are ranked topologically (a binding whose output feeds another's
//! input ranks lower), which gives dispatch a deterministic order.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use super::args::{CallbackArgs, Outputs};
use super::error::{
    CallbackResult, DispatchError, DispatchResult, RegistryError, RegistryResult,
};
use super::reference::{format_outputs, parse_outputs, PropRef};
use crate::component::Component;

/// Shared callback function type
pub type CallbackFn = Arc<dyn Fn(&CallbackArgs<'_>) -> CallbackResult<Outputs> + Send + Sync>;

/// Identifies a registered binding; returned by [`CallbackRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingHandle(u64);

/// One input→output binding
#[derive(Clone)]
pub struct CallbackBinding {
    outputs: Vec<PropRef>,
    inputs: Vec<PropRef>,
    states: Vec<PropRef>,
    func: CallbackFn,
}

impl fmt::Debug for CallbackBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackBinding")
            .field("outputs", &self.outputs)
            .field("inputs", &self.inputs)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

impl CallbackBinding {
    pub fn outputs(&self) -> &[PropRef] {
        &self.outputs
    }

    pub fn inputs(&self) -> &[PropRef] {
        &self.inputs
    }

    pub fn states(&self) -> &[PropRef] {
        &self.states
    }

    /// Textual output spec (`id.prop` or `..a.x...b.y..`)
    pub fn output_spec(&self) -> String {
        format_outputs(&self.outputs)
    }

    /// Run the function and pair each returned value with its output
    ///
    /// Nothing is written anywhere; the caller decides what to do with the
    /// result. Either every output gets a value or an error is returned.
    pub fn invoke(
        &self,
        inputs: &[Value],
        states: &[Value],
    ) -> DispatchResult<Vec<(PropRef, Value)>> {
        let expected = self.inputs.len() + self.states.len();
        let received = inputs.len() + states.len();
        if inputs.len() != self.inputs.len() || states.len() != self.states.len() {
            return Err(DispatchError::ArgumentCount {
                output: self.output_spec(),
                expected,
                received,
            });
        }

        let mut values = Vec::with_capacity(expected);
        values.extend_from_slice(inputs);
        values.extend_from_slice(states);

        let returned = (self.func)(&CallbackArgs::new(&values)).map_err(|source| {
            DispatchError::Callback {
                output: self.output_spec(),
                source,
            }
        })?;

        let values = returned
            .into_values(self.outputs.len())
            .map_err(|returned| DispatchError::ShapeMismatch {
                output: self.output_spec(),
                expected: self.outputs.len(),
                returned,
            })?;

        Ok(self.outputs.iter().cloned().zip(values).collect())
    }
}

/// Serializable description of a binding, as the rendering runtime expects
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dependency {
    pub output: String,
    pub inputs: Vec<PropRef>,
    pub state: Vec<PropRef>,
}

/// Registry of all bindings in an app
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    bindings: BTreeMap<BindingHandle, CallbackBinding>,
    ranks: HashMap<BindingHandle, usize>,
    next_handle: u64,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding
    ///
    /// The function receives inputs followed by states, in declared order,
    /// and returns one value per output in declared order.
    pub fn register<F>(
        &mut self,
        outputs: Vec<PropRef>,
        inputs: Vec<PropRef>,
        states: Vec<PropRef>,
        func: F,
    ) -> RegistryResult<BindingHandle>
    where
        F: Fn(&CallbackArgs<'_>) -> CallbackResult<Outputs> + Send + Sync + 'static,
    {
        if outputs.is_empty() {
            return Err(RegistryError::NoOutputs);
        }
        if inputs.is_empty() {
            return Err(RegistryError::NoInputs);
        }

        let mut seen = BTreeSet::new();
        for output in &outputs {
            if !seen.insert(output) || self.binding_for_output(output).is_some() {
                return Err(RegistryError::DuplicateOutput(output.clone()));
            }
            if inputs.contains(output) {
                return Err(RegistryError::SelfDependency(output.clone()));
            }
        }

        let handle = BindingHandle(self.next_handle);
        self.next_handle += 1;
        self.bindings.insert(
            handle,
            CallbackBinding {
                outputs,
                inputs,
                states,
                func: Arc::new(func),
            },
        );

        match compute_ranks(&self.bindings) {
            Ok(ranks) => self.ranks = ranks,
            Err(at) => {
                self.bindings.remove(&handle);
                return Err(RegistryError::Cycle(at));
            }
        }

        let binding = &self.bindings[&handle];
        tracing::debug!(
            output = %binding.output_spec(),
            inputs = binding.inputs.len(),
            states = binding.states.len(),
            "Registered callback"
        );
        Ok(handle)
    }

    /// Remove a binding; returns false if the handle was unknown
    pub fn unregister(&mut self, handle: BindingHandle) -> bool {
        if self.bindings.remove(&handle).is_none() {
            return false;
        }
        // Removing a node never introduces a cycle
        if let Ok(ranks) = compute_ranks(&self.bindings) {
            self.ranks = ranks;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, handle: BindingHandle) -> Option<&CallbackBinding> {
        self.bindings.get(&handle)
    }

    pub(crate) fn rank(&self, handle: BindingHandle) -> usize {
        self.ranks.get(&handle).copied().unwrap_or(0)
    }

    /// All handles, upstream bindings first
    pub fn handles_in_order(&self) -> Vec<BindingHandle> {
        let mut handles: Vec<BindingHandle> = self.bindings.keys().copied().collect();
        handles.sort_by_key(|h| (self.rank(*h), *h));
        handles
    }

    /// Bindings that re-run when `target` changes
    pub fn triggered_by(&self, target: &PropRef) -> Vec<BindingHandle> {
        self.bindings
            .iter()
            .filter(|(_, b)| b.inputs.contains(target))
            .map(|(h, _)| *h)
            .collect()
    }

    /// The binding writing `target`, if any
    pub fn binding_for_output(&self, target: &PropRef) -> Option<(BindingHandle, &CallbackBinding)> {
        self.bindings
            .iter()
            .find(|(_, b)| b.outputs.contains(target))
            .map(|(h, b)| (*h, b))
    }

    /// Resolve a textual output spec to the binding that declares exactly
    /// those outputs, in that order
    pub fn binding_for_spec(&self, spec: &str) -> DispatchResult<(BindingHandle, &CallbackBinding)> {
        let outputs = parse_outputs(spec)?;
        self.bindings
            .iter()
            .find(|(_, b)| b.outputs == outputs)
            .map(|(h, b)| (*h, b))
            .ok_or_else(|| DispatchError::UnknownBinding(spec.to_string()))
    }

    /// Check every reference against the ids present in a layout
    pub fn validate_against(&self, layout: &Component) -> RegistryResult<()> {
        let ids: BTreeSet<&str> = layout.ids().into_iter().collect();
        for binding in self.bindings.values() {
            let refs = binding
                .outputs
                .iter()
                .chain(&binding.inputs)
                .chain(&binding.states);
            for r in refs {
                if !ids.contains(r.id.as_str()) {
                    return Err(RegistryError::UnknownComponent(r.clone()));
                }
            }
        }
        Ok(())
    }

    /// Every binding as the rendering runtime describes it
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.handles_in_order()
            .into_iter()
            .map(|h| {
                let b = &self.bindings[&h];
                Dependency {
                    output: b.output_spec(),
                    inputs: b.inputs.clone(),
                    state: b.states.clone(),
                }
            })
            .collect()
    }
}

/// Longest-path rank of every binding over output→input edges
///
/// Fails with an output on the cycle if the graph is not acyclic.
fn compute_ranks(
    bindings: &BTreeMap<BindingHandle, CallbackBinding>,
) -> Result<HashMap<BindingHandle, usize>, PropRef> {
    let mut producers: HashMap<&PropRef, BindingHandle> = HashMap::new();
    for (handle, binding) in bindings {
        for output in &binding.outputs {
            producers.insert(output, *handle);
        }
    }

    let mut downstream: BTreeMap<BindingHandle, BTreeSet<BindingHandle>> = BTreeMap::new();
    let mut indegree: HashMap<BindingHandle, usize> = bindings.keys().map(|h| (*h, 0)).collect();
    for (handle, binding) in bindings {
        let upstream: BTreeSet<BindingHandle> = binding
            .inputs
            .iter()
            .filter_map(|input| producers.get(input).copied())
            .collect();
        for producer in upstream {
            if downstream.entry(producer).or_default().insert(*handle) {
                *indegree.entry(*handle).or_default() += 1;
            }
        }
    }

    let mut queue: VecDeque<BindingHandle> = bindings
        .keys()
        .copied()
        .filter(|h| indegree[h] == 0)
        .collect();
    let mut ranks: HashMap<BindingHandle, usize> = HashMap::new();
    let mut processed = 0;

    while let Some(handle) = queue.pop_front() {
        processed += 1;
        let rank = *ranks.entry(handle).or_insert(0);
        for next in downstream.get(&handle).into_iter().flatten() {
            let next_rank = ranks.entry(*next).or_insert(0);
            *next_rank = (*next_rank).max(rank + 1);

            if let Some(degree) = indegree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*next);
                }
            }
        }
    }

    if processed == bindings.len() {
        return Ok(ranks);
    }

    let stuck = bindings
        .iter()
        .find(|(h, _)| indegree[*h] > 0)
        .map(|(_, b)| b.outputs[0].clone());
    Err(stuck.unwrap_or_else(|| PropRef::new("?", "?")))
}
