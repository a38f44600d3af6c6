//! Apps
//!
//! An [`App`] bundles a static layout, its callback registry and the page
//! metadata the runtime needs. It is built once, validated, and then shared
//! read-only (`Arc<App>`) by every session.

use serde_json::Value;
use thiserror::Error;

use crate::callback::{
    BindingHandle, CallbackArgs, CallbackRegistry, CallbackResult, Dependency, DispatchError,
    DispatchResult, Outputs, PropRef, RegistryError, Session,
};
use crate::component::{html, Component, ComponentError};
use crate::dataset::DatasetError;

/// Errors raised while building or validating an app
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Layout error: {0}")]
    Layout(#[from] ComponentError),

    #[error("Callback wiring error: {0}")]
    Registry(#[from] RegistryError),

    /// A binding is unusable regardless of input values
    #[error("Callback misconfigured: {0}")]
    Binding(DispatchError),

    #[error("Data error: {0}")]
    Dataset(#[from] DatasetError),
}

/// Result type alias for app construction
pub type AppResult<T> = Result<T, AppError>;

/// A single-page dashboard
#[derive(Debug)]
pub struct App {
    name: String,
    title: String,
    external_stylesheets: Vec<String>,
    layout: Component,
    registry: CallbackRegistry,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            external_stylesheets: Vec::new(),
            layout: html::div(),
            registry: CallbackRegistry::new(),
        }
    }

    /// Builder: page title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: add a stylesheet URL
    pub fn external_stylesheet(mut self, url: impl Into<String>) -> Self {
        self.external_stylesheets.push(url.into());
        self
    }

    /// Builder: set the layout tree
    pub fn layout(mut self, layout: Component) -> Self {
        self.layout = layout;
        self
    }

    /// Builder: register a binding
    pub fn callback<F>(
        mut self,
        outputs: Vec<PropRef>,
        inputs: Vec<PropRef>,
        states: Vec<PropRef>,
        func: F,
    ) -> AppResult<Self>
    where
        F: Fn(&CallbackArgs<'_>) -> CallbackResult<Outputs> + Send + Sync + 'static,
    {
        self.registry.register(outputs, inputs, states, func)?;
        Ok(self)
    }

    /// Register a binding on an already-built app
    pub fn register<F>(
        &mut self,
        outputs: Vec<PropRef>,
        inputs: Vec<PropRef>,
        states: Vec<PropRef>,
        func: F,
    ) -> AppResult<BindingHandle>
    where
        F: Fn(&CallbackArgs<'_>) -> CallbackResult<Outputs> + Send + Sync + 'static,
    {
        Ok(self.registry.register(outputs, inputs, states, func)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page_title(&self) -> &str {
        &self.title
    }

    pub fn external_stylesheets(&self) -> &[String] {
        &self.external_stylesheets
    }

    pub fn layout_tree(&self) -> &Component {
        &self.layout
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    pub fn dependencies(&self) -> Vec<Dependency> {
        self.registry.dependencies()
    }

    /// A fresh session seeded from the layout
    pub fn session(&self) -> Session<'_> {
        Session::new(&self.registry, &self.layout)
    }

    /// Invoke the binding writing `output_spec` with explicit values
    pub fn invoke(
        &self,
        output_spec: &str,
        inputs: &[Value],
        states: &[Value],
    ) -> DispatchResult<Vec<(PropRef, Value)>> {
        let (_, binding) = self.registry.binding_for_spec(output_spec)?;
        binding.invoke(inputs, states)
    }

    /// Check the app before serving it
    ///
    /// Rejects duplicate ids, references to missing components, and bindings
    /// whose function returns the wrong number of values. Input-value
    /// failures during the dry startup pass are only logged.
    ///
    /// The output count is only checked for bindings that succeed on the
    /// layout's initial values. A binding that fails there and also returns
    /// the wrong number of values is caught at runtime instead, as a
    /// `DispatchError::ShapeMismatch` on its first successful call.
    pub fn validate(&self) -> AppResult<()> {
        self.layout.validate_ids()?;
        self.registry.validate_against(&self.layout)?;

        let dispatch = self.session().start();
        for failure in dispatch.failures {
            match failure.error {
                DispatchError::ShapeMismatch { .. } | DispatchError::ArgumentCount { .. } => {
                    return Err(AppError::Binding(failure.error));
                }
                error => {
                    tracing::warn!(
                        app = %self.name,
                        output = %failure.output,
                        error = %error,
                        "Callback failed on initial values"
                    );
                }
            }
        }

        tracing::info!(
            app = %self.name,
            bindings = self.registry.len(),
            "App validated"
        );
        Ok(())
    }
}
