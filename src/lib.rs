//! # Dashwire
//!
//! Reactive single-page dashboards: declarative component trees wired to
//! pure callback functions that recompute outputs when inputs change.
//!
//! ## Features
//!
//! - **Component trees**: immutable HTML and widget descriptions, serialized
//!   for an external renderer
//! - **Callback registry**: typed input→output bindings, checked for
//!   duplicate outputs and cycles when registered
//! - **Sessions**: startup population and per-change dispatch with
//!   last-good outputs kept on failure
//! - **Datasets and figures**: read-only CSV tables and chart descriptions
//! - **Runtime**: HTTP endpoints plus a WebSocket session channel
//!
//! ## Modules
//!
//! - [`component`]: Component tree builders
//! - [`callback`]: Registry, references and sessions
//! - [`dataset`]: CSV tables and views
//! - [`figure`]: Chart descriptions
//! - [`app`]: Layout + registry bundle
//! - [`apps`]: The bundled dashboards
//! - [`server`]: HTTP server with Axum
//! - [`websocket`]: Live sessions over WebSocket
//!
//! ## Quick Start
//!
//! ```rust
//! use dashwire::callback::{CallbackArgs, PropRef};
//! use dashwire::component::{html, widgets};
//! use dashwire::App;
//! use serde_json::json;
//!
//! let app = App::new("echo")
//!     .layout(
//!         html::div()
//!             .child(widgets::input("my-input", "text", "initial value"))
//!             .child(html::div().id("my-div")),
//!     )
//!     .callback(
//!         vec![PropRef::new("my-div", "children")],
//!         vec![PropRef::new("my-input", "value")],
//!         vec![],
//!         |args: &CallbackArgs<'_>| Ok(json!(format!("You've entered \"{}\"", args.text(0)?)).into()),
//!     )
//!     .unwrap();
//! app.validate().unwrap();
//!
//! let mut session = app.session();
//! session.start();
//! let dispatch = session.apply_input_change(PropRef::new("my-input", "value"), json!("hello"));
//! assert_eq!(
//!     dispatch.value_of(&PropRef::new("my-div", "children")),
//!     Some(&json!("You've entered \"hello\""))
//! );
//! ```

pub mod app;
pub mod apps;
pub mod callback;
pub mod component;
pub mod config;
pub mod dataset;
pub mod figure;
pub mod server;
pub mod websocket;

// Re-export top-level types for convenience
pub use app::{App, AppError, AppResult};

pub use apps::AppKind;

pub use callback::{
    BindingHandle, CallbackArgs, CallbackError, CallbackRegistry, CallbackResult, Dispatch,
    DispatchError, Outputs, PropRef, RegistryError, Session,
};

pub use component::{Component, ComponentError};

pub use dataset::{Cell, Dataset, DatasetError, DatasetView};

pub use figure::Figure;

pub use server::{build_router, serve, AppState, ServerError};

pub use config::{Config, ConfigError, DataConfig, LoggingConfig, ServerConfig};
