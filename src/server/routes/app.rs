//! App Description Routes
//!
//! Static descriptions of the served app, fetched once by the browser.
//!
//! - GET /_dash-layout - Component tree
//! - GET /_dash-dependencies - Callback bindings
//! - GET /_dash-config - Page metadata

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::callback::Dependency;
use crate::server::dto::ConfigResponse;
use crate::server::state::AppState;

/// GET /_dash-layout
pub async fn get_layout(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.app.layout_tree().to_value())
}

/// GET /_dash-dependencies
pub async fn get_dependencies(State(state): State<Arc<AppState>>) -> Json<Vec<Dependency>> {
    Json(state.app.dependencies())
}

/// GET /_dash-config
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let app = &state.app;
    Json(ConfigResponse {
        name: app.name().to_string(),
        title: app.page_title().to_string(),
        external_stylesheets: app.external_stylesheets().to_vec(),
    })
}
