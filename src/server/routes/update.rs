//! Callback Route
//!
//! POST /_dash-update-component
//!
//! Stateless: the browser sends the current value of every input and state
//! of one binding, and receives the new output values.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::callback::PropRef;
use crate::server::dto::{UpdateRequest, UpdateResponse};
use crate::server::error::{ServerError, ServerResult};
use crate::server::state::AppState;

/// POST /_dash-update-component
///
/// - 200 with `{"response": {id: {property: value}}}`
/// - 204 when the callback prevented the update
/// - 400 for a malformed output spec or a missing input value
/// - 404 when no binding writes the requested outputs
/// - 422 when the callback rejected its inputs
pub async fn update_component(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateRequest>,
) -> ServerResult<Response> {
    let (_, binding) = state.app.registry().binding_for_spec(&request.output)?;

    let missing = |target: PropRef| {
        ServerError::BadRequest(format!("Missing value for {}", target))
    };
    let inputs = UpdateRequest::values_for(&request.inputs, binding.inputs()).map_err(missing)?;
    let states = UpdateRequest::values_for(&request.state, binding.states()).map_err(missing)?;

    match binding.invoke(&inputs, &states) {
        Ok(outputs) => {
            tracing::debug!(output = %request.output, "Callback invoked");
            Ok(Json(UpdateResponse::from_outputs(outputs)).into_response())
        }
        Err(e) if e.is_prevent_update() => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Err(e.into()),
    }
}
