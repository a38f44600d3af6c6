//! HTTP Runtime
//!
//! Serves one app to browser clients, built with Axum.
//!
//! # Endpoints
//!
//! ## App description
//! - `GET /_dash-layout` - Component tree
//! - `GET /_dash-dependencies` - Callback bindings
//! - `GET /_dash-config` - Page title and stylesheets
//!
//! ## Callbacks
//! - `POST /_dash-update-component` - Run one binding with supplied values
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Live callback session
//!
//! # Example
//!
//! ```rust,ignore
//! use dashwire::{apps, config::ServerConfig, server::{serve, AppState}};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = Arc::new(apps::powers()?);
//!     app.validate()?;
//!
//!     let config = ServerConfig::default();
//!     serve(AppState::new(app, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ServerError, ServerResult};
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::websocket::websocket_handler;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let app_routes = Router::new()
        .route("/_dash-layout", get(routes::app::get_layout))
        .route("/_dash-dependencies", get(routes::app::get_dependencies))
        .route("/_dash-config", get(routes::app::get_config))
        .route(
            "/_dash-update-component",
            post(routes::update::update_component),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_secs,
        )));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let shared_state = Arc::new(state);

    Router::new()
        .merge(app_routes)
        .route("/ws", get(websocket_handler))
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ServerError> {
    let app_name = state.app.name().to_string();
    let router = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(app = %app_name, "Dashwire listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Dashwire shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::apps;
    use crate::callback::{CallbackArgs, CallbackError, PropRef};
    use crate::component::{html, widgets};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const POWERS_OUTPUT: &str =
        "..square.children...cube.children...twos.children...threes.children...x^x.children..";

    fn create_test_app() -> Router {
        let app = Arc::new(apps::powers().unwrap());
        build_router(AppState::new(app, ServerConfig::default()))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn post_update(router: Router, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/_dash-update-component")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_live() {
        let (status, _) = get_json(create_test_app(), "/health/live").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let (status, _) = get_json(create_test_app(), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (status, body) = get_json(create_test_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("healthy"));
        assert_eq!(body["app"], json!("powers"));
        assert_eq!(body["bindings"], json!(1));
        assert_eq!(body["sessions"], json!(0));
    }

    #[tokio::test]
    async fn test_layout() {
        let (status, body) = get_json(create_test_app(), "/_dash-layout").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], json!("Div"));
        assert_eq!(body["namespace"], json!("dash_html_components"));
        assert_eq!(body["props"]["children"][0]["props"]["id"], json!("num"));
    }

    #[tokio::test]
    async fn test_dependencies() {
        let (status, body) = get_json(create_test_app(), "/_dash-dependencies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "output": POWERS_OUTPUT,
                "inputs": [{"id": "num", "property": "value"}],
                "state": []
            }])
        );
    }

    #[tokio::test]
    async fn test_config() {
        let (status, body) = get_json(create_test_app(), "/_dash-config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], json!("powers"));
        assert_eq!(
            body["external_stylesheets"],
            json!(["https://codepen.io/chriddyp/pen/bWLwgP.css"])
        );
    }

    #[tokio::test]
    async fn test_update_component() {
        let (status, body) = post_update(
            create_test_app(),
            json!({
                "output": POWERS_OUTPUT,
                "inputs": [{"id": "num", "property": "value", "value": 5}]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"response": {
                "square": {"children": 25},
                "cube": {"children": 125},
                "twos": {"children": 32},
                "threes": {"children": 243},
                "x^x": {"children": 3125}
            }})
        );
    }

    #[tokio::test]
    async fn test_update_invalid_input() {
        let (status, body) = post_update(
            create_test_app(),
            json!({
                "output": POWERS_OUTPUT,
                "inputs": [{"id": "num", "property": "value", "value": "abc"}]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], json!("CALLBACK_ERROR"));
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_update_missing_input() {
        let (status, body) = post_update(
            create_test_app(),
            json!({"output": POWERS_OUTPUT, "inputs": []}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], json!("Bad request: Missing value for num.value"));
    }

    #[tokio::test]
    async fn test_update_unknown_output() {
        let (status, _) = post_update(
            create_test_app(),
            json!({"output": "square.children", "inputs": []}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_malformed_output() {
        let (status, _) = post_update(
            create_test_app(),
            json!({"output": "no-dot-here", "inputs": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_invalid_json() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/_dash-update-component")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_prevented() {
        let app = App::new("guarded")
            .layout(
                html::div()
                    .child(widgets::input("in", "text", ""))
                    .child(html::div().id("out")),
            )
            .callback(
                vec![PropRef::new("out", "children")],
                vec![PropRef::new("in", "value")],
                vec![PropRef::new("out", "title")],
                |args: &CallbackArgs<'_>| {
                    if args.text(0)?.is_empty() {
                        return Err(CallbackError::PreventUpdate);
                    }
                    Ok(json!(format!("{} ({})", args.text(0)?, args.text(1)?)).into())
                },
            )
            .unwrap();
        let router = build_router(AppState::new(Arc::new(app), ServerConfig::default()));

        let (status, _) = post_update(
            router.clone(),
            json!({
                "output": "out.children",
                "inputs": [{"id": "in", "property": "value", "value": ""}],
                "state": [{"id": "out", "property": "title", "value": null}]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = post_update(
            router,
            json!({
                "output": "out.children",
                "inputs": [{"id": "in", "property": "value", "value": "hi"}],
                "state": [{"id": "out", "property": "title", "value": "t"}]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"]["out"]["children"], json!("hi (t)"));
    }
}
