use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use tradox::api::router::create_router;
use tradox::config::AppConfig;
use tradox::store::{DocumentStore, MemoryStore};
use tradox::AppState;

/// Router + state over an in-memory store with a fixed outcome seed.
#[allow(dead_code)]
pub fn build_test_app(config: AppConfig) -> (Router, AppState) {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let metrics_handle = tradox::metrics::init_metrics();
    let state = AppState::new(config, store, None, metrics_handle);
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        outcome_seed: Some(1),
        ..AppConfig::default()
    }
}

/// Send a request and decode the JSON body (Null for empty bodies).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[allow(dead_code)]
pub fn decimal(value: &serde_json::Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .expect("decimal serialized as string")
        .parse()
        .expect("valid decimal")
}
