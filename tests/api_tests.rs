mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;
use tower::ServiceExt;

use tradox::config::AppConfig;

use common::{build_test_app, decimal, send, test_config};

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = build_test_app(test_config());

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_create_session_starts_idle() {
    let (app, state) = build_test_app(test_config());

    let (status, json) = send(&app, "POST", "/api/sessions", Some(json!({}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&json["snapshot"]["balance"]), Decimal::from(100));
    assert!(json["snapshot"]["seconds_remaining"].is_null());
    assert!(json["snapshot"]["last_outcome"].is_null());
    assert_eq!(json["snapshot"]["history"].as_array().unwrap().len(), 0);
    assert!(json["user_id"].is_null());
    assert_eq!(state.sessions.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_trade_settles_and_is_persisted() {
    let (app, _state) = build_test_app(test_config());

    let (_, created) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({ "user_id": "u1", "email": "u1@example.com" })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/trades"),
        Some(json!({ "direction": "buy" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["accepted"], true);
    assert_eq!(json["seconds_remaining"], 3);

    // Second click while counting is dropped
    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/trades"),
        Some(json!({ "direction": "sell" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["accepted"], false);

    tokio::time::sleep(Duration::from_secs(4)).await;

    let (status, json) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let history = json["snapshot"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["direction"], "up");

    let balance = decimal(&json["snapshot"]["balance"]);
    let expected = if history[0]["outcome"] == "win" {
        Decimal::from(104)
    } else {
        Decimal::from(95)
    };
    assert_eq!(balance, expected);

    let (status, json) = send(&app, "GET", "/api/trades?user_id=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let trades = json["data"].as_array().unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0]["pair"], "BTCUSDT");
    assert_eq!(trades[0]["result"], history[0]["outcome"]);
}

#[tokio::test(start_paused = true)]
async fn test_trading_profile_does_not_persist() {
    let (app, _state) = build_test_app(test_config());

    let (_, created) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({ "profile": "trading", "user_id": "u2" })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/trades"),
        Some(json!({ "direction": "up" })),
    )
    .await;
    tokio::time::sleep(Duration::from_secs(4)).await;

    let (_, json) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(json["snapshot"]["history"].as_array().unwrap().len(), 1);

    let (_, json) = send(&app, "GET", "/api/trades?user_id=u2", None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_open_trade_rejects_unknown_direction() {
    let (app, _state) = build_test_app(test_config());
    let (_, created) = send(&app, "POST", "/api/sessions", Some(json!({}))).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/trades"),
        Some(json!({ "direction": "sideways" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let (app, _state) = build_test_app(test_config());
    let id = uuid::Uuid::new_v4();

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/trades"),
        Some(json!({ "direction": "up" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_removes_session_and_drops_countdown() {
    let (app, state) = build_test_app(test_config());
    let (_, created) = send(&app, "POST", "/api/sessions", Some(json!({ "user_id": "u3" }))).await;
    let id = created["id"].as_str().unwrap().to_string();

    send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/trades"),
        Some(json!({ "direction": "down" })),
    )
    .await;

    let (status, json) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "closed");

    tokio::time::sleep(Duration::from_secs(5)).await;

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.sessions.is_empty().await);

    let (_, json) = send(&app, "GET", "/api/trades?user_id=u3", None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wallet_deposit_and_withdraw() {
    let (app, _state) = build_test_app(test_config());

    let (status, json) = send(&app, "GET", "/api/wallet/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["balance"]), Decimal::from(1000));

    let (status, json) = send(
        &app,
        "POST",
        "/api/wallet/u1/deposit",
        Some(json!({ "amount": "250" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["balance"]), Decimal::from(1250));

    let (status, json) = send(
        &app,
        "POST",
        "/api/wallet/u1/withdraw",
        Some(json!({ "amount": "2000" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("insufficient funds"));

    let (status, json) = send(
        &app,
        "POST",
        "/api/wallet/u1/withdraw",
        Some(json!({ "amount": "50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["balance"]), Decimal::from(1200));
    assert_eq!(json["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(json["transactions"][0]["kind"], "withdrawal");

    let (status, _) = send(
        &app,
        "POST",
        "/api/wallet/u1/deposit",
        Some(json!({ "amount": "-5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_messages_flow() {
    let (app, _state) = build_test_app(test_config());

    let (status, _) = send(
        &app,
        "POST",
        "/api/messages",
        Some(json!({ "title": "Welcome", "content": "Competition starts Monday", "for": "all" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &app,
        "POST",
        "/api/messages",
        Some(json!({ "title": "Prize", "content": "You placed first", "for": ["u1"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let targeted_id = json["id"].as_str().unwrap().to_string();

    let (_, json) = send(&app, "GET", "/api/messages?user_id=u1", None).await;
    assert_eq!(json["messages"].as_array().unwrap().len(), 2);
    assert_eq!(json["unread_count"], 2);

    let (_, json) = send(&app, "GET", "/api/messages?user_id=u2", None).await;
    assert_eq!(json["messages"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/messages/{targeted_id}/read"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/api/messages?user_id=u1", None).await;
    assert_eq!(json["unread_count"], 1);

    let (_, json) = send(&app, "POST", "/api/messages/read-all?user_id=u1", None).await;
    assert_eq!(json["updated"], 1);
}

#[tokio::test]
async fn test_admin_message_validation() {
    let (app, _state) = build_test_app(test_config());

    let (status, json) = send(
        &app,
        "POST",
        "/api/messages",
        Some(json!({ "title": "", "content": "x", "for": "all" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("title and content"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/messages",
        Some(json!({ "title": "t", "content": "c" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/messages/{}/read", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notifications_feed() {
    let (app, state) = build_test_app(test_config());

    let first = state
        .store
        .insert_notification("u1", "Trade won", "+4.00 on BTCUSDT")
        .await
        .unwrap();
    state
        .store
        .insert_notification("u1", "Trade lost", "-5.00 on BTCUSDT")
        .await
        .unwrap();
    state
        .store
        .insert_notification("u2", "Other", "not yours")
        .await
        .unwrap();

    let (status, json) = send(&app, "GET", "/api/notifications?user_id=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["notifications"].as_array().unwrap().len(), 2);
    assert_eq!(json["unread_count"], 2);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/notifications/{}/read?user_id=u1", first.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Someone else's id is not found for this user
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/notifications/{}/read?user_id=u2", first.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = send(&app, "POST", "/api/notifications/read-all?user_id=u1", None).await;
    assert_eq!(json["updated"], 1);

    let (_, json) = send(&app, "GET", "/api/notifications?user_id=u1", None).await;
    assert_eq!(json["unread_count"], 0);
}

#[tokio::test]
async fn test_settings_default_then_update() {
    let (app, _state) = build_test_app(test_config());

    let (status, json) = send(&app, "GET", "/api/settings/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["theme"], "dark");
    assert_eq!(json["currency"], "USDT");
    assert_eq!(json["notifications"]["price_alerts"], true);

    let mut updated = json.clone();
    updated["theme"] = json!("light");
    updated["notifications"]["push"] = json!(false);

    let (status, _) = send(&app, "PUT", "/api/settings/u1", Some(updated)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/api/settings/u1", None).await;
    assert_eq!(json["theme"], "light");
    assert_eq!(json["notifications"]["push"], false);
}

#[tokio::test(start_paused = true)]
async fn test_support_chat_thread() {
    let (app, _state) = build_test_app(test_config());

    let (status, json) = send(
        &app,
        "POST",
        "/api/chat/u1",
        Some(json!({ "text": "How do I reset my password?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["is_user"], true);

    let (status, _) = send(&app, "POST", "/api/chat/u1", Some(json!({ "text": "thanks" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    tokio::time::sleep(Duration::from_secs(2)).await;

    let (status, json) = send(&app, "GET", "/api/chat/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    let thread = json["data"].as_array().unwrap();
    assert_eq!(thread.len(), 3);
    assert_eq!(thread[0]["text"], "How do I reset my password?");
    assert_eq!(thread[1]["text"], "thanks");
    assert_eq!(thread[2]["is_user"], false);
    assert!(thread[2]["text"].as_str().unwrap().contains("Forgot Password?"));

    let (_, json) = send(&app, "GET", "/api/chat/u2", None).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, "POST", "/api/chat/u1", Some(json!({ "text": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_token_required_when_configured() {
    let config = AppConfig {
        api_token: Some("secret".into()),
        ..test_config()
    };
    let (app, _state) = build_test_app(config);

    let (status, _) = send(&app, "GET", "/api/wallet/u1", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/wallet/u1")
                .header("authorization", "Bearer secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Health stays public
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _state) = build_test_app(test_config());

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}
