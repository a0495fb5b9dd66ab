use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_auth;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes, no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    let protected = Router::new()
        // Settlement sessions
        .route("/api/sessions", post(handlers::sessions::create))
        .route(
            "/api/sessions/:id",
            get(handlers::sessions::detail).delete(handlers::sessions::teardown),
        )
        .route("/api/sessions/:id/trades", post(handlers::sessions::open_trade))
        .route("/api/sessions/:id/ws", get(handlers::ws::session_feed))
        // Persisted trade records
        .route("/api/trades", get(handlers::trades::list))
        // Wallet
        .route("/api/wallet/:user_id", get(handlers::wallet::detail))
        .route("/api/wallet/:user_id/deposit", post(handlers::wallet::deposit))
        .route("/api/wallet/:user_id/withdraw", post(handlers::wallet::withdraw))
        // Admin messages
        .route("/api/messages", get(handlers::messages::list).post(handlers::messages::send))
        .route("/api/messages/read-all", post(handlers::messages::mark_all_read))
        .route("/api/messages/:id/read", post(handlers::messages::mark_read))
        .route("/api/messages/ws", get(handlers::ws::message_feed))
        // Notifications
        .route("/api/notifications", get(handlers::notifications::list))
        .route("/api/notifications/read-all", post(handlers::notifications::mark_all_read))
        .route("/api/notifications/:id/read", post(handlers::notifications::mark_read))
        // Support chat
        .route(
            "/api/chat/:user_id",
            get(handlers::chat::thread).post(handlers::chat::send),
        )
        // Settings
        .route(
            "/api/settings/:user_id",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
