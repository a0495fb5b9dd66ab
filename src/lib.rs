pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::engine::{PersistFailure, SessionRegistry, WalletBook};
use crate::services::chat::ChatService;
use crate::services::messaging::MessageService;
use crate::store::{DocumentStore, StoreRecorder, TradeRecorder};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,
    pub sessions: Arc<SessionRegistry>,
    pub wallets: Arc<WalletBook>,
    pub messages: Arc<MessageService>,
    pub chat: Arc<ChatService>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    /// Wire every service around one document store.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        failures: Option<mpsc::UnboundedSender<PersistFailure>>,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        let recorder: Arc<dyn TradeRecorder> = Arc::new(StoreRecorder::new(Arc::clone(&store)));
        let sessions = SessionRegistry::new(config.clone(), Some(recorder), failures);
        let wallets = WalletBook::new(config.wallet_starting_balance);
        let messages = MessageService::new(Arc::clone(&store));
        let chat = ChatService::new(Arc::clone(&store));

        Self {
            config,
            store,
            sessions: Arc::new(sessions),
            wallets: Arc::new(wallets),
            messages: Arc::new(messages),
            chat: Arc::new(chat),
            metrics_handle,
        }
    }
}
