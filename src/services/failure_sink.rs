use tokio::sync::mpsc;

use crate::engine::PersistFailure;

/// Drain persistence failures reported by settlement sessions.
///
/// Nothing is retried: a failed trade write is logged once and dropped.
pub async fn run_failure_sink(mut rx: mpsc::UnboundedReceiver<PersistFailure>) {
    tracing::info!("Trade persistence failure sink started");

    while let Some(failure) = rx.recv().await {
        tracing::error!(
            session = %failure.session_id,
            user_id = %failure.record.user_id,
            pair = %failure.record.pair,
            result = %failure.record.result,
            amount = %failure.record.amount,
            error = %failure.error,
            "Trade record dropped after failed write"
        );
    }

    tracing::warn!("Persistence failure channel closed");
}
