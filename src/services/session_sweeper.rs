use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::engine::SessionRegistry;

/// Periodically tear down sessions that were abandoned without a DELETE.
pub async fn run_session_sweeper(registry: Arc<SessionRegistry>, max_idle: Duration) {
    let period = max_idle.clamp(Duration::from_secs(1), Duration::from_secs(60));
    tracing::info!(
        max_idle_secs = max_idle.as_secs(),
        period_secs = period.as_secs(),
        "Session sweeper started"
    );

    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let reaped = registry.reap_idle(max_idle).await;
        if reaped > 0 {
            let remaining = registry.len().await;
            tracing::debug!(reaped, remaining, "Sweep finished");
        }
    }
}
