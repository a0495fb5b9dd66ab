use std::sync::OnceLock;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload. Safe to call more than once; the
/// recorder is installed on the first call only.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("Global metrics recorder already installed, /metrics will be empty");
            }

            // Pre-register counters so they appear even before the first increment.
            counter!("trades_opened_total").absolute(0);
            counter!("trades_ignored_total").absolute(0);
            counter!("trades_won_total").absolute(0);
            counter!("trades_lost_total").absolute(0);
            counter!("trade_persist_failures_total").absolute(0);
            counter!("wallet_transactions_total").absolute(0);
            counter!("admin_messages_sent_total").absolute(0);
            counter!("chat_messages_total", "from" => "user").absolute(0);
            counter!("chat_messages_total", "from" => "bot").absolute(0);

            // Pre-register gauges at zero.
            gauge!("active_sessions").set(0.0);

            // Histogram is lazily created on first record; force creation.
            histogram!("trade_persist_latency_seconds").record(0.0);

            handle
        })
        .clone()
}
