use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::gauge;
use tokio::sync::{mpsc, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::services::identity::IdentityProvider;
use crate::store::TradeRecorder;

use super::draw::CoinFlip;
use super::session::{PersistFailure, SessionDeps, SettlementSession};
use super::settlement::{SessionProfile, SettlementConfig};

struct Entry {
    session: Arc<SettlementSession>,
    last_seen: Instant,
}

/// Live settlement sessions keyed by id. Each session is an isolated owner
/// of its balance; removing one tears it down.
pub struct SessionRegistry {
    config: AppConfig,
    recorder: Option<Arc<dyn TradeRecorder>>,
    failures: Option<mpsc::UnboundedSender<PersistFailure>>,
    sessions: RwLock<HashMap<Uuid, Entry>>,
    created: AtomicU64,
}

impl SessionRegistry {
    pub fn new(
        config: AppConfig,
        recorder: Option<Arc<dyn TradeRecorder>>,
        failures: Option<mpsc::UnboundedSender<PersistFailure>>,
    ) -> Self {
        Self {
            config,
            recorder,
            failures,
            sessions: RwLock::new(HashMap::new()),
            created: AtomicU64::new(0),
        }
    }

    /// With `OUTCOME_SEED` set, session n draws from `seed + n` so runs are
    /// reproducible while sessions stay independent of each other.
    fn next_draw(&self) -> CoinFlip {
        let n = self.created.fetch_add(1, Ordering::Relaxed);
        CoinFlip::new(self.config.outcome_seed.map(|seed| seed.wrapping_add(n)))
    }

    pub async fn create(
        &self,
        profile: SessionProfile,
        identity: Arc<dyn IdentityProvider>,
    ) -> Arc<SettlementSession> {
        let settlement = SettlementConfig::for_profile(profile, &self.config);
        let session = Arc::new(SettlementSession::new(
            settlement,
            Box::new(self.next_draw()),
            SessionDeps {
                identity,
                recorder: self.recorder.clone(),
                failures: self.failures.clone(),
            },
        ));

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session.id(),
            Entry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );
        gauge!("active_sessions").set(sessions.len() as f64);

        tracing::info!(session = %session.id(), %profile, "Settlement session created");
        session
    }

    /// Look up a session and mark it as seen.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<SettlementSession>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Remove and tear down a session. Returns false if it did not exist.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().await;
            let removed = sessions.remove(id);
            gauge!("active_sessions").set(sessions.len() as f64);
            removed
        };

        match removed {
            Some(entry) => {
                entry.session.teardown();
                true
            }
            None => false,
        }
    }

    /// Tear down sessions nobody has looked up for `max_idle` and that have
    /// no snapshot subscribers. Returns how many were removed.
    pub async fn reap_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let reaped: Vec<Arc<SettlementSession>> = {
            let mut sessions = self.sessions.write().await;
            let stale: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, e)| {
                    e.session.observer_count() == 0
                        && now.saturating_duration_since(e.last_seen) >= max_idle
                })
                .map(|(id, _)| *id)
                .collect();
            let reaped = stale
                .iter()
                .filter_map(|id| sessions.remove(id))
                .map(|e| e.session)
                .collect();
            gauge!("active_sessions").set(sessions.len() as f64);
            reaped
        };

        for session in &reaped {
            session.teardown();
        }
        if !reaped.is_empty() {
            tracing::info!(count = reaped.len(), "Idle settlement sessions reaped");
        }
        reaped.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Tear down every session (shutdown).
    pub async fn clear(&self) {
        let drained: Vec<_> = self
            .sessions
            .write()
            .await
            .drain()
            .map(|(_, e)| e.session)
            .collect();
        for session in &drained {
            session.teardown();
        }
        gauge!("active_sessions").set(0.0);
        tracing::info!(count = drained.len(), "All settlement sessions torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::draw::OutcomeDraw;
    use crate::services::identity::SessionIdentity;
    use tokio::time;

    fn registry(seed: Option<u64>) -> SessionRegistry {
        let config = AppConfig {
            outcome_seed: seed,
            ..AppConfig::default()
        };
        SessionRegistry::new(config, None, None)
    }

    fn anonymous() -> Arc<dyn IdentityProvider> {
        Arc::new(SessionIdentity::anonymous())
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_sessions_are_reaped() {
        let reg = registry(None);
        for _ in 0..500 {
            reg.create(SessionProfile::Dashboard, anonymous()).await;
        }
        assert_eq!(reg.len().await, 500);

        time::sleep(Duration::from_secs(10 * 60)).await;
        assert_eq!(reg.reap_idle(Duration::from_secs(30 * 60)).await, 0);

        time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(reg.reap_idle(Duration::from_secs(30 * 60)).await, 500);
        assert!(reg.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_keeps_session_alive() {
        let reg = registry(None);
        let busy = reg.create(SessionProfile::Dashboard, anonymous()).await;
        let abandoned = reg.create(SessionProfile::Trading, anonymous()).await;

        time::sleep(Duration::from_secs(50)).await;
        assert!(reg.get(&busy.id()).await.is_some());
        time::sleep(Duration::from_secs(20)).await;

        assert_eq!(reg.reap_idle(Duration::from_secs(60)).await, 1);
        assert!(reg.get(&busy.id()).await.is_some());
        assert!(reg.get(&abandoned.id()).await.is_none());
        assert!(abandoned.is_closed());
        assert!(!busy.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_observed_session_is_not_reaped() {
        let reg = registry(None);
        let session = reg.create(SessionProfile::Dashboard, anonymous()).await;
        let rx = session.subscribe();

        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(reg.reap_idle(Duration::from_secs(60)).await, 0);

        drop(rx);
        assert_eq!(reg.reap_idle(Duration::from_secs(60)).await, 1);
    }

    #[test]
    fn test_seeded_sessions_draw_independently() {
        let reg = registry(Some(1));
        let sequences: Vec<Vec<_>> = (0..3)
            .map(|_| {
                let mut draw = reg.next_draw();
                (0..32).map(|_| draw.draw()).collect()
            })
            .collect();

        assert_ne!(sequences[0], sequences[1]);
        assert_ne!(sequences[1], sequences[2]);
        assert_ne!(sequences[0], sequences[2]);

        // Same seed, same order of creation: same sequences
        let again = registry(Some(1));
        let mut first = again.next_draw();
        let replay: Vec<_> = (0..32).map(|_| first.draw()).collect();
        assert_eq!(replay, sequences[0]);
    }
}
