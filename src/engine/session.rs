use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::models::{Direction, NewTradeRecord, TradeResult};
use crate::services::identity::IdentityProvider;
use crate::store::TradeRecorder;

use super::draw::OutcomeDraw;
use super::settlement::{SettlementConfig, SettlementEngine, SettlementSnapshot, TickOutcome};
use super::timer::CountdownTimer;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A trade record that could not be written to the document store.
#[derive(Debug, Clone)]
pub struct PersistFailure {
    pub session_id: Uuid,
    pub record: NewTradeRecord,
    pub error: String,
}

/// Collaborators a session needs. Nothing is reached through globals.
#[derive(Clone)]
pub struct SessionDeps {
    pub identity: Arc<dyn IdentityProvider>,
    /// `None` disables persistence entirely.
    pub recorder: Option<Arc<dyn TradeRecorder>>,
    /// Receives every failed trade write. Failures are logged when unset.
    pub failures: Option<mpsc::UnboundedSender<PersistFailure>>,
}

struct Inner {
    engine: SettlementEngine,
    draw: Box<dyn OutcomeDraw>,
}

struct Shared {
    id: Uuid,
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<SettlementSnapshot>,
    deps: SessionDeps,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, engine: &SettlementEngine) {
        self.snapshot_tx.send_replace(engine.snapshot());
    }

    fn on_tick(&self) -> ControlFlow<()> {
        let result = {
            let mut guard = self.lock();
            let Inner { engine, draw } = &mut *guard;

            match engine.tick(draw.as_mut()) {
                TickOutcome::Counting(remaining) => {
                    tracing::debug!(session = %self.id, remaining, "Countdown tick");
                    self.publish(engine);
                    return ControlFlow::Continue(());
                }
                TickOutcome::Idle => return ControlFlow::Break(()),
                TickOutcome::Resolved(result) => {
                    self.publish(engine);
                    tracing::info!(
                        session = %self.id,
                        direction = %result.direction,
                        outcome = %result.outcome,
                        delta = %result.payout_delta,
                        balance = %engine.balance(),
                        "Trade settled"
                    );
                    result
                }
            }
        };

        if result.outcome.is_win() {
            counter!("trades_won_total").increment(1);
        } else {
            counter!("trades_lost_total").increment(1);
        }

        self.persist(&result);
        ControlFlow::Break(())
    }

    /// Fire-and-forget write of a settled trade. Never blocks or rolls back
    /// local state.
    fn persist(&self, result: &TradeResult) {
        let Some(recorder) = self.deps.recorder.clone() else {
            return;
        };
        let Some(user) = self.deps.identity.current_user() else {
            tracing::debug!(session = %self.id, "No signed-in user, trade not persisted");
            return;
        };

        let record = NewTradeRecord::from_result(&user.id, result);
        let failures = self.deps.failures.clone();
        let session_id = self.id;

        tokio::spawn(async move {
            let started = Instant::now();
            match recorder.record_trade(&record).await {
                Ok(()) => {
                    histogram!("trade_persist_latency_seconds")
                        .record(started.elapsed().as_secs_f64());
                    tracing::debug!(session = %session_id, user_id = %record.user_id, "Trade record saved");
                }
                Err(e) => {
                    counter!("trade_persist_failures_total").increment(1);
                    report_failure(
                        failures.as_ref(),
                        PersistFailure {
                            session_id,
                            record,
                            error: e.to_string(),
                        },
                    );
                }
            }
        });
    }
}

fn report_failure(failures: Option<&mpsc::UnboundedSender<PersistFailure>>, failure: PersistFailure) {
    let undelivered = match failures {
        Some(tx) => tx.send(failure).err().map(|e| e.0),
        None => Some(failure),
    };

    if let Some(failure) = undelivered {
        tracing::error!(
            session = %failure.session_id,
            user_id = %failure.record.user_id,
            error = %failure.error,
            "Failed to save trade record"
        );
    }
}

/// One view's settlement engine: isolated balance, one countdown at a time.
///
/// `open_trade` never fails and never blocks. Observers follow state through
/// [`SettlementSession::subscribe`]. Dropping the session tears it down.
pub struct SettlementSession {
    shared: Arc<Shared>,
    timer: Mutex<CountdownTimer>,
}

impl SettlementSession {
    pub fn new(config: SettlementConfig, draw: Box<dyn OutcomeDraw>, deps: SessionDeps) -> Self {
        let engine = SettlementEngine::new(config);
        let (snapshot_tx, _) = watch::channel(engine.snapshot());

        Self {
            shared: Arc::new(Shared {
                id: Uuid::new_v4(),
                inner: Mutex::new(Inner { engine, draw }),
                snapshot_tx,
                deps,
            }),
            timer: Mutex::new(CountdownTimer::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.shared.deps.identity
    }

    /// Request a trade. Silently ignored (returns `false`) while another
    /// trade is counting down or after teardown.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open_trade(&self, direction: Direction) -> bool {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);

        {
            let mut inner = self.shared.lock();
            if !inner.engine.open_trade(direction) {
                counter!("trades_ignored_total").increment(1);
                tracing::debug!(session = %self.shared.id, %direction, "Trade ignored, settlement in flight");
                return false;
            }
            self.shared.publish(&inner.engine);
        }

        counter!("trades_opened_total").increment(1);
        tracing::info!(session = %self.shared.id, %direction, "Trade opened");

        let shared = Arc::clone(&self.shared);
        timer.start(TICK_PERIOD, move || shared.on_tick());
        true
    }

    pub fn snapshot(&self) -> SettlementSnapshot {
        self.shared.lock().engine.snapshot()
    }

    /// Live snapshot stream. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<SettlementSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Number of live snapshot subscribers.
    pub fn observer_count(&self) -> usize {
        self.shared.snapshot_tx.receiver_count()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().engine.is_closed()
    }

    /// Cancel any pending countdown and stop accepting trades. No state
    /// changes after this returns.
    pub fn teardown(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        {
            let mut inner = self.shared.lock();
            if inner.engine.is_closed() {
                return;
            }
            inner.engine.close();
        }
        timer.cancel();
        tracing::info!(session = %self.shared.id, "Settlement session torn down");
    }
}

impl Drop for SettlementSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
