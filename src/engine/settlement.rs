use std::collections::VecDeque;
use std::fmt;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::AppConfig;
use crate::models::{Direction, Outcome, TradeResult};

use super::draw::OutcomeDraw;

/// Which screen a session backs. Both run the same settlement contract with
/// their own isolated balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionProfile {
    /// Dashboard layout: keeps history and persists trades.
    #[default]
    Dashboard,
    /// Standalone trading page: local only, nothing is persisted.
    Trading,
}

impl SessionProfile {
    /// Unknown labels fall back to the dashboard profile.
    pub fn from_api_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trading" => SessionProfile::Trading,
            _ => SessionProfile::Dashboard,
        }
    }
}

impl fmt::Display for SessionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionProfile::Dashboard => write!(f, "dashboard"),
            SessionProfile::Trading => write!(f, "trading"),
        }
    }
}

/// Settlement parameters for one session.
#[derive(Debug, Clone)]
pub struct SettlementConfig {
    pub starting_balance: Decimal,
    pub stake: Decimal,
    pub payout_ratio: Decimal,
    pub countdown_secs: u32,
    pub history_cap: usize,
    pub pair: String,
    pub persist_trades: bool,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            starting_balance: Decimal::from(100),
            stake: Decimal::from(5),
            payout_ratio: Decimal::new(8, 1), // 0.8
            countdown_secs: 3,
            history_cap: 10,
            pair: "BTCUSDT".into(),
            persist_trades: true,
        }
    }
}

impl SettlementConfig {
    pub fn for_profile(profile: SessionProfile, config: &AppConfig) -> Self {
        Self {
            starting_balance: config.dashboard_starting_balance,
            stake: config.stake,
            payout_ratio: config.payout_ratio,
            // A zero countdown would never tick down to a resolution.
            countdown_secs: config.countdown_secs.max(1),
            history_cap: config.history_cap,
            pair: config.default_pair.clone(),
            persist_trades: profile == SessionProfile::Dashboard,
        }
    }
}

/// `+stake * payout_ratio` on a win, `-stake` on a loss.
pub fn payout_delta(stake: Decimal, payout_ratio: Decimal, outcome: Outcome) -> Decimal {
    match outcome {
        Outcome::Win => stake * payout_ratio,
        Outcome::Lose => -stake,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementState {
    Idle,
    Counting {
        seconds_remaining: u32,
        direction: Direction,
    },
}

/// Result of applying one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing pending, or the engine was closed. No state changed.
    Idle,
    /// Countdown moved down to this many seconds.
    Counting(u32),
    /// Final tick: the trade resolved and all effects are applied.
    Resolved(TradeResult),
}

/// Observable state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementSnapshot {
    pub balance: Decimal,
    pub seconds_remaining: Option<u32>,
    pub direction: Option<Direction>,
    pub last_outcome: Option<Outcome>,
    pub history: Vec<TradeResult>,
    pub pair: String,
    pub stake: Decimal,
}

/// Synchronous settlement state machine: `Idle -> Counting(n) -> ... ->
/// Resolved -> Idle`.
///
/// The engine knows nothing about time; the caller feeds it ticks. Every
/// method runs to completion, so a caller that holds it behind a lock sees
/// a resolution as one unit.
#[derive(Debug)]
pub struct SettlementEngine {
    config: SettlementConfig,
    balance: Decimal,
    state: SettlementState,
    last_outcome: Option<Outcome>,
    history: VecDeque<TradeResult>,
    closed: bool,
}

impl SettlementEngine {
    pub fn new(config: SettlementConfig) -> Self {
        Self {
            balance: config.starting_balance,
            state: SettlementState::Idle,
            last_outcome: None,
            history: VecDeque::with_capacity(config.history_cap),
            closed: false,
            config,
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn state(&self) -> SettlementState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Start a countdown for `direction`. Returns `false` and changes nothing
    /// if a trade is already counting down or the engine is closed.
    pub fn open_trade(&mut self, direction: Direction) -> bool {
        if self.closed || self.state != SettlementState::Idle {
            return false;
        }

        self.last_outcome = None;
        self.state = SettlementState::Counting {
            seconds_remaining: self.config.countdown_secs.max(1),
            direction,
        };
        true
    }

    /// Apply one elapsed second. The outcome is drawn on the tick that takes
    /// the counter to zero, never earlier.
    pub fn tick(&mut self, draw: &mut dyn OutcomeDraw) -> TickOutcome {
        if self.closed {
            return TickOutcome::Idle;
        }

        match self.state {
            SettlementState::Idle => TickOutcome::Idle,
            SettlementState::Counting {
                seconds_remaining,
                direction,
            } if seconds_remaining > 1 => {
                let remaining = seconds_remaining - 1;
                self.state = SettlementState::Counting {
                    seconds_remaining: remaining,
                    direction,
                };
                TickOutcome::Counting(remaining)
            }
            SettlementState::Counting { direction, .. } => {
                TickOutcome::Resolved(self.resolve(direction, draw.draw()))
            }
        }
    }

    fn resolve(&mut self, direction: Direction, outcome: Outcome) -> TradeResult {
        let delta = payout_delta(self.config.stake, self.config.payout_ratio, outcome);
        let result = TradeResult {
            direction,
            outcome,
            payout_delta: delta,
            pair: self.config.pair.clone(),
            resolved_at: Utc::now(),
        };

        self.balance += delta;
        self.history.push_front(result.clone());
        self.history.truncate(self.config.history_cap);
        self.last_outcome = Some(outcome);
        self.state = SettlementState::Idle;

        result
    }

    /// Stop accepting trades and ticks. Whatever is pending is dropped.
    pub fn close(&mut self) {
        self.closed = true;
        self.state = SettlementState::Idle;
    }

    pub fn snapshot(&self) -> SettlementSnapshot {
        let (seconds_remaining, direction) = match self.state {
            SettlementState::Idle => (None, None),
            SettlementState::Counting {
                seconds_remaining,
                direction,
            } => (Some(seconds_remaining), Some(direction)),
        };

        SettlementSnapshot {
            balance: self.balance,
            seconds_remaining,
            direction,
            last_outcome: self.last_outcome,
            history: self.history.iter().cloned().collect(),
            pair: self.config.pair.clone(),
            stake: self.config.stake,
        }
    }
}
