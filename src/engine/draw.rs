use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::models::Outcome;

/// Source of win/lose outcomes for settlements.
pub trait OutcomeDraw: Send {
    fn draw(&mut self) -> Outcome;
}

/// Fair coin: win and lose each with probability 0.5, independent of
/// direction or anything else about the trade.
#[derive(Debug, Clone)]
pub struct CoinFlip {
    rng: ChaCha8Rng,
}

impl CoinFlip {
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl OutcomeDraw for CoinFlip {
    fn draw(&mut self) -> Outcome {
        if self.rng.gen_bool(0.5) {
            Outcome::Win
        } else {
            Outcome::Lose
        }
    }
}

/// Always returns the same outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub Outcome);

impl OutcomeDraw for FixedDraw {
    fn draw(&mut self) -> Outcome {
        self.0
    }
}

/// Replays a fixed sequence, then repeats the last outcome (lose if empty).
#[derive(Debug, Clone)]
pub struct ScriptedDraw {
    queue: VecDeque<Outcome>,
    last: Outcome,
}

impl ScriptedDraw {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            queue: outcomes.into_iter().collect(),
            last: Outcome::Lose,
        }
    }
}

impl OutcomeDraw for ScriptedDraw {
    fn draw(&mut self) -> Outcome {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }
}
