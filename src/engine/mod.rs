pub mod draw;
pub mod registry;
pub mod session;
pub mod settlement;
pub mod timer;
pub mod wallet;

pub use draw::{CoinFlip, FixedDraw, OutcomeDraw, ScriptedDraw};
pub use registry::SessionRegistry;
pub use session::{PersistFailure, SessionDeps, SettlementSession};
pub use settlement::{
    payout_delta, SessionProfile, SettlementConfig, SettlementEngine, SettlementSnapshot,
    SettlementState, TickOutcome,
};
pub use timer::CountdownTimer;
pub use wallet::{Wallet, WalletBook, WalletError};
