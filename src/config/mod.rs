use rust_decimal::Decimal;
use std::env;

const DEFAULT_PAIR: &str = "BTCUSDT";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres document store. When unset the service keeps everything in memory.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    /// Bearer token for `/api`. Empty or unset disables auth (dev mode).
    pub api_token: Option<String>,

    // Settlement
    pub stake: Decimal,
    pub payout_ratio: Decimal,
    pub countdown_secs: u32,
    pub history_cap: usize,
    pub dashboard_starting_balance: Decimal,
    pub default_pair: String,
    /// Fixed seed for the outcome draw (reproducible demos). Entropy when unset.
    pub outcome_seed: Option<u64>,
    /// Sessions not looked up for this long, with no snapshot subscriber,
    /// are torn down by the sweeper.
    pub session_idle_secs: u64,

    // Wallet
    pub wallet_starting_balance: Decimal,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            api_token: env::var("API_TOKEN").ok().filter(|s| !s.is_empty()),

            stake: env::var("STAKE")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .unwrap_or(Decimal::from(5)),
            payout_ratio: env::var("PAYOUT_RATIO")
                .unwrap_or_else(|_| "0.8".into())
                .parse()
                .unwrap_or(Decimal::new(8, 1)),
            countdown_secs: env::var("COUNTDOWN_SECS")
                .unwrap_or_else(|_| "3".into())
                .parse()
                .unwrap_or(3),
            history_cap: env::var("HISTORY_CAP")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            dashboard_starting_balance: env::var("DASHBOARD_STARTING_BALANCE")
                .unwrap_or_else(|_| "100".into())
                .parse()
                .unwrap_or(Decimal::from(100)),
            default_pair: env::var("DEFAULT_PAIR").unwrap_or_else(|_| DEFAULT_PAIR.into()),
            outcome_seed: env::var("OUTCOME_SEED").ok().and_then(|s| s.parse().ok()),
            session_idle_secs: env::var("SESSION_IDLE_SECS")
                .unwrap_or_else(|_| "1800".into())
                .parse()
                .unwrap_or(1_800),

            wallet_starting_balance: env::var("WALLET_STARTING_BALANCE")
                .unwrap_or_else(|_| "1000".into())
                .parse()
                .unwrap_or(Decimal::from(1_000)),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".into(),
            port: 8080,
            api_token: None,
            stake: Decimal::from(5),
            payout_ratio: Decimal::new(8, 1),
            countdown_secs: 3,
            history_cap: 10,
            dashboard_starting_balance: Decimal::from(100),
            default_pair: DEFAULT_PAIR.into(),
            outcome_seed: None,
            session_idle_secs: 1_800,
            wallet_starting_balance: Decimal::from(1_000),
        }
    }
}
