use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::engine::Wallet;
use crate::models::WalletTransaction;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
}

#[derive(Serialize)]
pub struct WalletView {
    pub balance: Decimal,
    pub transactions: Vec<WalletTransaction>,
}

impl From<Wallet> for WalletView {
    fn from(wallet: Wallet) -> Self {
        Self {
            balance: wallet.balance(),
            transactions: wallet.transactions(),
        }
    }
}

/// GET /api/wallet/:user_id
pub async fn detail(State(state): State<AppState>, Path(user_id): Path<String>) -> Json<WalletView> {
    Json(state.wallets.get(&user_id).await.into())
}

/// POST /api/wallet/:user_id/deposit
pub async fn deposit(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<WalletView>, AppError> {
    let wallet = state.wallets.deposit(&user_id, req.amount).await?;
    Ok(Json(wallet.into()))
}

/// POST /api/wallet/:user_id/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<WalletView>, AppError> {
    let wallet = state.wallets.withdraw(&user_id, req.amount).await?;
    Ok(Json(wallet.into()))
}
