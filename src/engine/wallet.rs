use std::collections::HashMap;

use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{TransactionKind, WalletTransaction};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalletError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
}

/// Standalone demo wallet. Its balance is unrelated to any settlement
/// session's balance.
#[derive(Debug, Clone, Serialize)]
pub struct Wallet {
    balance: Decimal,
    transactions: Vec<WalletTransaction>,
}

impl Wallet {
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            balance: starting_balance,
            transactions: Vec::new(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Most recent first.
    pub fn transactions(&self) -> Vec<WalletTransaction> {
        self.transactions.iter().rev().cloned().collect()
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::NonPositiveAmount(amount));
        }
        self.balance += amount;
        self.push(TransactionKind::Deposit, amount);
        Ok(self.balance)
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::NonPositiveAmount(amount));
        }
        if amount > self.balance {
            return Err(WalletError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        self.push(TransactionKind::Withdrawal, amount);
        Ok(self.balance)
    }

    fn push(&mut self, kind: TransactionKind, amount: Decimal) {
        counter!("wallet_transactions_total").increment(1);
        self.transactions.push(WalletTransaction {
            id: Uuid::new_v4(),
            kind,
            amount,
            created_at: Utc::now(),
        });
    }
}

/// Per-user wallets, created on first access.
pub struct WalletBook {
    starting_balance: Decimal,
    wallets: Mutex<HashMap<String, Wallet>>,
}

impl WalletBook {
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            starting_balance,
            wallets: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, user_id: &str) -> Wallet {
        let mut wallets = self.wallets.lock().await;
        wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::new(self.starting_balance))
            .clone()
    }

    pub async fn deposit(&self, user_id: &str, amount: Decimal) -> Result<Wallet, WalletError> {
        let mut wallets = self.wallets.lock().await;
        let wallet = wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::new(self.starting_balance));
        let balance = wallet.deposit(amount)?;
        tracing::info!(user_id, amount = %amount, balance = %balance, "Wallet deposit");
        Ok(wallet.clone())
    }

    pub async fn withdraw(&self, user_id: &str, amount: Decimal) -> Result<Wallet, WalletError> {
        let mut wallets = self.wallets.lock().await;
        let wallet = wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::new(self.starting_balance));
        let balance = wallet.withdraw(amount).inspect_err(|e| {
            tracing::warn!(user_id, error = %e, "Wallet withdrawal rejected");
        })?;
        tracing::info!(user_id, amount = %amount, balance = %balance, "Wallet withdrawal");
        Ok(wallet.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_and_withdraw() {
        let mut wallet = Wallet::new(Decimal::from(1000));
        assert_eq!(wallet.deposit(Decimal::from(500)).unwrap(), Decimal::from(1500));
        assert_eq!(wallet.withdraw(Decimal::from(200)).unwrap(), Decimal::from(1300));

        let txs = wallet.transactions();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].kind, TransactionKind::Withdrawal);
    }

    #[test]
    fn test_rejects_invalid_amounts() {
        let mut wallet = Wallet::new(Decimal::from(100));
        assert_eq!(
            wallet.deposit(Decimal::ZERO),
            Err(WalletError::NonPositiveAmount(Decimal::ZERO))
        );
        assert!(wallet.withdraw(Decimal::from(-1)).is_err());
        assert_eq!(
            wallet.withdraw(Decimal::from(101)),
            Err(WalletError::InsufficientFunds {
                requested: Decimal::from(101),
                available: Decimal::from(100),
            })
        );
        assert_eq!(wallet.balance(), Decimal::from(100));
        assert!(wallet.transactions().is_empty());
    }

    #[test]
    fn test_withdraw_entire_balance() {
        let mut wallet = Wallet::new(Decimal::from(100));
        assert_eq!(wallet.withdraw(Decimal::from(100)).unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_book_isolates_users() {
        let book = WalletBook::new(Decimal::from(1000));
        book.deposit("a", Decimal::from(50)).await.unwrap();

        assert_eq!(book.get("a").await.balance(), Decimal::from(1050));
        assert_eq!(book.get("b").await.balance(), Decimal::from(1000));
    }
}
