//! Wallet and balance projections of backend state.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::ValidationError;

/// Balance of one currency held in a wallet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    #[validate(length(min = 1, message = "Currency is required"))]
    pub currency: String,
    #[validate(range(min = 0.0, message = "Available balance cannot be negative"))]
    pub available: f64,
    #[validate(range(min = 0.0, message = "Pending balance cannot be negative"))]
    #[serde(default)]
    pub pending: f64,
    pub last_updated: DateTime<Utc>,
}

impl WalletBalance {
    #[must_use]
    pub fn new(currency: impl Into<String>, available: f64) -> Self {
        Self {
            currency: currency.into(),
            available,
            pending: 0.0,
            last_updated: Utc::now(),
        }
    }

    /// Zero balance for a currency the wallet has never held
    #[must_use]
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(currency, 0.0)
    }
}

/// A custodial wallet owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[validate(length(min = 1, message = "Wallet id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
    /// Identifier of the wallet at the external custody provider
    #[validate(length(min = 1, message = "Custody id is required"))]
    pub custody_id: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(nested)]
    #[serde(default)]
    pub balances: Vec<WalletBalance>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// Rejects a wallet whose balances list a currency more than once
    pub fn validate_balances(&self) -> Result<(), ValidationError> {
        ensure_unique_currencies(&self.balances)
    }

    #[must_use]
    pub fn balance(&self, currency: &str) -> Option<&WalletBalance> {
        self.balances
            .iter()
            .find(|b| b.currency.eq_ignore_ascii_case(currency))
    }
}

/// Currency codes compare case-insensitively
pub fn ensure_unique_currencies(balances: &[WalletBalance]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(balances.len());
    for balance in balances {
        if !seen.insert(balance.currency.to_ascii_uppercase()) {
            return Err(ValidationError::DuplicateCurrency(balance.currency.clone()));
        }
    }
    Ok(())
}

/// Envelope payload for balance refreshes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BalancesPayload {
    pub balances: Vec<WalletBalance>,
}
