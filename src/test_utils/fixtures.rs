//! Canned domain values for tests.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    ContentType, Difficulty, EducationalContent, OnRampStatus, OnRampTransaction, PaymentMethod,
    Wallet, WalletBalance,
};
use crate::infra::{MemoryStore, SecureStorage};

/// Base64 of thirty-two `0x07` bytes
pub const ENCRYPTION_KEY_B64: &str = "BwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwc=";
pub const ENCRYPTION_KEY: [u8; 32] = [7u8; 32];

#[must_use]
pub fn content(id: &str, category: &str, difficulty: Difficulty) -> EducationalContent {
    EducationalContent {
        id: id.to_string(),
        title: format!("{} basics", category),
        category: category.to_string(),
        difficulty,
        content_type: ContentType::Article,
        body: String::new(),
        duration_minutes: Some(5),
        tags: vec![category.to_string()],
        created_at: None,
    }
}

#[must_use]
pub fn content_catalog() -> Vec<EducationalContent> {
    vec![
        content("c1", "savings", Difficulty::Beginner),
        content("c2", "savings", Difficulty::Intermediate),
        content("c3", "crypto", Difficulty::Beginner),
        content("c4", "budgeting", Difficulty::Advanced),
    ]
}

#[must_use]
pub fn wallet_with_balances(balances: Vec<WalletBalance>) -> Wallet {
    Wallet {
        id: "w1".to_string(),
        user_id: "u1".to_string(),
        custody_id: "custody-1".to_string(),
        address: "wallet-addr".to_string(),
        balances,
        created_at: Some(Utc::now()),
    }
}

#[must_use]
pub fn wallet() -> Wallet {
    wallet_with_balances(vec![
        WalletBalance::new("USDC", 125.5),
        WalletBalance::new("SOL", 2.0),
    ])
}

#[must_use]
pub fn transaction(id: &str) -> OnRampTransaction {
    OnRampTransaction {
        id: id.to_string(),
        status: OnRampStatus::Pending,
        fiat_currency: "USD".to_string(),
        crypto_currency: "USDC".to_string(),
        fiat_amount: 50.0,
        crypto_amount: None,
        wallet_address: "wallet-addr".to_string(),
        payment_method: PaymentMethod::Card,
        created_at: Utc::now(),
        updated_at: None,
        failure_reason: None,
    }
}

/// Storage with an in-memory store behind each tier
#[must_use]
pub fn memory_storage() -> SecureStorage {
    SecureStorage::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
}
