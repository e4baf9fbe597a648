//! On-ramp (fiat to crypto purchase) domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::types::finite_number;

/// How the user pays the fiat side of a purchase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    BankTransfer,
    ApplePay,
    GooglePay,
}

/// Server-side lifecycle of an on-ramp transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnRampStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl OnRampStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// No further transitions happen from a terminal status
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::str::FromStr for OnRampStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid on-ramp status: {}", s)),
        }
    }
}

impl std::fmt::Display for OnRampStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Currencies the on-ramp provider can convert between
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupportedCurrencies {
    pub fiat: Vec<String>,
    pub crypto: Vec<String>,
}

impl SupportedCurrencies {
    #[must_use]
    pub fn supports(&self, fiat: &str, crypto: &str) -> bool {
        self.fiat.iter().any(|c| c.eq_ignore_ascii_case(fiat))
            && self.crypto.iter().any(|c| c.eq_ignore_ascii_case(crypto))
    }
}

/// Request for a conversion quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnRampEstimateRequest {
    #[validate(length(equal = 3, message = "Fiat currency must be an ISO 4217 code"))]
    pub fiat_currency: String,
    #[validate(length(min = 1, message = "Crypto currency is required"))]
    pub crypto_currency: String,
    #[validate(
        custom(function = "finite_number"),
        range(exclusive_min = 0.0, message = "Amount must be greater than 0")
    )]
    pub fiat_amount: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl OnRampEstimateRequest {
    #[must_use]
    pub fn new(
        fiat_currency: impl Into<String>,
        crypto_currency: impl Into<String>,
        fiat_amount: f64,
    ) -> Self {
        Self {
            fiat_currency: fiat_currency.into(),
            crypto_currency: crypto_currency.into(),
            fiat_amount,
            payment_method: PaymentMethod::default(),
        }
    }
}

/// Quoted terms for a conversion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnRampEstimate {
    pub fiat_currency: String,
    pub crypto_currency: String,
    #[validate(range(min = 0.0, message = "Fiat amount cannot be negative"))]
    pub fiat_amount: f64,
    #[validate(range(min = 0.0, message = "Crypto amount cannot be negative"))]
    pub crypto_amount: f64,
    #[validate(range(exclusive_min = 0.0, message = "Exchange rate must be positive"))]
    pub exchange_rate: f64,
    #[serde(default)]
    pub fee_amount: f64,
    #[serde(default)]
    pub network_fee: f64,
    #[validate(range(min = 0.0, message = "Total cannot be negative"))]
    pub total_fiat: f64,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl OnRampEstimate {
    /// Whether the quote has expired at `now`; quotes without expiry never do
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|t| t <= now).unwrap_or(false)
    }
}

/// Request to start a purchase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnRampRequest {
    #[validate(nested)]
    #[serde(flatten)]
    pub estimate: OnRampEstimateRequest,
    #[validate(length(min = 1, message = "Wallet address is required"))]
    pub wallet_address: String,
}

impl OnRampRequest {
    #[must_use]
    pub fn new(estimate: OnRampEstimateRequest, wallet_address: impl Into<String>) -> Self {
        Self {
            estimate,
            wallet_address: wallet_address.into(),
        }
    }
}

/// Server snapshot of a purchase. Read-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnRampTransaction {
    #[validate(length(min = 1, message = "Transaction id is required"))]
    pub id: String,
    pub status: OnRampStatus,
    pub fiat_currency: String,
    pub crypto_currency: String,
    #[validate(range(min = 0.0, message = "Fiat amount cannot be negative"))]
    pub fiat_amount: f64,
    #[serde(default)]
    pub crypto_amount: Option<f64>,
    pub wallet_address: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// Envelope payload for purchase mutations
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionPayload {
    pub transaction: Option<OnRampTransaction>,
}
