//! Domain traits defining the contract with backend resource groups.
//!
//! Implementations map one call to one backend request and propagate any
//! failure unchanged. They never retry, cache or recover.

use async_trait::async_trait;

use super::audit::AuditLog;
use super::error::AppError;
use super::learning::{
    ContentFilter, EducationalContent, FavoriteStatus, LearningProgress, ProgressUpdate,
    QuizResult, QuizSubmission,
};
use super::onramp::{
    OnRampEstimate, OnRampEstimateRequest, OnRampRequest, OnRampTransaction, SupportedCurrencies,
};
use super::wallet::{Wallet, WalletBalance};

/// Learning content, progress and quiz endpoints
#[async_trait]
pub trait LearningClient: Send + Sync {
    /// List content matching the filter
    async fn list_content(&self, filter: &ContentFilter)
    -> Result<Vec<EducationalContent>, AppError>;

    /// Get a single content item
    async fn get_content(&self, content_id: &str) -> Result<EducationalContent, AppError>;

    /// Full-text search over content
    async fn search_content(&self, query: &str) -> Result<Vec<EducationalContent>, AppError>;

    /// Content recommended for the current user
    async fn get_recommendations(&self, limit: u32) -> Result<Vec<EducationalContent>, AppError>;

    /// Content the current user marked as favorite
    async fn list_favorites(&self) -> Result<Vec<EducationalContent>, AppError>;

    /// All progress records of the current user
    async fn list_progress(&self) -> Result<Vec<LearningProgress>, AppError>;

    /// Progress record for one module, `None` if the module was never started
    async fn get_module_progress(
        &self,
        module_id: &str,
    ) -> Result<Option<LearningProgress>, AppError>;

    /// Create the progress record for a module
    async fn start_module(&self, module_id: &str) -> Result<LearningProgress, AppError>;

    /// Update progress and time spent on a module
    async fn update_progress(
        &self,
        module_id: &str,
        update: &ProgressUpdate,
    ) -> Result<LearningProgress, AppError>;

    /// Mark a module complete with the given score
    async fn complete_module(
        &self,
        module_id: &str,
        score: f64,
    ) -> Result<LearningProgress, AppError>;

    /// Submit quiz answers for grading
    async fn submit_quiz(
        &self,
        quiz_id: &str,
        submission: &QuizSubmission,
    ) -> Result<QuizResult, AppError>;

    /// Flip the favorite flag of a content item
    async fn toggle_favorite(&self, content_id: &str) -> Result<FavoriteStatus, AppError>;
}

/// Fiat to crypto on-ramp endpoints
#[async_trait]
pub trait OnRampClient: Send + Sync {
    async fn supported_currencies(&self) -> Result<SupportedCurrencies, AppError>;

    /// Quote a conversion
    async fn get_estimate(
        &self,
        request: &OnRampEstimateRequest,
    ) -> Result<OnRampEstimate, AppError>;

    /// Start a purchase
    async fn initiate_transaction(
        &self,
        request: &OnRampRequest,
    ) -> Result<OnRampTransaction, AppError>;

    /// Fresh snapshot of one purchase
    async fn get_transaction(&self, transaction_id: &str) -> Result<OnRampTransaction, AppError>;

    /// Purchase history of the current user, newest first
    async fn list_transactions(&self) -> Result<Vec<OnRampTransaction>, AppError>;

    /// Request cancellation of a purchase that has not settled
    async fn cancel_transaction(&self, transaction_id: &str)
    -> Result<OnRampTransaction, AppError>;
}

/// Wallet and balance endpoints
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// The wallet of the current user
    async fn get_wallet(&self) -> Result<Wallet, AppError>;

    async fn get_balances(&self, wallet_id: &str) -> Result<Vec<WalletBalance>, AppError>;

    /// Ask the backend to resync balances with the custody provider
    async fn refresh_balances(&self, wallet_id: &str) -> Result<Vec<WalletBalance>, AppError>;
}

/// Audit log sink
#[async_trait]
pub trait AuditClient: Send + Sync {
    async fn record(&self, log: &AuditLog) -> Result<(), AppError>;
}

/// String key-value backend used by the storage adapter
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;

    /// Remove every entry
    async fn clear(&self) -> Result<(), AppError>;

    /// Remove every entry whose key starts with `prefix`
    async fn clear_prefix(&self, prefix: &str) -> Result<(), AppError> {
        let _ = prefix;
        Err(AppError::NotSupported(
            "clear_prefix not implemented".to_string(),
        ))
    }
}
