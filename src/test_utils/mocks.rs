//! Mock implementations for testing.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::fixtures;
use crate::app::CancellationToken;
use crate::domain::{
    AppError, AuditClient, AuditLog, ContentFilter, EducationalContent, FavoriteStatus,
    KeyValueStore, LearningClient, LearningProgress, OnRampClient, OnRampEstimate,
    OnRampEstimateRequest, OnRampRequest, OnRampStatus, OnRampTransaction, ProgressUpdate,
    QuizResult, QuizSubmission, StorageError, SupportedCurrencies, TransportError, Wallet,
    WalletBalance, WalletClient,
};

/// Configuration for mock behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub should_fail: bool,
    pub error_message: Option<String>,
    /// Sleep before answering, to hold a call in flight
    pub delay: Option<Duration>,
}

impl MockConfig {
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            delay: None,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Apply the configured delay, then fail if configured to
    async fn respond(&self) -> Result<(), AppError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            let msg = self
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock error".to_string());
            return Err(AppError::Transport(TransportError::Network(msg)));
        }
        Ok(())
    }
}

/// Names of the client methods a mock has been called with, in order
#[derive(Debug, Default)]
struct CallLog(Mutex<Vec<&'static str>>);

impl CallLog {
    fn push(&self, name: &'static str) {
        self.0.lock().unwrap().push(name);
    }

    fn all(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, name: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|n| **n == name).count()
    }
}

// ============================================================================
// LEARNING
// ============================================================================

/// Mock learning client backed by in-memory progress and favorites
pub struct MockLearningClient {
    config: MockConfig,
    calls: CallLog,
    content: Vec<EducationalContent>,
    progress: Mutex<HashMap<String, LearningProgress>>,
    favorites: Mutex<HashSet<String>>,
    completion: Option<LearningProgress>,
    last_limit: Mutex<Option<u32>>,
}

impl MockLearningClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            calls: CallLog::default(),
            content: fixtures::content_catalog(),
            progress: Mutex::new(HashMap::new()),
            favorites: Mutex::new(HashSet::new()),
            completion: None,
            last_limit: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Answer `complete_module` with exactly this record
    #[must_use]
    pub fn with_completion(mut self, progress: LearningProgress) -> Self {
        self.completion = Some(progress);
        self
    }

    pub fn insert_progress(&self, progress: LearningProgress) {
        self.progress
            .lock()
            .unwrap()
            .insert(progress.module_id.clone(), progress);
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.count(method)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.all()
    }

    pub fn last_recommendation_limit(&self) -> Option<u32> {
        *self.last_limit.lock().unwrap()
    }

    async fn enter(&self, method: &'static str) -> Result<(), AppError> {
        self.calls.push(method);
        self.config.respond().await
    }

    fn store_progress(&self, progress: &LearningProgress) {
        self.insert_progress(progress.clone());
    }
}

impl Default for MockLearningClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LearningClient for MockLearningClient {
    async fn list_content(
        &self,
        filter: &ContentFilter,
    ) -> Result<Vec<EducationalContent>, AppError> {
        self.enter("list_content").await?;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(self
            .content
            .iter()
            .filter(|c| filter.category.as_ref().is_none_or(|cat| &c.category == cat))
            .filter(|c| filter.difficulty.is_none_or(|d| c.difficulty == d))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_content(&self, content_id: &str) -> Result<EducationalContent, AppError> {
        self.enter("get_content").await?;
        self.content
            .iter()
            .find(|c| c.id == content_id)
            .cloned()
            .ok_or_else(|| {
                AppError::Transport(TransportError::Http {
                    status_code: 404,
                    message: format!("Content {} not found", content_id),
                })
            })
    }

    async fn search_content(&self, query: &str) -> Result<Vec<EducationalContent>, AppError> {
        self.enter("search_content").await?;
        let query = query.to_lowercase();
        Ok(self
            .content
            .iter()
            .filter(|c| c.title.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    async fn get_recommendations(&self, limit: u32) -> Result<Vec<EducationalContent>, AppError> {
        *self.last_limit.lock().unwrap() = Some(limit);
        self.enter("get_recommendations").await?;
        Ok(self.content.iter().take(limit as usize).cloned().collect())
    }

    async fn list_favorites(&self) -> Result<Vec<EducationalContent>, AppError> {
        self.enter("list_favorites").await?;
        let favorites = self.favorites.lock().unwrap().clone();
        Ok(self
            .content
            .iter()
            .filter(|c| favorites.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_progress(&self) -> Result<Vec<LearningProgress>, AppError> {
        self.enter("list_progress").await?;
        Ok(self.progress.lock().unwrap().values().cloned().collect())
    }

    async fn get_module_progress(
        &self,
        module_id: &str,
    ) -> Result<Option<LearningProgress>, AppError> {
        self.enter("get_module_progress").await?;
        Ok(self.progress.lock().unwrap().get(module_id).cloned())
    }

    async fn start_module(&self, module_id: &str) -> Result<LearningProgress, AppError> {
        self.enter("start_module").await?;
        let progress = LearningProgress::new(format!("p-{}", module_id), module_id, 0.0);
        self.store_progress(&progress);
        Ok(progress)
    }

    async fn update_progress(
        &self,
        module_id: &str,
        update: &ProgressUpdate,
    ) -> Result<LearningProgress, AppError> {
        self.enter("update_progress").await?;
        let mut progress = LearningProgress::new(format!("p-{}", module_id), module_id, update.progress);
        progress.time_spent = update.time_spent;
        progress.updated_at = Some(Utc::now());
        self.store_progress(&progress);
        Ok(progress)
    }

    async fn complete_module(
        &self,
        module_id: &str,
        score: f64,
    ) -> Result<LearningProgress, AppError> {
        self.enter("complete_module").await?;
        if let Some(progress) = &self.completion {
            return Ok(progress.clone());
        }
        let mut progress = LearningProgress::new(format!("p-{}", module_id), module_id, 100.0);
        progress.score = Some(score);
        progress.completed_at = Some(Utc::now());
        self.store_progress(&progress);
        Ok(progress)
    }

    async fn submit_quiz(
        &self,
        quiz_id: &str,
        submission: &QuizSubmission,
    ) -> Result<QuizResult, AppError> {
        self.enter("submit_quiz").await?;
        let total = submission.answers.len() as u32;
        Ok(QuizResult {
            quiz_id: quiz_id.to_string(),
            score: 100.0,
            passed: true,
            correct_answers: total,
            total_questions: total,
        })
    }

    async fn toggle_favorite(&self, content_id: &str) -> Result<FavoriteStatus, AppError> {
        self.enter("toggle_favorite").await?;
        let mut favorites = self.favorites.lock().unwrap();
        let is_favorite = if favorites.remove(content_id) {
            false
        } else {
            favorites.insert(content_id.to_string());
            true
        };
        Ok(FavoriteStatus {
            content_id: content_id.to_string(),
            is_favorite,
        })
    }
}

// ============================================================================
// ON-RAMP
// ============================================================================

/// Mock on-ramp client quoting a fixed 1:1 rate
pub struct MockOnRampClient {
    config: MockConfig,
    calls: CallLog,
    expired_quotes: bool,
    cancel_on_commit: Option<CancellationToken>,
    transactions: Mutex<Vec<OnRampTransaction>>,
}

impl MockOnRampClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            calls: CallLog::default(),
            expired_quotes: false,
            cancel_on_commit: None,
            transactions: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Quote with an expiry already in the past
    #[must_use]
    pub fn with_expired_quotes(mut self) -> Self {
        self.expired_quotes = true;
        self
    }

    /// Cancel `token` right after a mutation succeeds, as a caller racing
    /// the response would
    #[must_use]
    pub fn cancelling_after_commit(mut self, token: CancellationToken) -> Self {
        self.cancel_on_commit = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.all()
    }

    async fn enter(&self, method: &'static str) -> Result<(), AppError> {
        self.calls.push(method);
        self.config.respond().await
    }

    fn committed(&self) {
        if let Some(token) = &self.cancel_on_commit {
            token.cancel();
        }
    }

    fn find(&self, transaction_id: &str) -> Result<OnRampTransaction, AppError> {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned()
            .map_or_else(|| Ok(fixtures::transaction(transaction_id)), Ok)
    }
}

impl Default for MockOnRampClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OnRampClient for MockOnRampClient {
    async fn supported_currencies(&self) -> Result<SupportedCurrencies, AppError> {
        self.enter("supported_currencies").await?;
        Ok(SupportedCurrencies {
            fiat: vec!["USD".to_string(), "EUR".to_string()],
            crypto: vec!["USDC".to_string(), "SOL".to_string()],
        })
    }

    async fn get_estimate(
        &self,
        request: &OnRampEstimateRequest,
    ) -> Result<OnRampEstimate, AppError> {
        self.enter("get_estimate").await?;
        let offset = if self.expired_quotes {
            ChronoDuration::minutes(-1)
        } else {
            ChronoDuration::minutes(5)
        };
        Ok(OnRampEstimate {
            fiat_currency: request.fiat_currency.clone(),
            crypto_currency: request.crypto_currency.clone(),
            fiat_amount: request.fiat_amount,
            crypto_amount: request.fiat_amount,
            exchange_rate: 1.0,
            fee_amount: 0.0,
            network_fee: 0.0,
            total_fiat: request.fiat_amount,
            expires_at: Some(Utc::now() + offset),
        })
    }

    async fn initiate_transaction(
        &self,
        request: &OnRampRequest,
    ) -> Result<OnRampTransaction, AppError> {
        self.enter("initiate_transaction").await?;
        let mut transactions = self.transactions.lock().unwrap();
        let mut transaction = fixtures::transaction(&format!("tx-{}", transactions.len() + 1));
        transaction.fiat_currency = request.estimate.fiat_currency.clone();
        transaction.crypto_currency = request.estimate.crypto_currency.clone();
        transaction.fiat_amount = request.estimate.fiat_amount;
        transaction.wallet_address = request.wallet_address.clone();
        transaction.payment_method = request.estimate.payment_method;
        transactions.push(transaction.clone());
        self.committed();
        Ok(transaction)
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<OnRampTransaction, AppError> {
        self.enter("get_transaction").await?;
        self.find(transaction_id)
    }

    async fn list_transactions(&self) -> Result<Vec<OnRampTransaction>, AppError> {
        self.enter("list_transactions").await?;
        let mut transactions = self.transactions.lock().unwrap().clone();
        transactions.reverse();
        Ok(transactions)
    }

    async fn cancel_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<OnRampTransaction, AppError> {
        self.enter("cancel_transaction").await?;
        let mut transaction = self.find(transaction_id)?;
        transaction.status = OnRampStatus::Cancelled;
        transaction.updated_at = Some(Utc::now());
        self.committed();
        Ok(transaction)
    }
}

// ============================================================================
// WALLET
// ============================================================================

/// Mock wallet client serving one fixed wallet
pub struct MockWalletClient {
    config: MockConfig,
    calls: CallLog,
    wallet: Wallet,
}

impl MockWalletClient {
    #[must_use]
    pub fn with_wallet(wallet: Wallet) -> Self {
        Self {
            config: MockConfig::success(),
            calls: CallLog::default(),
            wallet,
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            config: MockConfig::failure(message),
            ..Self::with_wallet(fixtures::wallet())
        }
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.count(method)
    }

    async fn enter(&self, method: &'static str) -> Result<(), AppError> {
        self.calls.push(method);
        self.config.respond().await
    }

    fn balances_of(&self, wallet_id: &str) -> Result<Vec<WalletBalance>, AppError> {
        if wallet_id != self.wallet.id {
            return Err(AppError::Transport(TransportError::Http {
                status_code: 404,
                message: format!("Wallet {} not found", wallet_id),
            }));
        }
        Ok(self.wallet.balances.clone())
    }
}

#[async_trait]
impl WalletClient for MockWalletClient {
    async fn get_wallet(&self) -> Result<Wallet, AppError> {
        self.enter("get_wallet").await?;
        Ok(self.wallet.clone())
    }

    async fn get_balances(&self, wallet_id: &str) -> Result<Vec<WalletBalance>, AppError> {
        self.enter("get_balances").await?;
        self.balances_of(wallet_id)
    }

    async fn refresh_balances(&self, wallet_id: &str) -> Result<Vec<WalletBalance>, AppError> {
        self.enter("refresh_balances").await?;
        self.balances_of(wallet_id)
    }
}

// ============================================================================
// AUDIT
// ============================================================================

/// Mock audit sink keeping every recorded entry
pub struct MockAuditClient {
    config: MockConfig,
    recorded: Mutex<Vec<AuditLog>>,
}

impl MockAuditClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            recorded: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    pub fn recorded(&self) -> Vec<AuditLog> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Default for MockAuditClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditClient for MockAuditClient {
    async fn record(&self, log: &AuditLog) -> Result<(), AppError> {
        self.config.respond().await?;
        self.recorded.lock().unwrap().push(log.clone());
        Ok(())
    }
}

// ============================================================================
// STORAGE
// ============================================================================

/// Key-value store where every operation fails
#[derive(Debug, Default)]
pub struct FailingStore;

impl FailingStore {
    fn fail(op: &str) -> AppError {
        AppError::Storage(StorageError::Backend(format!("{} unavailable", op)))
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn set(&self, _key: &str, _value: &str) -> Result<(), AppError> {
        Err(Self::fail("set"))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
        Err(Self::fail("get"))
    }

    async fn remove(&self, _key: &str) -> Result<(), AppError> {
        Err(Self::fail("remove"))
    }

    async fn clear(&self) -> Result<(), AppError> {
        Err(Self::fail("clear"))
    }

    async fn clear_prefix(&self, _prefix: &str) -> Result<(), AppError> {
        Err(Self::fail("clear_prefix"))
    }
}
