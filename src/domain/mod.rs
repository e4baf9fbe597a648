//! Domain layer containing core business types, traits, and error definitions.

pub mod audit;
pub mod error;
pub mod learning;
pub mod onramp;
pub mod traits;
pub mod types;
pub mod wallet;

pub use audit::{AuditLog, AuditPayload, Severity};
pub use error::{
    AppError, ConfigError, ServiceError, StorageError, TransportError, ValidationError,
};
pub use learning::{
    CompletionRequest, ContentFilter, ContentType, Difficulty, EducationalContent,
    FavoritePayload, FavoriteStatus, LearningProgress, ProgressPayload, ProgressUpdate,
    QuizAnswer, QuizPayload, QuizResult, QuizSubmission,
};
pub use onramp::{
    OnRampEstimate, OnRampEstimateRequest, OnRampRequest, OnRampStatus, OnRampTransaction,
    PaymentMethod, SupportedCurrencies, TransactionPayload,
};
pub use traits::{AuditClient, KeyValueStore, LearningClient, OnRampClient, WalletClient};
pub use types::{ApiEnvelope, ServiceResponse};
pub use wallet::{BalancesPayload, Wallet, WalletBalance, ensure_unique_currencies};
