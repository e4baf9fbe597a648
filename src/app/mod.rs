//! Application layer: domain services, cancellation and shared state.

pub mod audit_service;
pub mod cancel;
pub mod inflight;
pub mod learning_service;
pub mod onramp_service;
pub(crate) mod outcome;
pub mod state;
pub mod wallet_service;

pub use audit_service::AuditService;
pub use cancel::CancellationToken;
pub use inflight::{InFlightGuard, InFlightRegistry};
pub use learning_service::LearningService;
pub use onramp_service::OnRampService;
pub use state::AppState;
pub use wallet_service::WalletService;
