//! Test doubles shared by unit and integration tests.

pub mod fixtures;
pub mod logs;
pub mod mocks;

pub use logs::LogCapture;
pub use mocks::{
    FailingStore, MockAuditClient, MockConfig, MockLearningClient, MockOnRampClient,
    MockWalletClient,
};
