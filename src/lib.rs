//! Wallet service core.
//!
//! Typed domain models, per-domain API clients, the domain services UI code
//! calls into, and a two-tier secure/plain key-value storage adapter.

pub mod app;
pub mod config;
pub mod domain;
pub mod infra;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::AppConfig;
