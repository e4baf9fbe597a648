//! Infrastructure layer implementations.

pub mod http;
pub mod storage;

pub use http::{
    HttpAuditClient, HttpLearningClient, HttpOnRampClient, HttpTransport, HttpWalletClient,
};
pub use storage::{EncryptedFileStore, JsonFileStore, MemoryStore, SecureStorage};
