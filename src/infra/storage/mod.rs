//! On-device key-value storage.

pub mod adapter;
pub mod file;
pub mod memory;

pub use adapter::{SecureStorage, keys};
pub use file::{EncryptedFileStore, JsonFileStore};
pub use memory::MemoryStore;

/// File name of the encrypted tier under the storage directory
pub const SECURE_FILE: &str = "secure.json";
/// File name of the plain tier under the storage directory
pub const PLAIN_FILE: &str = "plain.json";
