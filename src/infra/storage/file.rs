//! File-backed key-value stores.
//!
//! Both stores keep one JSON object per file. Writes go to a temporary file
//! that is renamed over the original, so a crash never leaves a torn file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{AppError, KeyValueStore, StorageError};

const NONCE_LEN: usize = 12;

type Entries = BTreeMap<String, String>;

fn backend_error(path: &Path, e: impl std::fmt::Display) -> AppError {
    AppError::Storage(StorageError::Backend(format!("{}: {}", path.display(), e)))
}

/// A JSON map persisted in one file. Read-modify-write cycles within this
/// process are serialized.
#[derive(Debug)]
struct MapFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl MapFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Entries, AppError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Entries::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| backend_error(&self.path, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(backend_error(&self.path, e)),
        }
    }

    async fn persist(&self, entries: &Entries) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| backend_error(&self.path, e))?;
            }
        }
        let bytes = serde_json::to_vec_pretty(entries).map_err(|e| backend_error(&self.path, e))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)
            .await
            .map_err(|e| backend_error(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| backend_error(&self.path, e))?;
        debug!(path = %self.path.display(), entries = entries.len(), "Storage file written");
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let _lock = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn update<F>(&self, mutate: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Entries) + Send,
    {
        let _lock = self.lock.lock().await;
        let mut entries = self.load().await?;
        mutate(&mut entries);
        self.persist(&entries).await
    }
}

/// Plain-text JSON store for non-sensitive values
#[derive(Debug)]
pub struct JsonFileStore {
    file: MapFile,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: MapFile::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.file
            .update(move |entries| {
                entries.insert(key, value);
            })
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.file.read(key).await
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.file
            .update(|entries| {
                entries.remove(key);
            })
            .await
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.file.update(|entries| entries.clear()).await
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<(), AppError> {
        self.file
            .update(|entries| entries.retain(|key, _| !key.starts_with(prefix)))
            .await
    }
}

/// AES-256-GCM encrypted store for secrets.
///
/// Each value is sealed with a fresh random nonce and the entry key as
/// associated data, then stored as base64 of `nonce || ciphertext`. Moving a
/// ciphertext to another key makes it undecryptable.
pub struct EncryptedFileStore {
    file: MapFile,
    cipher: Aes256Gcm,
}

impl EncryptedFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, key: &[u8; 32]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        Self {
            file: MapFile::new(path.into()),
            cipher,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    fn seal(&self, key: &str, value: &str) -> Result<String, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: value.as_bytes(),
                    aad: key.as_bytes(),
                },
            )
            .map_err(|e| AppError::Storage(StorageError::Encryption(e.to_string())))?;
        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    fn open(&self, key: &str, sealed: &str) -> Result<String, AppError> {
        let encryption_error =
            |msg: &str| AppError::Storage(StorageError::Encryption(format!("{}: {}", key, msg)));

        let bytes = STANDARD
            .decode(sealed)
            .map_err(|_| encryption_error("value is not valid base64"))?;
        if bytes.len() <= NONCE_LEN {
            return Err(encryption_error("value too short"));
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: key.as_bytes(),
                },
            )
            .map_err(|_| encryption_error("authentication failed"))?;
        String::from_utf8(plaintext).map_err(|_| encryption_error("value is not UTF-8"))
    }
}

impl std::fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("path", &self.file.path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueStore for EncryptedFileStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let sealed = self.seal(key, value)?;
        let key = key.to_string();
        self.file
            .update(move |entries| {
                entries.insert(key, sealed);
            })
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match self.file.read(key).await? {
            Some(sealed) => self.open(key, &sealed).map(Some),
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.file
            .update(|entries| {
                entries.remove(key);
            })
            .await
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.file.update(|entries| entries.clear()).await
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<(), AppError> {
        self.file
            .update(|entries| entries.retain(|key, _| !key.starts_with(prefix)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KEY: [u8; 32] = [42u8; 32];

    #[tokio::test]
    async fn test_json_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.json");

        JsonFileStore::new(&path).set("theme", "dark").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/dir/plain.json"));
        assert!(store.get("anything").await.unwrap().is_none());
        store.remove("anything").await.unwrap();
    }

    #[tokio::test]
    async fn test_encrypted_store_hides_plaintext() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secure.json");
        let store = EncryptedFileStore::new(&path, &KEY);

        store.set("secure:sessionToken", "tok-super-secret").await.unwrap();

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("tok-super-secret"));
        assert_eq!(
            store.get("secure:sessionToken").await.unwrap().as_deref(),
            Some("tok-super-secret")
        );
    }

    #[tokio::test]
    async fn test_wrong_key_cannot_decrypt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secure.json");
        EncryptedFileStore::new(&path, &KEY)
            .set("secure:userCredentials", "{}")
            .await
            .unwrap();

        let other = EncryptedFileStore::new(&path, &[1u8; 32]);
        let result = other.get("secure:userCredentials").await;
        assert!(matches!(
            result,
            Err(AppError::Storage(StorageError::Encryption(_)))
        ));
    }

    #[tokio::test]
    async fn test_ciphertext_bound_to_entry_key() {
        let store = EncryptedFileStore::new(TempDir::new().unwrap().path().join("s.json"), &KEY);
        let sealed = store.seal("a", "value").unwrap();
        assert!(store.open("a", &sealed).is_ok());
        assert!(store.open("b", &sealed).is_err());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_backend_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.json");
        std::fs::write(&path, "not json").unwrap();

        let result = JsonFileStore::new(&path).get("k").await;
        assert!(matches!(result, Err(AppError::Storage(StorageError::Backend(_)))));
    }
}
