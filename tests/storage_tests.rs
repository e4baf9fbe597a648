//! Storage adapter tests over file-backed and failing backends.

use std::sync::Arc;

use tempfile::TempDir;

use wallet_service_core::domain::{AppError, KeyValueStore, StorageError};
use wallet_service_core::infra::storage::{PLAIN_FILE, SECURE_FILE, keys};
use wallet_service_core::infra::{EncryptedFileStore, JsonFileStore, MemoryStore, SecureStorage};
use wallet_service_core::test_utils::{FailingStore, fixtures};

fn file_storage(dir: &TempDir) -> SecureStorage {
    SecureStorage::new(
        Arc::new(EncryptedFileStore::new(
            dir.path().join(SECURE_FILE),
            &fixtures::ENCRYPTION_KEY,
        )),
        Arc::new(JsonFileStore::new(dir.path().join(PLAIN_FILE))),
    )
}

fn failing_storage() -> SecureStorage {
    SecureStorage::new(Arc::new(FailingStore), Arc::new(FailingStore))
}

#[tokio::test]
async fn test_secure_round_trip_and_remove() {
    let dir = TempDir::new().unwrap();
    let storage = file_storage(&dir);

    storage
        .set_secure_item(keys::USER_CREDENTIALS, r#"{"email":"a@b.c"}"#)
        .await
        .unwrap();
    assert_eq!(
        storage.get_secure_item(keys::USER_CREDENTIALS).await.as_deref(),
        Some(r#"{"email":"a@b.c"}"#)
    );

    storage.remove_secure_item(keys::USER_CREDENTIALS).await.unwrap();
    assert!(storage.get_secure_item(keys::USER_CREDENTIALS).await.is_none());
}

#[tokio::test]
async fn test_values_survive_reopen() {
    let dir = TempDir::new().unwrap();
    file_storage(&dir)
        .set_secure_item(keys::SESSION_TOKEN, "tok-1")
        .await
        .unwrap();
    file_storage(&dir)
        .set_item(keys::APP_SETTINGS, r#"{"theme":"dark"}"#)
        .await
        .unwrap();

    let reopened = file_storage(&dir);
    assert_eq!(
        reopened.get_secure_item(keys::SESSION_TOKEN).await.as_deref(),
        Some("tok-1")
    );
    assert_eq!(
        reopened.get_item(keys::APP_SETTINGS).await.as_deref(),
        Some(r#"{"theme":"dark"}"#)
    );
}

#[tokio::test]
async fn test_tiers_do_not_leak() {
    let dir = TempDir::new().unwrap();
    let storage = file_storage(&dir);

    storage.set_secure_item("pin", "1234").await.unwrap();
    storage.set_item(keys::USER_PREFERENCES, "{}").await.unwrap();

    assert!(storage.get_item("pin").await.is_none());
    assert!(storage.get_secure_item(keys::USER_PREFERENCES).await.is_none());
}

#[tokio::test]
async fn test_clear_all_wipes_both_tiers() {
    let dir = TempDir::new().unwrap();
    let storage = file_storage(&dir);

    storage.set_secure_item(keys::SESSION_TOKEN, "tok").await.unwrap();
    storage.set_secure_item(keys::USER_CREDENTIALS, "creds").await.unwrap();
    storage.set_item(keys::USER_PREFERENCES, "{}").await.unwrap();
    storage.set_item("lastScreen", "home").await.unwrap();
    storage.mark_onboarding_seen().await.unwrap();

    storage.clear_all().await.unwrap();

    assert!(storage.get_secure_item(keys::SESSION_TOKEN).await.is_none());
    assert!(storage.get_secure_item(keys::USER_CREDENTIALS).await.is_none());
    assert!(storage.get_item(keys::USER_PREFERENCES).await.is_none());
    assert!(storage.get_item("lastScreen").await.is_none());
    assert!(!storage.has_seen_onboarding().await);
}

#[tokio::test]
async fn test_secrets_encrypted_at_rest() {
    let dir = TempDir::new().unwrap();
    let storage = file_storage(&dir);

    storage
        .set_secure_item(keys::SESSION_TOKEN, "eyJhbGciOi.super-secret-token")
        .await
        .unwrap();
    storage.set_item(keys::APP_SETTINGS, "visible-setting").await.unwrap();

    let secure = std::fs::read_to_string(dir.path().join(SECURE_FILE)).unwrap();
    assert!(!secure.contains("super-secret-token"));
    assert!(secure.contains("secure:sessionToken"));

    let plain = std::fs::read_to_string(dir.path().join(PLAIN_FILE)).unwrap();
    assert!(plain.contains("visible-setting"));
}

#[tokio::test]
async fn test_tampered_ciphertext_reads_as_absent() {
    let dir = TempDir::new().unwrap();
    let storage = file_storage(&dir);
    storage.set_secure_item(keys::SESSION_TOKEN, "tok").await.unwrap();

    let path = dir.path().join(SECURE_FILE);
    let mut entries: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    entries.insert("secure:sessionToken".to_string(), "AAAAAAAAAAAAAAAAAAAAAAAA".into());
    std::fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();

    assert!(storage.get_secure_item(keys::SESSION_TOKEN).await.is_none());
    assert!(storage.session_token().await.is_none());
}

#[tokio::test]
async fn test_read_failures_return_none() {
    let storage = failing_storage();
    assert!(storage.get_secure_item(keys::SESSION_TOKEN).await.is_none());
    assert!(storage.get_item(keys::APP_SETTINGS).await.is_none());
    assert!(!storage.is_biometric_enabled().await);
}

#[tokio::test]
async fn test_write_and_remove_failures_are_errors() {
    let storage = failing_storage();

    let err = storage.set_secure_item(keys::SESSION_TOKEN, "tok").await.unwrap_err();
    assert!(matches!(err, AppError::Storage(StorageError::Write(ref k)) if k == keys::SESSION_TOKEN));
    assert_eq!(err.to_string(), "Storage error: Failed to store value for 'sessionToken'");

    let err = storage.set_item(keys::APP_SETTINGS, "{}").await.unwrap_err();
    assert!(matches!(err, AppError::Storage(StorageError::Write(_))));

    let err = storage.remove_item(keys::APP_SETTINGS).await.unwrap_err();
    assert!(matches!(err, AppError::Storage(StorageError::Remove(_))));

    let err = storage.remove_secure_item(keys::SESSION_TOKEN).await.unwrap_err();
    assert!(matches!(err, AppError::Storage(StorageError::Remove(_))));
}

#[tokio::test]
async fn test_clear_all_failure_is_wipe_error() {
    let storage = SecureStorage::new(Arc::new(MemoryStore::new()), Arc::new(FailingStore));
    let err = storage.clear_all().await.unwrap_err();
    assert!(matches!(err, AppError::Storage(StorageError::Wipe(_))));
}

#[tokio::test]
async fn test_concurrent_writes_all_land() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join(PLAIN_FILE)));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.set(&format!("k{}", i), "v").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for i in 0..16 {
        assert_eq!(store.get(&format!("k{}", i)).await.unwrap().as_deref(), Some("v"));
    }
}
