//! Two-tier storage adapter.
//!
//! Secrets go to the secure backend, preferences and flags to the plain one.
//! Keys are namespaced before they reach a backend, so the tiers stay
//! isolated even when both share a single store.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument, warn};

use crate::domain::{AppError, KeyValueStore, StorageError};

const SECURE_PREFIX: &str = "secure:";
const PLAIN_PREFIX: &str = "plain:";

/// Well-known storage keys
pub mod keys {
    pub const SESSION_TOKEN: &str = "sessionToken";
    pub const USER_CREDENTIALS: &str = "userCredentials";

    pub const USER_PREFERENCES: &str = "userPreferences";
    pub const APP_SETTINGS: &str = "appSettings";
    pub const BIOMETRIC_ENABLED: &str = "biometricEnabled";
    pub const HAS_SEEN_ONBOARDING: &str = "hasSeenOnboarding";

    /// Secure entries removed by `clear_all`
    pub const SECURE_KEYS: [&str; 2] = [SESSION_TOKEN, USER_CREDENTIALS];
}

#[derive(Clone, Copy, Debug)]
enum Tier {
    Secure,
    Plain,
}

impl Tier {
    fn prefix(self) -> &'static str {
        match self {
            Self::Secure => SECURE_PREFIX,
            Self::Plain => PLAIN_PREFIX,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::Plain => "plain",
        }
    }
}

/// Key-value storage split into an encrypted tier and a plain tier
pub struct SecureStorage {
    secure: Arc<dyn KeyValueStore>,
    plain: Arc<dyn KeyValueStore>,
}

impl SecureStorage {
    #[must_use]
    pub fn new(secure: Arc<dyn KeyValueStore>, plain: Arc<dyn KeyValueStore>) -> Self {
        Self { secure, plain }
    }

    fn backend(&self, tier: Tier) -> &dyn KeyValueStore {
        match tier {
            Tier::Secure => self.secure.as_ref(),
            Tier::Plain => self.plain.as_ref(),
        }
    }

    fn namespaced(tier: Tier, key: &str) -> String {
        format!("{}{}", tier.prefix(), key)
    }

    async fn set(&self, tier: Tier, key: &str, value: &str) -> Result<(), AppError> {
        self.backend(tier)
            .set(&Self::namespaced(tier, key), value)
            .await
            .map_err(|e| {
                error!(tier = tier.name(), key = %key, error = %e, "Storage write failed");
                AppError::Storage(StorageError::Write(key.to_string()))
            })?;
        debug!(tier = tier.name(), key = %key, "Stored value");
        Ok(())
    }

    async fn get(&self, tier: Tier, key: &str) -> Option<String> {
        match self.backend(tier).get(&Self::namespaced(tier, key)).await {
            Ok(value) => value,
            Err(e) => {
                warn!(tier = tier.name(), key = %key, error = %e, "Storage read failed");
                None
            }
        }
    }

    async fn remove(&self, tier: Tier, key: &str) -> Result<(), AppError> {
        self.backend(tier)
            .remove(&Self::namespaced(tier, key))
            .await
            .map_err(|e| {
                error!(tier = tier.name(), key = %key, error = %e, "Storage remove failed");
                AppError::Storage(StorageError::Remove(key.to_string()))
            })
    }

    pub async fn set_secure_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.set(Tier::Secure, key, value).await
    }

    /// `None` when absent or unreadable
    pub async fn get_secure_item(&self, key: &str) -> Option<String> {
        self.get(Tier::Secure, key).await
    }

    pub async fn remove_secure_item(&self, key: &str) -> Result<(), AppError> {
        self.remove(Tier::Secure, key).await
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.set(Tier::Plain, key, value).await
    }

    /// `None` when absent or unreadable
    pub async fn get_item(&self, key: &str) -> Option<String> {
        self.get(Tier::Plain, key).await
    }

    pub async fn remove_item(&self, key: &str) -> Result<(), AppError> {
        self.remove(Tier::Plain, key).await
    }

    /// Remove the session secrets and every plain entry.
    ///
    /// Stops at the first failure.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<(), AppError> {
        let wipe = |e: AppError| {
            error!(error = %e, "Storage wipe failed");
            AppError::Storage(StorageError::Wipe(e.to_string()))
        };

        for key in keys::SECURE_KEYS {
            self.secure
                .remove(&Self::namespaced(Tier::Secure, key))
                .await
                .map_err(wipe)?;
        }
        self.plain.clear_prefix(PLAIN_PREFIX).await.map_err(wipe)?;

        debug!("Storage cleared");
        Ok(())
    }

    pub async fn session_token(&self) -> Option<SecretString> {
        self.get_secure_item(keys::SESSION_TOKEN)
            .await
            .map(SecretString::from)
    }

    pub async fn set_session_token(&self, token: &SecretString) -> Result<(), AppError> {
        self.set_secure_item(keys::SESSION_TOKEN, token.expose_secret())
            .await
    }

    pub async fn has_seen_onboarding(&self) -> bool {
        self.flag(keys::HAS_SEEN_ONBOARDING).await
    }

    pub async fn mark_onboarding_seen(&self) -> Result<(), AppError> {
        self.set_item(keys::HAS_SEEN_ONBOARDING, "true").await
    }

    pub async fn is_biometric_enabled(&self) -> bool {
        self.flag(keys::BIOMETRIC_ENABLED).await
    }

    pub async fn set_biometric_enabled(&self, enabled: bool) -> Result<(), AppError> {
        self.set_item(keys::BIOMETRIC_ENABLED, if enabled { "true" } else { "false" })
            .await
    }

    async fn flag(&self, key: &str) -> bool {
        self.get_item(key).await.is_some_and(|v| v == "true")
    }
}

impl std::fmt::Debug for SecureStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureStorage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::MemoryStore;

    fn shared_backend() -> (Arc<MemoryStore>, SecureStorage) {
        let store = Arc::new(MemoryStore::new());
        let storage = SecureStorage::new(
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
        );
        (store, storage)
    }

    #[tokio::test]
    async fn test_tiers_isolated_on_shared_backend() {
        let (store, storage) = shared_backend();

        storage.set_secure_item("k", "secret").await.unwrap();
        storage.set_item("k", "plain").await.unwrap();

        assert_eq!(storage.get_secure_item("k").await.as_deref(), Some("secret"));
        assert_eq!(storage.get_item("k").await.as_deref(), Some("plain"));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_all_on_shared_backend_keeps_unlisted_secrets() {
        let (_, storage) = shared_backend();
        storage.set_secure_item(keys::SESSION_TOKEN, "tok").await.unwrap();
        storage.set_secure_item("walletSeedHint", "keep").await.unwrap();
        storage.set_item(keys::APP_SETTINGS, "{}").await.unwrap();

        storage.clear_all().await.unwrap();

        assert!(storage.get_secure_item(keys::SESSION_TOKEN).await.is_none());
        assert!(storage.get_item(keys::APP_SETTINGS).await.is_none());
        assert_eq!(
            storage.get_secure_item("walletSeedHint").await.as_deref(),
            Some("keep")
        );
    }

    #[tokio::test]
    async fn test_typed_flags() {
        let (_, storage) = shared_backend();
        assert!(!storage.has_seen_onboarding().await);
        assert!(!storage.is_biometric_enabled().await);

        storage.mark_onboarding_seen().await.unwrap();
        storage.set_biometric_enabled(true).await.unwrap();
        assert!(storage.has_seen_onboarding().await);
        assert!(storage.is_biometric_enabled().await);

        storage.set_biometric_enabled(false).await.unwrap();
        assert!(!storage.is_biometric_enabled().await);
    }

    #[tokio::test]
    async fn test_session_token_round_trip() {
        let (_, storage) = shared_backend();
        assert!(storage.session_token().await.is_none());

        storage
            .set_session_token(&SecretString::from("tok-123"))
            .await
            .unwrap();
        let token = storage.session_token().await.unwrap();
        assert_eq!(token.expose_secret(), "tok-123");
    }
}
