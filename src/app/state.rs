//! Application state management.

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::domain::{AppError, AuditClient, LearningClient, OnRampClient, WalletClient};
use crate::infra::storage::{PLAIN_FILE, SECURE_FILE};
use crate::infra::{
    EncryptedFileStore, HttpAuditClient, HttpLearningClient, HttpOnRampClient, HttpTransport,
    HttpWalletClient, JsonFileStore, SecureStorage,
};

use super::audit_service::AuditService;
use super::learning_service::LearningService;
use super::onramp_service::OnRampService;
use super::wallet_service::WalletService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub learning: Arc<LearningService>,
    pub onramp: Arc<OnRampService>,
    pub wallet: Arc<WalletService>,
    pub audit: Arc<AuditService>,
    pub storage: Arc<SecureStorage>,
}

impl AppState {
    /// Wire services around the given clients and storage
    #[must_use]
    pub fn new(
        learning_client: Arc<dyn LearningClient>,
        onramp_client: Arc<dyn OnRampClient>,
        wallet_client: Arc<dyn WalletClient>,
        audit_client: Arc<dyn AuditClient>,
        storage: Arc<SecureStorage>,
    ) -> Self {
        let audit = Arc::new(AuditService::new(audit_client));
        let onramp = OnRampService::new(onramp_client).with_audit(Arc::clone(&audit));

        Self {
            learning: Arc::new(LearningService::new(learning_client)),
            onramp: Arc::new(onramp),
            wallet: Arc::new(WalletService::new(wallet_client)),
            audit,
            storage,
        }
    }

    /// HTTP clients against the configured backend and file-backed storage
    /// under the configured directory
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let key = config.encryption_key_bytes()?;
        let storage = Arc::new(SecureStorage::new(
            Arc::new(EncryptedFileStore::new(
                config.storage_dir.join(SECURE_FILE),
                &key,
            )),
            Arc::new(JsonFileStore::new(config.storage_dir.join(PLAIN_FILE))),
        ));

        let transport = HttpTransport::from_config(config)?.with_storage(Arc::clone(&storage));
        info!(
            base_url = %transport.base_url(),
            storage_dir = %config.storage_dir.display(),
            "Application state configured"
        );

        Ok(Self::new(
            Arc::new(HttpLearningClient::new(transport.clone())),
            Arc::new(HttpOnRampClient::new(transport.clone())),
            Arc::new(HttpWalletClient::new(transport.clone())),
            Arc::new(HttpAuditClient::new(transport)),
            storage,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CancellationToken;
    use crate::test_utils::{
        MockAuditClient, MockLearningClient, MockOnRampClient, MockWalletClient, fixtures,
    };
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_new_wires_audit_into_onramp() {
        let audit_client = Arc::new(MockAuditClient::new());
        let state = AppState::new(
            Arc::new(MockLearningClient::new()),
            Arc::new(MockOnRampClient::new()),
            Arc::new(MockWalletClient::with_wallet(fixtures::wallet())),
            Arc::clone(&audit_client) as _,
            Arc::new(fixtures::memory_storage()),
        );

        let resp = state
            .onramp
            .cancel_transaction("tx-1", &CancellationToken::new())
            .await;

        assert!(resp.success);
        assert_eq!(audit_client.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_from_config_uses_storage_dir() {
        let dir = TempDir::new().unwrap();
        let vars: HashMap<&str, String> = HashMap::from([
            ("STORAGE_DIR", dir.path().display().to_string()),
            ("STORAGE_ENCRYPTION_KEY", fixtures::ENCRYPTION_KEY_B64.to_string()),
        ]);
        let config = AppConfig::from_lookup(|name| vars.get(name).cloned()).unwrap();

        let state = AppState::from_config(&config).unwrap();
        state.storage.set_secure_item("sessionToken", "tok").await.unwrap();

        assert!(dir.path().join(SECURE_FILE).exists());
        assert_eq!(
            state.storage.get_secure_item("sessionToken").await.as_deref(),
            Some("tok")
        );
    }
}
