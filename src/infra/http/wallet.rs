//! Wallet endpoints over HTTP.
//!
//! Balance lists naming a currency twice are treated as malformed responses.

use async_trait::async_trait;
use tracing::{error, instrument};

use super::transport::{HttpTransport, path, validated, validated_all};
use crate::domain::{
    AppError, TransportError, Wallet, WalletBalance, WalletClient, ensure_unique_currencies,
};

#[derive(Debug, Clone)]
pub struct HttpWalletClient {
    transport: HttpTransport,
}

impl HttpWalletClient {
    #[must_use]
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

fn unique_balances(balances: &[WalletBalance]) -> Result<(), AppError> {
    ensure_unique_currencies(balances).map_err(|e| {
        error!(error = %e, "Backend returned duplicate balances");
        AppError::Transport(TransportError::Decode(e.to_string()))
    })
}

#[async_trait]
impl WalletClient for HttpWalletClient {
    #[instrument(skip(self))]
    async fn get_wallet(&self) -> Result<Wallet, AppError> {
        let wallet: Wallet = validated(self.transport.get("/wallets/me").await?)?;
        unique_balances(&wallet.balances)?;
        Ok(wallet)
    }

    #[instrument(skip(self))]
    async fn get_balances(&self, wallet_id: &str) -> Result<Vec<WalletBalance>, AppError> {
        let balances = validated_all(
            self.transport
                .get(&path(&["wallets", wallet_id, "balances"])?)
                .await?,
        )?;
        unique_balances(&balances)?;
        Ok(balances)
    }

    #[instrument(skip(self))]
    async fn refresh_balances(&self, wallet_id: &str) -> Result<Vec<WalletBalance>, AppError> {
        let balances = validated_all(
            self.transport
                .post_empty(&path(&["wallets", wallet_id, "balances", "refresh"])?)
                .await?,
        )?;
        unique_balances(&balances)?;
        Ok(balances)
    }
}
