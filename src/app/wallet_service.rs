//! Wallet service. Balances always come from the backend; nothing here
//! computes them.

use std::sync::Arc;

use tracing::{info, instrument};

use super::cancel::CancellationToken;
use super::inflight::InFlightRegistry;
use super::outcome::{run_mutation, run_read};
use crate::domain::{
    AppError, BalancesPayload, ServiceError, ServiceResponse, Wallet, WalletBalance,
    WalletClient, ensure_unique_currencies,
};

const WALLET_FAILED: ServiceError = ServiceError::new("get_wallet", "Failed to fetch wallet");
const BALANCES_FAILED: ServiceError =
    ServiceError::new("get_balances", "Failed to fetch wallet balances");
const BALANCE_FAILED: ServiceError =
    ServiceError::new("get_balance", "Failed to fetch wallet balance");

const REFRESH_FAILED: &str = "Failed to refresh balances";

pub struct WalletService {
    client: Arc<dyn WalletClient>,
    in_flight: InFlightRegistry,
}

impl WalletService {
    #[must_use]
    pub fn new(client: Arc<dyn WalletClient>) -> Self {
        Self {
            client,
            in_flight: InFlightRegistry::new(),
        }
    }

    /// The current user's wallet. Wallets listing a currency twice are
    /// rejected.
    #[instrument(skip(self, cancel))]
    pub async fn get_wallet(&self, cancel: &CancellationToken) -> Result<Wallet, AppError> {
        info!("Fetching wallet");
        run_read(cancel, WALLET_FAILED, async {
            let wallet = self.client.get_wallet().await?;
            wallet.validate_balances()?;
            Ok::<_, AppError>(wallet)
        })
        .await
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_balances(
        &self,
        wallet_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<WalletBalance>, AppError> {
        info!("Fetching wallet balances");
        run_read(cancel, BALANCES_FAILED, async {
            let balances = self.client.get_balances(wallet_id).await?;
            ensure_unique_currencies(&balances)?;
            Ok::<_, AppError>(balances)
        })
        .await
    }

    /// Balance of one currency; a zero balance if the wallet never held it
    #[instrument(skip(self, cancel))]
    pub async fn get_balance(
        &self,
        wallet_id: &str,
        currency: &str,
        cancel: &CancellationToken,
    ) -> Result<WalletBalance, AppError> {
        info!("Fetching wallet balance");
        let balances = run_read(cancel, BALANCE_FAILED, async {
            let balances = self.client.get_balances(wallet_id).await?;
            ensure_unique_currencies(&balances)?;
            Ok::<_, AppError>(balances)
        })
        .await?;
        Ok(balances
            .into_iter()
            .find(|b| b.currency.eq_ignore_ascii_case(currency))
            .unwrap_or_else(|| WalletBalance::zero(currency.to_ascii_uppercase())))
    }

    /// Resync balances with the custody provider
    #[instrument(skip(self, cancel))]
    pub async fn refresh_balances(
        &self,
        wallet_id: &str,
        cancel: &CancellationToken,
    ) -> ServiceResponse<BalancesPayload> {
        info!("Refreshing wallet balances");
        run_mutation(
            &self.in_flight,
            "refresh_balances",
            wallet_id,
            REFRESH_FAILED,
            cancel,
            async {
                let balances = self.client.refresh_balances(wallet_id).await?;
                ensure_unique_currencies(&balances)?;
                Ok::<_, AppError>(BalancesPayload { balances })
            },
        )
        .await
    }
}
