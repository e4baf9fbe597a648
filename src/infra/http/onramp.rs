//! On-ramp endpoints over HTTP.

use async_trait::async_trait;
use tracing::instrument;

use super::transport::{HttpTransport, path, validated, validated_all};
use crate::domain::{
    AppError, OnRampClient, OnRampEstimate, OnRampEstimateRequest, OnRampRequest,
    OnRampTransaction, SupportedCurrencies,
};

#[derive(Debug, Clone)]
pub struct HttpOnRampClient {
    transport: HttpTransport,
}

impl HttpOnRampClient {
    #[must_use]
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl OnRampClient for HttpOnRampClient {
    #[instrument(skip(self))]
    async fn supported_currencies(&self) -> Result<SupportedCurrencies, AppError> {
        self.transport.get("/onramp/currencies").await
    }

    #[instrument(skip(self))]
    async fn get_estimate(
        &self,
        request: &OnRampEstimateRequest,
    ) -> Result<OnRampEstimate, AppError> {
        let estimate = self.transport.post("/onramp/estimate", request).await?;
        validated(estimate)
    }

    #[instrument(skip(self, request), fields(wallet = %request.wallet_address))]
    async fn initiate_transaction(
        &self,
        request: &OnRampRequest,
    ) -> Result<OnRampTransaction, AppError> {
        let transaction = self.transport.post("/onramp/transactions", request).await?;
        validated(transaction)
    }

    #[instrument(skip(self))]
    async fn get_transaction(&self, transaction_id: &str) -> Result<OnRampTransaction, AppError> {
        let transaction = self
            .transport
            .get(&path(&["onramp", "transactions", transaction_id])?)
            .await?;
        validated(transaction)
    }

    #[instrument(skip(self))]
    async fn list_transactions(&self) -> Result<Vec<OnRampTransaction>, AppError> {
        let transactions = self.transport.get("/onramp/transactions").await?;
        validated_all(transactions)
    }

    #[instrument(skip(self))]
    async fn cancel_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<OnRampTransaction, AppError> {
        let transaction = self
            .transport
            .post_empty(&path(&["onramp", "transactions", transaction_id, "cancel"])?)
            .await?;
        validated(transaction)
    }
}
