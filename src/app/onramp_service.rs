//! On-ramp service: quotes, purchases and purchase history.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use tracing::{info, instrument, warn};
use validator::Validate;

use super::audit_service::AuditService;
use super::cancel::CancellationToken;
use super::inflight::InFlightRegistry;
use super::outcome::{run_mutation, run_read};
use crate::domain::{
    AppError, AuditLog, OnRampClient, OnRampEstimate, OnRampEstimateRequest, OnRampRequest,
    OnRampTransaction, ServiceError, ServiceResponse, Severity, SupportedCurrencies,
    TransactionPayload, ValidationError,
};

const CURRENCIES_FAILED: ServiceError = ServiceError::new(
    "get_supported_currencies",
    "Failed to fetch supported currencies",
);
const ESTIMATE_FAILED: ServiceError = ServiceError::new("get_estimate", "Failed to get estimate");
const TRANSACTION_FAILED: ServiceError =
    ServiceError::new("get_transaction", "Failed to fetch transaction");
const HISTORY_FAILED: ServiceError = ServiceError::new(
    "get_transaction_history",
    "Failed to fetch transaction history",
);

const INITIATE_FAILED: &str = "Failed to initiate purchase";
const CANCEL_FAILED: &str = "Failed to cancel transaction";

pub struct OnRampService {
    client: Arc<dyn OnRampClient>,
    audit: Option<Arc<AuditService>>,
    in_flight: InFlightRegistry,
}

impl OnRampService {
    #[must_use]
    pub fn new(client: Arc<dyn OnRampClient>) -> Self {
        Self {
            client,
            audit: None,
            in_flight: InFlightRegistry::new(),
        }
    }

    /// Record purchase mutations through `audit` (builder pattern)
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<AuditService>) -> Self {
        self.audit = Some(audit);
        self
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_supported_currencies(
        &self,
        cancel: &CancellationToken,
    ) -> Result<SupportedCurrencies, AppError> {
        info!("Fetching supported currencies");
        run_read(cancel, CURRENCIES_FAILED, self.client.supported_currencies()).await
    }

    /// Quote a conversion. Invalid requests are not sent.
    #[instrument(skip(self, cancel))]
    pub async fn get_estimate(
        &self,
        request: &OnRampEstimateRequest,
        cancel: &CancellationToken,
    ) -> Result<OnRampEstimate, AppError> {
        info!("Fetching on-ramp estimate");
        run_read(cancel, ESTIMATE_FAILED, async {
            request.validate()?;
            self.client.get_estimate(request).await
        })
        .await
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_transaction(
        &self,
        transaction_id: &str,
        cancel: &CancellationToken,
    ) -> Result<OnRampTransaction, AppError> {
        info!("Fetching on-ramp transaction");
        run_read(cancel, TRANSACTION_FAILED, self.client.get_transaction(transaction_id)).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_transaction_history(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<OnRampTransaction>, AppError> {
        info!("Fetching on-ramp history");
        run_read(cancel, HISTORY_FAILED, self.client.list_transactions()).await
    }

    /// Start a purchase: validate, take a fresh quote, then initiate.
    ///
    /// Only one purchase per destination wallet may be in flight. A purchase
    /// the backend accepted is reported even if `cancel` fires afterwards.
    /// Cancelling while the initiate request is pending cannot tell whether
    /// the backend committed; that case is audited as
    /// `onramp.initiate_cancelled`.
    #[instrument(skip(self, request, cancel), fields(
        fiat = %request.estimate.fiat_currency,
        crypto = %request.estimate.crypto_currency,
        wallet = %request.wallet_address,
    ))]
    pub async fn initiate_purchase(
        &self,
        request: &OnRampRequest,
        cancel: &CancellationToken,
    ) -> ServiceResponse<TransactionPayload> {
        info!("Initiating on-ramp purchase");
        let committed = OnceLock::new();
        let response = run_mutation(
            &self.in_flight,
            "initiate_purchase",
            &request.wallet_address,
            INITIATE_FAILED,
            cancel,
            async {
                request.validate()?;
                let estimate = self.client.get_estimate(&request.estimate).await?;
                if estimate.is_expired_at(Utc::now()) {
                    return Err(AppError::Validation(ValidationError::InvalidField {
                        field: "estimate".to_string(),
                        message: "Quote expired before purchase could start".to_string(),
                    }));
                }
                info!(
                    crypto_amount = estimate.crypto_amount,
                    total_fiat = estimate.total_fiat,
                    "Quote accepted"
                );
                cancel.check()?;
                let transaction = self.client.initiate_transaction(request).await?;
                let _ = committed.set(transaction.clone());
                Ok(TransactionPayload {
                    transaction: Some(transaction),
                })
            },
        )
        .await;
        let response = keep_committed(response, committed);

        let log = match (&response.data.transaction, &response.error) {
            (Some(tx), _) => AuditLog::new("onramp.initiate", Severity::Info)
                .with_transaction(tx.id.clone())
                .with_metadata("fiatAmount", request.estimate.fiat_amount)
                .with_metadata("fiatCurrency", request.estimate.fiat_currency.clone()),
            (None, _) if cancel.is_cancelled() => {
                AuditLog::new("onramp.initiate_cancelled", Severity::Warning)
                    .with_metadata("fiatCurrency", request.estimate.fiat_currency.clone())
            }
            (None, error) => AuditLog::new("onramp.initiate_failed", Severity::Warning)
                .with_metadata("fiatCurrency", request.estimate.fiat_currency.clone())
                .with_metadata("error", error.clone().unwrap_or_default()),
        };
        self.audit(log).await;
        response
    }

    /// Ask the backend to cancel an unsettled purchase.
    ///
    /// A cancellation the backend accepted is reported even if `cancel`
    /// fires afterwards.
    #[instrument(skip(self, cancel))]
    pub async fn cancel_transaction(
        &self,
        transaction_id: &str,
        cancel: &CancellationToken,
    ) -> ServiceResponse<TransactionPayload> {
        info!("Cancelling on-ramp transaction");
        let committed = OnceLock::new();
        let response = run_mutation(
            &self.in_flight,
            "cancel_transaction",
            transaction_id,
            CANCEL_FAILED,
            cancel,
            async {
                let transaction = self.client.cancel_transaction(transaction_id).await?;
                let _ = committed.set(transaction.clone());
                Ok::<_, AppError>(TransactionPayload {
                    transaction: Some(transaction),
                })
            },
        )
        .await;
        let response = keep_committed(response, committed);

        if response.success {
            let log = AuditLog::new("onramp.cancel", Severity::Info).with_transaction(transaction_id);
            self.audit(log).await;
        }
        response
    }

    /// Audit failures are logged and never affect the purchase outcome.
    ///
    /// Entries describe work that already happened, so the caller's token
    /// does not apply to them.
    async fn audit(&self, log: AuditLog) {
        let Some(audit) = &self.audit else {
            return;
        };
        let result = audit.record(&log, &CancellationToken::new()).await;
        if !result.success {
            warn!(
                action = %log.action(),
                error = ?result.error,
                "Audit log not recorded"
            );
        }
    }
}

/// Replace a cancellation envelope with the transaction the backend returned
fn keep_committed(
    response: ServiceResponse<TransactionPayload>,
    committed: OnceLock<OnRampTransaction>,
) -> ServiceResponse<TransactionPayload> {
    match committed.into_inner() {
        Some(transaction) if !response.success => {
            warn!(
                transaction_id = %transaction.id,
                "Cancelled after the backend committed; reporting the transaction"
            );
            ServiceResponse::ok(TransactionPayload {
                transaction: Some(transaction),
            })
        }
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OnRampStatus;
    use crate::test_utils::{MockAuditClient, MockOnRampClient};

    fn request() -> OnRampRequest {
        OnRampRequest::new(OnRampEstimateRequest::new("USD", "USDC", 50.0), "wallet-addr")
    }

    #[tokio::test]
    async fn test_initiate_fetches_quote_then_initiates() {
        let client = Arc::new(MockOnRampClient::new());
        let svc = OnRampService::new(Arc::clone(&client) as _);

        let resp = svc.initiate_purchase(&request(), &CancellationToken::new()).await;

        assert!(resp.success, "{:?}", resp.error);
        assert_eq!(client.calls(), vec!["get_estimate", "initiate_transaction"]);
        assert_eq!(resp.data.transaction.unwrap().wallet_address, "wallet-addr");
    }

    #[tokio::test]
    async fn test_invalid_request_not_sent() {
        let client = Arc::new(MockOnRampClient::new());
        let svc = OnRampService::new(Arc::clone(&client) as _);
        let bad = OnRampRequest::new(OnRampEstimateRequest::new("USD", "USDC", 0.0), "wallet-addr");

        let resp = svc.initiate_purchase(&bad, &CancellationToken::new()).await;

        assert!(!resp.success);
        assert!(resp.data.transaction.is_none());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_expired_quote_aborts_purchase() {
        let client = Arc::new(MockOnRampClient::new().with_expired_quotes());
        let svc = OnRampService::new(Arc::clone(&client) as _);

        let resp = svc.initiate_purchase(&request(), &CancellationToken::new()).await;

        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("Quote expired"));
        assert_eq!(client.calls(), vec!["get_estimate"]);
    }

    #[tokio::test]
    async fn test_purchase_is_audited() {
        let audit_client = Arc::new(MockAuditClient::new());
        let audit = Arc::new(AuditService::new(Arc::clone(&audit_client) as _));
        let svc = OnRampService::new(Arc::new(MockOnRampClient::new())).with_audit(audit);

        let resp = svc.initiate_purchase(&request(), &CancellationToken::new()).await;
        assert!(resp.success);

        let recorded = audit_client.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].action(), "onramp.initiate");
        assert!(recorded[0].transaction_id().is_some());
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_change_outcome() {
        let audit = Arc::new(AuditService::new(Arc::new(MockAuditClient::failing("down"))));
        let svc = OnRampService::new(Arc::new(MockOnRampClient::new())).with_audit(audit);

        let resp = svc.cancel_transaction("tx-1", &CancellationToken::new()).await;
        assert!(resp.success);
    }

    #[tokio::test]
    async fn test_non_finite_amount_not_sent() {
        let client = Arc::new(MockOnRampClient::new());
        let svc = OnRampService::new(Arc::clone(&client) as _);

        for amount in [f64::NAN, f64::INFINITY] {
            let bad = OnRampRequest::new(OnRampEstimateRequest::new("USD", "USDC", amount), "wallet-addr");
            let resp = svc.initiate_purchase(&bad, &CancellationToken::new()).await;
            assert!(!resp.success);
            assert!(resp.error.unwrap().contains("finite"));
        }
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_purchase_committed_before_cancel_is_reported() {
        let cancel = CancellationToken::new();
        let client = Arc::new(MockOnRampClient::new().cancelling_after_commit(cancel.clone()));
        let audit_client = Arc::new(MockAuditClient::new());
        let audit = Arc::new(AuditService::new(Arc::clone(&audit_client) as _));
        let svc = OnRampService::new(Arc::clone(&client) as _).with_audit(audit);

        let resp = svc.initiate_purchase(&request(), &cancel).await;

        assert!(cancel.is_cancelled());
        assert!(resp.success, "{:?}", resp.error);
        assert_eq!(resp.data.transaction.unwrap().id, "tx-1");
        let recorded = audit_client.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].action(), "onramp.initiate");
        assert_eq!(recorded[0].transaction_id(), Some("tx-1"));
    }

    #[tokio::test]
    async fn test_cancelled_purchase_is_still_audited() {
        let audit_client = Arc::new(MockAuditClient::new());
        let audit = Arc::new(AuditService::new(Arc::clone(&audit_client) as _));
        let client = Arc::new(MockOnRampClient::new());
        let svc = OnRampService::new(Arc::clone(&client) as _).with_audit(audit);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let resp = svc.initiate_purchase(&request(), &cancel).await;

        assert!(!resp.success);
        assert!(client.calls().is_empty());
        let recorded = audit_client.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].action(), "onramp.initiate_cancelled");
    }

    #[tokio::test]
    async fn test_cancel_committed_before_cancel_is_reported() {
        let cancel = CancellationToken::new();
        let client = Arc::new(MockOnRampClient::new().cancelling_after_commit(cancel.clone()));
        let svc = OnRampService::new(Arc::clone(&client) as _);

        let resp = svc.cancel_transaction("tx-9", &cancel).await;

        assert!(resp.success, "{:?}", resp.error);
        assert_eq!(resp.data.transaction.unwrap().status, OnRampStatus::Cancelled);
    }
}
