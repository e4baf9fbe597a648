//! Audit log submission.

use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use super::cancel::CancellationToken;
use super::inflight::InFlightRegistry;
use super::outcome::run_mutation;
use crate::domain::{AppError, AuditClient, AuditLog, AuditPayload, ServiceResponse};

const RECORD_FAILED: &str = "Failed to record audit log";

pub struct AuditService {
    client: Arc<dyn AuditClient>,
    in_flight: InFlightRegistry,
}

impl AuditService {
    #[must_use]
    pub fn new(client: Arc<dyn AuditClient>) -> Self {
        Self {
            client,
            in_flight: InFlightRegistry::new(),
        }
    }

    /// Send one audit entry. Identical entries submitted concurrently are
    /// sent once.
    #[instrument(skip(self, log, cancel), fields(action = %log.action(), severity = ?log.severity()))]
    pub async fn record(
        &self,
        log: &AuditLog,
        cancel: &CancellationToken,
    ) -> ServiceResponse<AuditPayload> {
        info!("Recording audit log");
        // Only a byte-identical entry counts as a duplicate
        let key = serde_json::to_string(log).unwrap_or_else(|_| {
            format!(
                "{}@{}:{}:{}",
                log.action(),
                log.timestamp().timestamp_micros(),
                log.user_id().unwrap_or_default(),
                log.transaction_id().unwrap_or_default()
            )
        });
        run_mutation(&self.in_flight, "record_audit_log", &key, RECORD_FAILED, cancel, async {
            log.validate()?;
            self.client.record(log).await?;
            Ok::<_, AppError>(AuditPayload { recorded: true })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;
    use crate::test_utils::{MockAuditClient, MockConfig};
    use std::time::Duration;

    #[tokio::test]
    async fn test_record_success() {
        let client = Arc::new(MockAuditClient::new());
        let svc = AuditService::new(Arc::clone(&client) as _);

        let resp = svc
            .record(
                &AuditLog::new("session.login", Severity::Info).with_user("u1"),
                &CancellationToken::new(),
            )
            .await;

        assert!(resp.success);
        assert!(resp.data.recorded);
        assert_eq!(client.recorded().len(), 1);
        assert_eq!(client.recorded()[0].user_id(), Some("u1"));
    }

    #[tokio::test]
    async fn test_record_failure_is_enveloped() {
        let svc = AuditService::new(Arc::new(MockAuditClient::failing("sink offline")));
        let resp = svc
            .record(&AuditLog::new("session.login", Severity::Info), &CancellationToken::new())
            .await;
        assert!(!resp.success);
        assert!(!resp.data.recorded);
        assert_eq!(resp.error.as_deref(), Some("sink offline"));
    }

    #[tokio::test]
    async fn test_same_action_same_instant_different_entries_both_sent() {
        let client = Arc::new(MockAuditClient::with_config(
            MockConfig::success().with_delay(Duration::from_millis(50)),
        ));
        let svc = AuditService::new(Arc::clone(&client) as _);
        let first = AuditLog::new("onramp.cancel", Severity::Info).with_transaction("tx-1");
        let second = first.clone().with_transaction("tx-2");
        assert_eq!(first.timestamp(), second.timestamp());
        let cancel = CancellationToken::new();

        let (a, b) = tokio::join!(svc.record(&first, &cancel), svc.record(&second, &cancel));

        assert!(a.success, "{:?}", a.error);
        assert!(b.success, "{:?}", b.error);
        assert_eq!(client.recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_identical_concurrent_entries_sent_once() {
        let client = Arc::new(MockAuditClient::with_config(
            MockConfig::success().with_delay(Duration::from_millis(50)),
        ));
        let svc = AuditService::new(Arc::clone(&client) as _);
        let log = AuditLog::new("onramp.cancel", Severity::Info).with_transaction("tx-1");
        let cancel = CancellationToken::new();

        let (a, b) = tokio::join!(svc.record(&log, &cancel), svc.record(&log, &cancel));

        assert!(a.success ^ b.success);
        assert_eq!(client.recorded().len(), 1);
    }
}
