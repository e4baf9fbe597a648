//! Audit log sink over HTTP.

use async_trait::async_trait;
use tracing::instrument;

use super::transport::HttpTransport;
use crate::domain::{AppError, AuditClient, AuditLog};

#[derive(Debug, Clone)]
pub struct HttpAuditClient {
    transport: HttpTransport,
}

impl HttpAuditClient {
    #[must_use]
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl AuditClient for HttpAuditClient {
    #[instrument(skip(self, log), fields(action = %log.action()))]
    async fn record(&self, log: &AuditLog) -> Result<(), AppError> {
        self.transport.post_discard("/audit-logs", log).await
    }
}
