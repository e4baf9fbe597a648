//! Append-only audit log entries sent to the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

/// An immutable audit record. Built once, then only sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    #[validate(length(min = 1, max = 128, message = "Action must be 1-128 characters"))]
    action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
    severity: Severity,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
    timestamp: DateTime<Utc>,
}

impl AuditLog {
    #[must_use]
    pub fn new(action: impl Into<String>, severity: Severity) -> Self {
        Self {
            action: action.into(),
            user_id: None,
            transaction_id: None,
            severity,
            metadata: serde_json::Map::new(),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_transaction(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Envelope payload for audit submissions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditPayload {
    pub recorded: bool,
}
