//! Shared response shapes.

use serde::{Deserialize, Serialize};

/// Wire wrapper used by every backend response body: `{ "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn into_inner(self) -> T {
        self.data
    }
}

/// Result envelope returned by mutate-style service operations.
///
/// Callers branch on `success` instead of handling an error. The payload
/// fields are flattened next to `success`, so a progress payload serializes
/// as `{ "success": true, "progress": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Default> ServiceResponse<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    /// Failure envelope with the payload at its safe default
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: T::default(),
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Reject NaN and infinities, which `range` rules let through
pub fn finite_number<T: std::borrow::Borrow<f64>>(value: T) -> Result<(), validator::ValidationError> {
    let value = *value.borrow();
    if value.is_finite() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("not_finite")
            .with_message("Value must be a finite number".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Flag {
        is_favorite: bool,
    }

    #[test]
    fn test_failed_envelope_uses_safe_default() {
        let resp: ServiceResponse<Flag> = ServiceResponse::failed("boom");
        assert!(!resp.success);
        assert!(!resp.data.is_favorite);
        assert_eq!(resp.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_envelope_flattens_payload() {
        let resp = ServiceResponse::ok(Flag { is_favorite: true });
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value, json!({ "success": true, "isFavorite": true }));
    }

    #[test]
    fn test_api_envelope_unwraps_data() {
        let body: ApiEnvelope<Vec<u32>> = serde_json::from_value(json!({ "data": [1, 2] })).unwrap();
        assert_eq!(body.into_inner(), vec![1, 2]);
    }

    #[test]
    fn test_finite_number_rejects_nan_and_infinity() {
        assert!(finite_number(&42.5).is_ok());
        assert!(finite_number(&0.0).is_ok());
        assert!(finite_number(&f64::NAN).is_err());
        assert!(finite_number(&f64::INFINITY).is_err());
        assert!(finite_number(&f64::NEG_INFINITY).is_err());
    }
}
