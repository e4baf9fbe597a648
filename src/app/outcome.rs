//! Failure normalization shared by the domain services.
//!
//! Reads fail loudly with a fixed user-safe message. Mutations never fail:
//! they return a `ServiceResponse` carrying the cause.

use std::future::Future;

use tracing::{error, info, warn};

use super::cancel::CancellationToken;
use super::inflight::InFlightRegistry;
use crate::domain::{AppError, ServiceError, ServiceResponse};

/// Run a read-style client call under `cancel`.
///
/// The original cause is logged and replaced with `failure`.
pub(crate) async fn run_read<T, F>(
    cancel: &CancellationToken,
    failure: ServiceError,
    call: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    cancel.run(call).await.map_err(|e| {
        if e.is_cancelled() {
            warn!(operation = failure.operation, "Read cancelled by caller");
        } else {
            error!(operation = failure.operation, error = %e, "{}", failure.message);
        }
        read_failure(e, failure)
    })
}

/// Run a mutate-style client call under `cancel`, claiming `(operation, key)`
/// in `in_flight` for its whole duration.
pub(crate) async fn run_mutation<P, F>(
    in_flight: &InFlightRegistry,
    operation: &'static str,
    key: &str,
    fallback: &'static str,
    cancel: &CancellationToken,
    call: F,
) -> ServiceResponse<P>
where
    P: Default,
    F: Future<Output = Result<P, AppError>>,
{
    let _claim = match in_flight.acquire(operation, key) {
        Ok(claim) => claim,
        Err(e) => return mutate_failure(&e, fallback),
    };

    match cancel.run(call).await {
        Ok(payload) => {
            info!(operation = operation, key = %key, "Operation succeeded");
            ServiceResponse::ok(payload)
        }
        Err(e) if e.is_cancelled() => {
            warn!(operation = operation, key = %key, "Operation cancelled by caller");
            mutate_failure(&e, fallback)
        }
        Err(e) => {
            error!(operation = operation, key = %key, error = %e, "{}", fallback);
            mutate_failure(&e, fallback)
        }
    }
}

/// Replace a read failure with its fixed service error.
///
/// Cancellation is passed through unchanged.
pub(crate) fn read_failure(error: AppError, replacement: ServiceError) -> AppError {
    if error.is_cancelled() {
        AppError::Cancelled
    } else {
        AppError::Service(replacement)
    }
}

/// Failure envelope carrying the underlying cause, or `fallback` if it has none
pub(crate) fn mutate_failure<T: Default>(
    error: &AppError,
    fallback: &'static str,
) -> ServiceResponse<T> {
    ServiceResponse::failed(error.detail().unwrap_or_else(|| fallback.to_string()))
}
