//! Registry of mutate operations currently awaiting the backend.
//!
//! A second call with the same `(operation, key)` while the first one is
//! outstanding is rejected instead of being sent.

use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use crate::domain::AppError;

type InFlightKey = (&'static str, String);

#[derive(Debug, Default)]
pub struct InFlightRegistry {
    active: DashMap<InFlightKey, Instant>,
}

impl InFlightRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `(operation, key)`. The claim is released when the guard drops.
    pub fn acquire(&self, operation: &'static str, key: &str) -> Result<InFlightGuard<'_>, AppError> {
        let entry_key = (operation, key.to_string());
        match self.active.entry(entry_key.clone()) {
            Entry::Occupied(existing) => {
                warn!(
                    operation = operation,
                    key = %key,
                    elapsed_ms = existing.get().elapsed().as_millis() as u64,
                    "Rejected duplicate in-flight request"
                );
                Err(AppError::InFlight {
                    operation: operation.to_string(),
                    key: key.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                debug!(operation = operation, key = %key, "In-flight request registered");
                Ok(InFlightGuard {
                    registry: self,
                    key: entry_key,
                })
            }
        }
    }

    #[must_use]
    pub fn is_active(&self, operation: &'static str, key: &str) -> bool {
        self.active.contains_key(&(operation, key.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Holds an in-flight claim
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    registry: &'a InFlightRegistry,
    key: InFlightKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.active.remove(&self.key);
    }
}
