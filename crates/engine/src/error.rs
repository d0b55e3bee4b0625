// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error taxonomy.

use pw_store::StoreError;
use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// `Validation`, `QuotaExceeded` and `StateConflict` are rejected
/// synchronously and never retried. `Internal` covers violated invariants;
/// details are logged at error severity and the message stays generic.
/// `CancelTimeout` is deliberately user-surfaced: once the poll budget is
/// exhausted, automatic retry cannot help.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("operation not allowed: {0}")]
    StateConflict(String),
    #[error("internal service error")]
    Internal,
    #[error("failed to cancel job, contact an administrator")]
    CancelTimeout,
    #[error("external service failure: {0}")]
    External(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Store(StoreError::NotFound(_)))
    }
}

impl From<pw_adapters::ExecutionError> for EngineError {
    fn from(err: pw_adapters::ExecutionError) -> Self {
        EngineError::External(err.to_string())
    }
}

impl From<pw_adapters::ObjectStoreError> for EngineError {
    fn from(err: pw_adapters::ObjectStoreError) -> Self {
        EngineError::External(err.to_string())
    }
}

impl From<pw_adapters::TelemetryError> for EngineError {
    fn from(err: pw_adapters::TelemetryError) -> Self {
        EngineError::External(err.to_string())
    }
}

impl From<pw_adapters::QueueError> for EngineError {
    fn from(err: pw_adapters::QueueError) -> Self {
        EngineError::External(err.to_string())
    }
}

impl From<pw_adapters::ValidationFailure> for EngineError {
    fn from(err: pw_adapters::ValidationFailure) -> Self {
        EngineError::Validation(err.to_string())
    }
}
