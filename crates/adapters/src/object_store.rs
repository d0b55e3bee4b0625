// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared object store interface.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("object store error: {0}")]
    Backend(String),
}

/// Write/delete surface of the shared object store.
///
/// Used to persist job configuration descriptors and to clear stale
/// markers; reads happen outside this core.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn write(&self, location: &str, content: &str) -> Result<(), ObjectStoreError>;

    /// Delete everything under `location` (exact object or prefix).
    async fn delete(&self, location: &str) -> Result<(), ObjectStoreError>;
}
