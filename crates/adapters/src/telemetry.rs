// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry channel provisioner interface.

use async_trait::async_trait;
use pw_core::JobName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("channel not found: {0}")]
    NotFound(String),
    #[error("telemetry service error: {0}")]
    Service(String),
}

/// Provisions the per-job video/telemetry channel.
///
/// Channels are named after the job so the executor can publish without
/// further coordination.
#[async_trait]
pub trait TelemetryChannels: Send + Sync {
    /// Create a channel for the job, returning its handle.
    async fn create_channel(&self, name: &JobName) -> Result<String, TelemetryError>;

    /// Tear down a channel by handle. Deleting an already-removed channel
    /// is not an error.
    async fn delete_channel(&self, handle: &str) -> Result<(), TelemetryError>;
}
