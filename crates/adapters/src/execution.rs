// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External execution service interface.
//!
//! The executor has no cancel-before-start primitive: a submitted job that
//! has not started can only be stopped by polling [`ExecutionService::describe`]
//! until it reaches a stoppable state (see the engine's stop coordinator).

use async_trait::async_trait;
use pw_core::JobName;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from the execution service.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The job is not visible to the service (yet).
    #[error("execution not found: {0}")]
    NotFound(String),
    #[error("execution service error: {0}")]
    Service(String),
}

/// Status of an external execution as observed via `describe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Submitted but not yet running.
    Pending,
    InProgress,
    Stopping,
    Completed,
    Failed,
    Stopped,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Stopped
        )
    }
}

pw_core::simple_display! {
    ExecutionStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Stopping => "stopping",
        Completed => "completed",
        Failed => "failed",
        Stopped => "stopped",
    }
}

/// Everything the external executor needs to run a job.
///
/// The job name doubles as the service-side idempotency key.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub job_name: JobName,
    /// Wall-clock budget enforced by the service.
    pub max_runtime_minutes: u32,
    /// Environment handed to the executing container.
    pub environment: BTreeMap<String, String>,
    /// Object-store prefix the service writes artifacts under.
    pub output_location: String,
}

/// Snapshot returned by `describe`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub status: ExecutionStatus,
    /// Minutes reserved via the stopping condition at submit time.
    pub reserved_minutes: u32,
    /// Minutes actually consumed so far (or in total, once terminal).
    pub consumed_minutes: u32,
    /// Trained artifact location, present once a run completes.
    pub artifact_location: Option<String>,
}

#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Submit a job, returning the service's execution handle.
    async fn submit(&self, request: ExecutionRequest) -> Result<String, ExecutionError>;

    async fn describe(&self, job_name: &JobName) -> Result<ExecutionReport, ExecutionError>;

    /// Request a stop. Only valid for an in-progress execution.
    async fn stop(&self, job_name: &JobName) -> Result<(), ExecutionError>;
}
