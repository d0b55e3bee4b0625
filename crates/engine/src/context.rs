// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow context threaded through the initialize/finalize pipeline.

use pw_adapters::{DispatchMessage, ExecutionStatus};
use pw_core::{JobName, LeaderboardId, ModelId, ProfileId};

/// State of the external execution as known to this invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionState {
    pub handle: String,
    pub status: Option<ExecutionStatus>,
    pub artifact_location: Option<String>,
}

/// Mutable context for one initialize or finalize invocation.
///
/// Failures in pipeline steps are captured onto `error` rather than thrown
/// past the handler, so the persistence step always runs and job/model
/// status never sticks mid-transition.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowContext {
    pub job_name: JobName,
    pub model_id: ModelId,
    pub profile_id: ProfileId,
    pub leaderboard_id: Option<LeaderboardId>,
    /// Telemetry channel handle, once provisioned.
    pub channel: Option<String>,
    pub execution: Option<ExecutionState>,
    pub error: Option<String>,
}

impl WorkflowContext {
    pub fn record_error(&mut self, error: impl std::fmt::Display) {
        self.error = Some(error.to_string());
    }
}

impl From<DispatchMessage> for WorkflowContext {
    fn from(message: DispatchMessage) -> Self {
        Self {
            job_name: message.job_name,
            model_id: message.model_id,
            profile_id: message.profile_id,
            leaderboard_id: message.leaderboard_id,
            channel: None,
            execution: None,
            error: None,
        }
    }
}
