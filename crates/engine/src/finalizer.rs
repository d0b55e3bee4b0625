// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job finalizer: reconciles records and quota once execution ends.

use crate::context::WorkflowContext;
use crate::error::EngineError;
use crate::initializer::failed_model_status;
use crate::quota::QuotaHelper;
use crate::router::{JobLocator, JobRouter};
use crate::Services;
use pw_adapters::{ExecutionService, ExecutionStatus, TelemetryChannels};
use pw_core::{Clock, JobKind, JobStatus, JobUpdate, ModelStatus, ModelUpdate};
use pw_store::ModelStore;

/// Converts a finished (or abandoned) execution into terminal job/model
/// statuses and moves the quota reservation to consumption.
#[derive(Clone)]
pub struct JobFinalizer {
    services: Services,
    router: JobRouter,
    quota: QuotaHelper,
}

impl JobFinalizer {
    pub fn new(services: Services) -> Self {
        let router = JobRouter::new(services.clone());
        let quota = QuotaHelper::new(services.clone());
        Self { services, router, quota }
    }

    /// Run finalization. As with initialization, failures are captured on
    /// the context and the persistence step always runs.
    pub async fn run(&self, mut ctx: WorkflowContext) -> WorkflowContext {
        if let Err(err) = self.finalize(&mut ctx).await {
            tracing::warn!(job = %ctx.job_name, error = %err, "job finalization failed");
            ctx.record_error(&err);
        }
        if let Err(err) = self.persist(&ctx).await {
            tracing::error!(job = %ctx.job_name, error = %err, "unable to persist job finalization outcome");
            ctx.record_error(&err);
        }
        ctx
    }

    async fn finalize(&self, ctx: &mut WorkflowContext) -> Result<(), EngineError> {
        if let Some(handle) = &ctx.channel {
            tracing::info!(job = %ctx.job_name, channel = %handle, "deleting telemetry channel");
            self.services.channels.delete_channel(handle).await?;
        }

        // Initialization failed before submit; there is nothing external
        // to reconcile.
        if ctx.execution.is_none() {
            return Ok(());
        }

        // Guard against an unterminated execution (only possible after an
        // unexpected monitoring error).
        let mut report = self.services.execution.describe(&ctx.job_name).await?;
        if !report.status.is_terminal() {
            tracing::info!(job = %ctx.job_name, status = %report.status, "execution in non-terminal state, terminating");
            self.services.execution.stop(&ctx.job_name).await?;
            report = self.services.execution.describe(&ctx.job_name).await?;
            if !report.status.is_terminal() {
                report.status = ExecutionStatus::Stopped;
            }
        }

        if let Some(execution) = ctx.execution.as_mut() {
            execution.status = Some(report.status);
            if matches!(report.status, ExecutionStatus::Completed | ExecutionStatus::Stopped) {
                execution.artifact_location = report.artifact_location.clone();
            }
        }

        // Reserved minutes come from the submit-time stopping condition;
        // consumed minutes are what the service actually billed.
        self.quota
            .finalize(&ctx.profile_id, report.reserved_minutes, report.consumed_minutes)
            .await?;
        Ok(())
    }

    async fn persist(&self, ctx: &WorkflowContext) -> Result<(), EngineError> {
        let locator = JobLocator::from(ctx);

        // Jobs can be canceled after dispatch; a canceled job keeps its
        // status.
        let current = self.router.get(&locator).await?;
        if current.status() == JobStatus::Canceled {
            tracing::info!(job = %ctx.job_name, "job was canceled, preserving canceled status");
            return Ok(());
        }

        let kind = ctx.job_name.kind().ok_or_else(|| {
            tracing::error!(job = %ctx.job_name, "job name has an unknown kind prefix");
            EngineError::Internal
        })?;

        let execution_status = ctx.execution.as_ref().and_then(|e| e.status);
        let failed = ctx.error.is_some() || execution_status == Some(ExecutionStatus::Failed);

        let (job_status, model_status) = if failed {
            (JobStatus::Failed, failed_model_status(kind))
        } else {
            (JobStatus::Completed, ModelStatus::Ready)
        };

        let artifact = (kind == JobKind::Training && !failed)
            .then(|| ctx.execution.as_ref().and_then(|e| e.artifact_location.clone()))
            .flatten();

        let job_update = JobUpdate {
            status: Some(job_status),
            ended_at_ms: Some(self.services.clock.epoch_ms()),
            ..JobUpdate::default()
        };

        tokio::try_join!(
            async {
                self.services
                    .models
                    .update(
                        &ctx.profile_id,
                        &ctx.model_id,
                        ModelUpdate { status: Some(model_status), artifact },
                    )
                    .await
                    .map_err(EngineError::from)
            },
            self.router.update(&locator, job_update),
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "finalizer_tests.rs"]
mod tests;
