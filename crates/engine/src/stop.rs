// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop/cancel coordinator.
//!
//! Finds the unique stoppable job for a model's current status and runs
//! the status-dependent stop protocol. The external executor has no
//! cancel-before-start primitive, so a queued job is canceled by polling
//! until it becomes stoppable (see [`StopCoordinator::cancel_queued`]).

use crate::error::EngineError;
use crate::initializer::failed_model_status;
use crate::router::{JobLocator, JobRouter};
use crate::Services;
use pw_adapters::{ExecutionService, ExecutionStatus};
use pw_core::{
    JobName, JobRecord, JobStatus, JobUpdate, ModelId, ModelStatus, ModelUpdate, ProfileId,
};
use pw_store::{EvaluationStore, ModelStore, SubmissionStore, TrainingStore};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StopConfig {
    /// Time between execution-status polls while canceling a queued job.
    pub poll_interval: Duration,
    /// Total wall-clock budget for the cancel-while-queued poll.
    pub poll_budget: Duration,
}

impl Default for StopConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(2), poll_budget: Duration::from_secs(60) }
    }
}

/// Executes stop requests against a model's active job.
///
/// A stop racing the finalize path on the same job is possible and
/// accepted: neither side locks the records.
#[derive(Clone)]
pub struct StopCoordinator {
    services: Services,
    router: JobRouter,
    config: StopConfig,
}

impl StopCoordinator {
    pub fn new(services: Services) -> Self {
        Self::with_config(services, StopConfig::default())
    }

    pub fn with_config(services: Services, config: StopConfig) -> Self {
        let router = JobRouter::new(services.clone());
        Self { services, router, config }
    }

    pub async fn stop_model(
        &self,
        profile_id: &ProfileId,
        model_id: &ModelId,
    ) -> Result<(), EngineError> {
        let model = self.services.models.load(profile_id, model_id).await?;

        let candidate = self.find_stoppable(&model.status, model_id, profile_id).await?;
        let Some(job) = candidate else {
            tracing::error!(
                model = %model_id,
                status = %model.status,
                "no stoppable job for model in stoppable status"
            );
            return Err(EngineError::Internal);
        };

        let (job_status, model_status) = match job.status() {
            // The external system may not have a cancelable handle yet;
            // forcing it risks a "completed" job with no valid output.
            JobStatus::Initializing => {
                return Err(EngineError::StateConflict(
                    "model cannot be stopped during job initialization".to_string(),
                ));
            }
            // Terminal statuses are set later by the finalize path.
            JobStatus::InProgress => {
                self.stop_running(job.name()).await?;
                (JobStatus::Stopping, ModelStatus::Stopping)
            }
            // A queued job never reaches the finalize path, so final
            // statuses are set here.
            JobStatus::Queued => {
                self.cancel_queued(job.name()).await?;
                (JobStatus::Canceled, failed_model_status(job.kind()))
            }
            other => {
                tracing::error!(job = %job.name(), status = %other, "invalid status for stoppable job");
                return Err(EngineError::Internal);
            }
        };

        let locator = JobLocator::for_record(&job);
        tokio::try_join!(
            async {
                self.services
                    .models
                    .update(profile_id, model_id, ModelUpdate::status(model_status))
                    .await
                    .map_err(EngineError::from)
            },
            self.router.update(&locator, JobUpdate::status(job_status)),
        )?;
        Ok(())
    }

    /// The stoppable job for the model's current status. For a queued
    /// model all three kinds are probed concurrently; at most one is
    /// expected to exist, preferred in the order evaluation, submission,
    /// training.
    async fn find_stoppable(
        &self,
        model_status: &ModelStatus,
        model_id: &ModelId,
        profile_id: &ProfileId,
    ) -> Result<Option<JobRecord>, EngineError> {
        match model_status {
            ModelStatus::Evaluating => Ok(self
                .services
                .evaluations
                .get_stoppable(model_id)
                .await?
                .map(JobRecord::Evaluation)),
            ModelStatus::Queued => {
                let (evaluation, submission, training) = tokio::try_join!(
                    self.services.evaluations.get_stoppable(model_id),
                    self.services.submissions.get_stoppable(model_id, profile_id),
                    self.services.trainings.get_stoppable(model_id),
                )?;
                Ok(evaluation
                    .map(JobRecord::Evaluation)
                    .or(submission.map(JobRecord::Submission))
                    .or(training.map(JobRecord::Training)))
            }
            ModelStatus::Training => {
                Ok(self.services.trainings.get_stoppable(model_id).await?.map(JobRecord::Training))
            }
            other => Err(EngineError::StateConflict(format!(
                "model in status {other} is not stoppable"
            ))),
        }
    }

    /// Stop an in-progress execution. The service rejects stops on
    /// terminal executions, so the status is checked first.
    async fn stop_running(&self, job_name: &JobName) -> Result<(), EngineError> {
        let report = self.services.execution.describe(job_name).await?;
        if report.status == ExecutionStatus::InProgress {
            self.services.execution.stop(job_name).await?;
        } else {
            tracing::warn!(
                job = %job_name,
                status = %report.status,
                "execution already past stopping, leaving it to finalize"
            );
        }
        Ok(())
    }

    /// Cancel a job the executor has not started: poll until it reaches a
    /// stoppable state, then stop it. A job already terminal needs no
    /// stop. If the budget runs out the caller gets an error telling the
    /// user to contact an administrator — retrying cannot help.
    async fn cancel_queued(&self, job_name: &JobName) -> Result<(), EngineError> {
        let deadline = tokio::time::Instant::now() + self.config.poll_budget;

        while tokio::time::Instant::now() < deadline {
            match self.services.execution.describe(job_name).await {
                Ok(report) if report.status == ExecutionStatus::InProgress => {
                    self.services.execution.stop(job_name).await?;
                    return Ok(());
                }
                Ok(report) if report.status.is_terminal() => return Ok(()),
                Ok(report) => {
                    tracing::debug!(job = %job_name, status = %report.status, "queued job not yet stoppable");
                }
                Err(err) => {
                    // Not visible to the service yet; keep polling.
                    tracing::debug!(job = %job_name, error = %err, "queued job not yet visible");
                }
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        tracing::warn!(job = %job_name, budget = ?self.config.poll_budget, "timed out waiting for queued job to become stoppable");
        Err(EngineError::CancelTimeout)
    }
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;
