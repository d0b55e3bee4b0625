// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job initializer: stands a dispatched job up on the external executor.

use crate::context::{ExecutionState, WorkflowContext};
use crate::error::EngineError;
use crate::manifest;
use crate::router::{JobLocator, JobRouter};
use crate::Services;
use pw_adapters::{ExecutionRequest, ExecutionService, ObjectStore, TelemetryChannels};
use pw_core::{
    Clock, JobKind, JobRecord, JobStatus, JobUpdate, Model, ModelStatus, ModelUpdate, Profile,
};
use pw_store::{ModelStore, ProfileStore};

/// Model status while a job of the given kind is running.
///
/// Immutable kind→status table; the match keeps it exhaustive when a new
/// kind is added.
pub fn running_model_status(kind: JobKind) -> ModelStatus {
    match kind {
        JobKind::Training => ModelStatus::Training,
        JobKind::Evaluation | JobKind::Submission => ModelStatus::Evaluating,
    }
}

/// Model status after a failed attempt of the given kind. A failed
/// training leaves the model unusable; a failed evaluation or submission
/// returns it to service.
pub fn failed_model_status(kind: JobKind) -> ModelStatus {
    match kind {
        JobKind::Training => ModelStatus::Error,
        JobKind::Evaluation | JobKind::Submission => ModelStatus::Ready,
    }
}

/// Consumes dispatch messages: writes the job's external configuration,
/// provisions its telemetry channel, and submits it for execution.
#[derive(Clone)]
pub struct JobInitializer {
    services: Services,
    router: JobRouter,
}

impl JobInitializer {
    pub fn new(services: Services) -> Self {
        let router = JobRouter::new(services.clone());
        Self { services, router }
    }

    /// Run initialization. Step failures are captured on the context and
    /// routed into the persistence step, so job and model status always
    /// land somewhere terminal-or-forward; the context is returned to the
    /// caller either way.
    pub async fn run(&self, mut ctx: WorkflowContext) -> WorkflowContext {
        if let Err(err) = self.initialize(&mut ctx).await {
            tracing::warn!(job = %ctx.job_name, error = %err, "job initialization failed");
            ctx.record_error(&err);
        }
        if let Err(err) = self.persist(&ctx).await {
            // No automatic recovery from a failed persist; this is the
            // alertable case.
            tracing::error!(job = %ctx.job_name, error = %err, "unable to persist job initialization outcome");
            ctx.record_error(&err);
        }
        ctx
    }

    async fn initialize(&self, ctx: &mut WorkflowContext) -> Result<(), EngineError> {
        let locator = JobLocator::from(&*ctx);
        let (job, model, profile) = tokio::try_join!(
            self.router.get(&locator),
            async {
                self.services
                    .models
                    .load(&ctx.profile_id, &ctx.model_id)
                    .await
                    .map_err(EngineError::from)
            },
            async { self.services.profiles.load(&ctx.profile_id).await.map_err(EngineError::from) },
        )?;

        let channel = self.services.channels.create_channel(&ctx.job_name).await?;
        ctx.channel = Some(channel);

        self.write_job_files(&job, &model, &profile).await?;

        if job.is_evaluation() || job.is_submission() {
            self.delete_stale_heartbeat(&job).await;
        }

        let request = self.build_request(&job, &model).await?;
        let handle = self.services.execution.submit(request).await?;
        ctx.execution =
            Some(ExecutionState { handle, status: None, artifact_location: None });
        Ok(())
    }

    /// Write the environment manifest, plus model metadata and reward
    /// logic for training jobs.
    async fn write_job_files(
        &self,
        job: &JobRecord,
        model: &Model,
        profile: &Profile,
    ) -> Result<(), EngineError> {
        let env_manifest = manifest::environment_manifest(job, model, profile);
        let config_write = self.services.objects.write(&job.core().assets.config, &env_manifest);

        if job.is_training() {
            let metadata = manifest::model_metadata_file(model);
            tokio::try_join!(
                config_write,
                self.services.objects.write(&model.assets.metadata, &metadata),
                self.services
                    .objects
                    .write(&model.assets.reward_function, &model.metadata.reward_function),
            )?;
        } else {
            config_write.await?;
        }
        Ok(())
    }

    /// Best effort: a leftover heartbeat from a previous attempt would make
    /// the monitor think the new run is already alive.
    async fn delete_stale_heartbeat(&self, job: &JobRecord) {
        let location = &job.core().assets.heartbeat;
        if let Err(err) = self.services.objects.delete(location).await {
            tracing::warn!(location, error = %err, "unable to delete previous heartbeat marker");
        }
    }

    async fn build_request(
        &self,
        job: &JobRecord,
        model: &Model,
    ) -> Result<ExecutionRequest, EngineError> {
        let clone_source = match &model.cloned_from_model_id {
            Some(source_id) => {
                let source = self.services.models.get(&model.profile_id, source_id).await?;
                if source.is_none() {
                    tracing::error!(
                        model = %model.model_id,
                        source = %source_id,
                        "pre-trained source model for clone does not exist"
                    );
                    return Err(EngineError::Validation(
                        "pre-trained source model for clone does not exist".to_string(),
                    ));
                }
                source
            }
            None => None,
        };

        Ok(ExecutionRequest {
            job_name: job.core().name.clone(),
            max_runtime_minutes: job.core().termination.max_time_in_minutes,
            environment: manifest::execution_environment(job, model, clone_source.as_ref()),
            output_location: model.assets.artifacts.clone(),
        })
    }

    async fn persist(&self, ctx: &WorkflowContext) -> Result<(), EngineError> {
        let kind = ctx.job_name.kind().ok_or_else(|| {
            tracing::error!(job = %ctx.job_name, "job name has an unknown kind prefix");
            EngineError::Internal
        })?;

        let (job_status, model_status) = if ctx.error.is_some() {
            (JobStatus::Failed, failed_model_status(kind))
        } else {
            (JobStatus::Initializing, running_model_status(kind))
        };

        let update = JobUpdate {
            status: Some(job_status),
            execution_handle: ctx.execution.as_ref().map(|e| e.handle.clone()),
            started_at_ms: Some(self.services.clock.epoch_ms()),
            ended_at_ms: None,
        };
        let locator = JobLocator::from(ctx);

        tokio::try_join!(
            async {
                self.services
                    .models
                    .update(&ctx.profile_id, &ctx.model_id, ModelUpdate::status(model_status))
                    .await
                    .map_err(EngineError::from)
            },
            self.router.update(&locator, update),
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "initializer_tests.rs"]
mod tests;
