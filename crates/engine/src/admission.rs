// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission: validate, reserve quota, create records, enqueue dispatch.

use crate::error::EngineError;
use crate::quota::QuotaHelper;
use crate::Services;
use pw_adapters::{ConfigValidator, DispatchMessage, DispatchQueue};
use pw_core::{
    Clock, EvaluationId, EvaluationJob, JobAssets, JobCore, JobName, JobStatus, LeaderboardId,
    Model, ModelId, ModelMetadata, ModelStatus, ModelUpdate, ProfileId, SubmissionId,
    SubmissionJob, TerminationConditions, TrackConfig, TrainingJob,
};
use pw_store::{EvaluationStore, LeaderboardStore, ModelStore, SubmissionStore, TrainingStore};

/// Jobs shorter than this cannot meaningfully spin up the simulator.
const MIN_JOB_TIME_IN_MINUTES: u32 = 10;
/// One day, the longest run the executor accepts.
const MAX_JOB_TIME_IN_MINUTES: u32 = 1440;

#[derive(Debug, Clone)]
pub struct TrainingRequest {
    pub profile_id: ProfileId,
    pub model_name: String,
    pub metadata: ModelMetadata,
    pub track: TrackConfig,
    pub max_time_in_minutes: u32,
    pub cloned_from_model_id: Option<ModelId>,
}

#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub profile_id: ProfileId,
    pub model_id: ModelId,
    pub track: TrackConfig,
    pub max_time_in_minutes: u32,
    pub max_laps: u32,
}

#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub profile_id: ProfileId,
    pub model_id: ModelId,
    pub leaderboard_id: LeaderboardId,
    pub track: TrackConfig,
    pub max_time_in_minutes: u32,
    pub max_laps: u32,
}

/// Admits new jobs: checks quota, creates the model/job records and the
/// quota reservation in one logical operation, then enqueues a dispatch
/// message keyed by job name.
///
/// The reservation and the record writes are concurrent, not
/// transactional; a failure partway leaves compensation to the caller.
#[derive(Clone)]
pub struct Admission {
    services: Services,
    quota: QuotaHelper,
}

impl Admission {
    pub fn new(services: Services) -> Self {
        let quota = QuotaHelper::new(services.clone());
        Self { services, quota }
    }

    fn validate_termination(max_time_in_minutes: u32) -> Result<(), EngineError> {
        if !(MIN_JOB_TIME_IN_MINUTES..=MAX_JOB_TIME_IN_MINUTES).contains(&max_time_in_minutes) {
            return Err(EngineError::Validation("max time in minutes is invalid".to_string()));
        }
        Ok(())
    }

    /// Create a model and its training job.
    pub async fn admit_training(&self, request: TrainingRequest) -> Result<ModelId, EngineError> {
        Self::validate_termination(request.max_time_in_minutes)?;
        self.services
            .validator
            .validate_reward_function(&request.metadata.reward_function, &request.track)
            .await?;

        if let Some(source_id) = &request.cloned_from_model_id {
            let source = self.services.models.get(&request.profile_id, source_id).await?;
            if source.is_none() {
                return Err(EngineError::Validation(
                    "pre-trained source model for clone does not exist".to_string(),
                ));
            }
        }

        let usage = self.quota.load_profile_usage(&request.profile_id).await?;
        QuotaHelper::check_admission(&usage, request.max_time_in_minutes, true)?;

        let model_id = ModelId::new();
        let job_name = JobName::training(&model_id);
        let now = self.services.clock.epoch_ms();

        let model = Model {
            model_id: model_id.clone(),
            profile_id: request.profile_id.clone(),
            name: request.model_name,
            status: ModelStatus::Queued,
            cloned_from_model_id: request.cloned_from_model_id,
            metadata: request.metadata,
            assets: pw_core::ModelAssets::for_model(&request.profile_id, &model_id),
            created_at_ms: now,
        };
        let training = TrainingJob {
            core: JobCore {
                name: job_name.clone(),
                model_id: model_id.clone(),
                profile_id: request.profile_id.clone(),
                status: JobStatus::Queued,
                termination: TerminationConditions {
                    max_time_in_minutes: request.max_time_in_minutes,
                    max_laps: None,
                },
                track: request.track,
                execution_handle: None,
                started_at_ms: None,
                ended_at_ms: None,
                assets: JobAssets::for_job(&request.profile_id, &model_id, &job_name),
                created_at_ms: now,
            },
        };

        tokio::try_join!(
            async { self.services.models.create(model).await.map_err(EngineError::from) },
            async { self.services.trainings.create(training).await.map_err(EngineError::from) },
            self.quota.reserve(&request.profile_id, request.max_time_in_minutes, true),
        )?;

        self.enqueue(job_name, model_id.clone(), request.profile_id, None).await?;
        Ok(model_id)
    }

    /// Create an evaluation job for a ready model.
    pub async fn admit_evaluation(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationId, EngineError> {
        Self::validate_termination(request.max_time_in_minutes)?;

        let model =
            self.services.models.load(&request.profile_id, &request.model_id).await?;
        if model.status != ModelStatus::Ready {
            return Err(EngineError::StateConflict(
                "model is not ready for evaluation".to_string(),
            ));
        }

        let usage = self.quota.load_profile_usage(&request.profile_id).await?;
        QuotaHelper::check_admission(&usage, request.max_time_in_minutes, false)?;

        let evaluation_id = EvaluationId::new();
        let job_name = JobName::evaluation(&evaluation_id);
        let job = EvaluationJob {
            core: self.job_core(
                job_name.clone(),
                &request.model_id,
                &request.profile_id,
                request.track,
                request.max_time_in_minutes,
                Some(request.max_laps),
            ),
            evaluation_id: evaluation_id.clone(),
        };

        tokio::try_join!(
            async { self.services.evaluations.create(job).await.map_err(EngineError::from) },
            async {
                self.services
                    .models
                    .update(
                        &request.profile_id,
                        &request.model_id,
                        ModelUpdate::status(ModelStatus::Queued),
                    )
                    .await
                    .map_err(EngineError::from)
            },
            self.quota.reserve(&request.profile_id, request.max_time_in_minutes, false),
        )?;

        self.enqueue(job_name, request.model_id, request.profile_id, None).await?;
        Ok(evaluation_id)
    }

    /// Create a race submission for a ready model on an existing
    /// leaderboard.
    pub async fn admit_submission(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionId, EngineError> {
        Self::validate_termination(request.max_time_in_minutes)?;

        let leaderboard = self.services.leaderboards.get(&request.leaderboard_id).await?;
        if leaderboard.is_none() {
            return Err(EngineError::Validation("leaderboard does not exist".to_string()));
        }

        let model =
            self.services.models.load(&request.profile_id, &request.model_id).await?;
        if model.status != ModelStatus::Ready {
            return Err(EngineError::StateConflict(
                "model is not ready for submission".to_string(),
            ));
        }

        let usage = self.quota.load_profile_usage(&request.profile_id).await?;
        QuotaHelper::check_admission(&usage, request.max_time_in_minutes, false)?;

        let submission_id = SubmissionId::new();
        let job_name = JobName::submission(&submission_id);
        let job = SubmissionJob {
            core: self.job_core(
                job_name.clone(),
                &request.model_id,
                &request.profile_id,
                request.track,
                request.max_time_in_minutes,
                Some(request.max_laps),
            ),
            submission_id: submission_id.clone(),
            leaderboard_id: request.leaderboard_id.clone(),
        };

        tokio::try_join!(
            async { self.services.submissions.create(job).await.map_err(EngineError::from) },
            async {
                self.services
                    .models
                    .update(
                        &request.profile_id,
                        &request.model_id,
                        ModelUpdate::status(ModelStatus::Queued),
                    )
                    .await
                    .map_err(EngineError::from)
            },
            self.quota.reserve(&request.profile_id, request.max_time_in_minutes, false),
        )?;

        self.enqueue(
            job_name,
            request.model_id,
            request.profile_id,
            Some(request.leaderboard_id),
        )
        .await?;
        Ok(submission_id)
    }

    fn job_core(
        &self,
        name: JobName,
        model_id: &ModelId,
        profile_id: &ProfileId,
        track: TrackConfig,
        max_time_in_minutes: u32,
        max_laps: Option<u32>,
    ) -> JobCore {
        JobCore {
            assets: JobAssets::for_job(profile_id, model_id, &name),
            name,
            model_id: model_id.clone(),
            profile_id: profile_id.clone(),
            status: JobStatus::Queued,
            termination: TerminationConditions { max_time_in_minutes, max_laps },
            track,
            execution_handle: None,
            started_at_ms: None,
            ended_at_ms: None,
            created_at_ms: self.services.clock.epoch_ms(),
        }
    }

    async fn enqueue(
        &self,
        job_name: JobName,
        model_id: ModelId,
        profile_id: ProfileId,
        leaderboard_id: Option<LeaderboardId>,
    ) -> Result<(), EngineError> {
        let message = DispatchMessage { job_name, model_id, profile_id, leaderboard_id };
        tracing::info!(job = %message.job_name, "sending dispatch message");
        self.services.queue.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
