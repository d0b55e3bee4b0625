// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job-type router: one place that maps a job name to the right store.

use crate::context::WorkflowContext;
use crate::error::EngineError;
use crate::Services;
use pw_core::{JobKind, JobName, JobRecord, JobUpdate, LeaderboardId, ModelId, ProfileId};
use pw_store::{EvaluationStore, SubmissionStore, TrainingStore};

/// Everything needed to locate a job of any kind.
#[derive(Debug, Clone, PartialEq)]
pub struct JobLocator {
    pub job_name: JobName,
    pub model_id: ModelId,
    pub profile_id: ProfileId,
    pub leaderboard_id: Option<LeaderboardId>,
}

impl JobLocator {
    /// Locator for a loaded record (used when re-addressing a job found by
    /// a stoppable-candidate search).
    pub fn for_record(record: &JobRecord) -> Self {
        let core = record.core();
        Self {
            job_name: core.name.clone(),
            model_id: core.model_id.clone(),
            profile_id: core.profile_id.clone(),
            leaderboard_id: record.leaderboard_id().cloned(),
        }
    }
}

impl From<&WorkflowContext> for JobLocator {
    fn from(ctx: &WorkflowContext) -> Self {
        Self {
            job_name: ctx.job_name.clone(),
            model_id: ctx.model_id.clone(),
            profile_id: ctx.profile_id.clone(),
            leaderboard_id: ctx.leaderboard_id.clone(),
        }
    }
}

/// Dispatches `get`/`update` to the store matching the job's kind, so
/// upper layers operate on "a job" without knowing its concrete kind.
#[derive(Clone)]
pub struct JobRouter {
    services: Services,
}

impl JobRouter {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Kind encoded in the job name. An unknown prefix is a programming
    /// error: logged and surfaced as an internal failure, never retried.
    fn kind_of(&self, job_name: &JobName) -> Result<JobKind, EngineError> {
        job_name.kind().ok_or_else(|| {
            tracing::error!(job = %job_name, "job name has an unknown kind prefix");
            EngineError::Internal
        })
    }

    /// Submission jobs are addressed through their leaderboard; a locator
    /// without one cannot have been produced by admission.
    fn leaderboard_of<'a>(&self, locator: &'a JobLocator) -> Result<&'a LeaderboardId, EngineError> {
        locator.leaderboard_id.as_ref().ok_or_else(|| {
            tracing::error!(job = %locator.job_name, "submission locator is missing a leaderboard");
            EngineError::Internal
        })
    }

    pub async fn get(&self, locator: &JobLocator) -> Result<JobRecord, EngineError> {
        match self.kind_of(&locator.job_name)? {
            JobKind::Training => {
                let job = self.services.trainings.load(&locator.model_id).await?;
                Ok(JobRecord::Training(job))
            }
            JobKind::Evaluation => {
                let evaluation_id =
                    locator.job_name.evaluation_id().ok_or(EngineError::Internal)?;
                let job =
                    self.services.evaluations.load(&locator.model_id, &evaluation_id).await?;
                Ok(JobRecord::Evaluation(job))
            }
            JobKind::Submission => {
                let submission_id =
                    locator.job_name.submission_id().ok_or(EngineError::Internal)?;
                let leaderboard_id = self.leaderboard_of(locator)?;
                let job = self
                    .services
                    .submissions
                    .load(&locator.profile_id, leaderboard_id, &submission_id)
                    .await?;
                Ok(JobRecord::Submission(job))
            }
        }
    }

    pub async fn update(
        &self,
        locator: &JobLocator,
        update: JobUpdate,
    ) -> Result<JobRecord, EngineError> {
        match self.kind_of(&locator.job_name)? {
            JobKind::Training => {
                let job = self.services.trainings.update(&locator.model_id, update).await?;
                Ok(JobRecord::Training(job))
            }
            JobKind::Evaluation => {
                let evaluation_id =
                    locator.job_name.evaluation_id().ok_or(EngineError::Internal)?;
                let job = self
                    .services
                    .evaluations
                    .update(&locator.model_id, &evaluation_id, update)
                    .await?;
                Ok(JobRecord::Evaluation(job))
            }
            JobKind::Submission => {
                let submission_id =
                    locator.job_name.submission_id().ok_or(EngineError::Internal)?;
                let leaderboard_id = self.leaderboard_of(locator)?;
                let job = self
                    .services
                    .submissions
                    .update(&locator.profile_id, leaderboard_id, &submission_id, update)
                    .await?;
                Ok(JobRecord::Submission(job))
            }
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
