// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.

use crate::context::WorkflowContext;
use crate::Services;
use pw_adapters::{ConfigValidator, FakeChannels, FakeExecution, FakeQueue, MemoryObjects, StaticValidator};
use pw_core::{
    Clock, EvaluationId, EvaluationJob, FakeClock, JobCore, JobName, JobRecord, JobStatus, Leaderboard,
    LeaderboardId, Model, ModelId, ModelStatus, Profile, ProfileId, SubmissionId, SubmissionJob,
    TrainingJob,
};
use pw_store::{
    EvaluationStore, LeaderboardStore, MemoryStore, ModelStore, ProfileStore, SubmissionStore,
    TrainingStore,
};
use std::sync::Arc;

pub(crate) struct TestHarness {
    pub services: Services,
    pub store: Arc<MemoryStore>,
    pub execution: Arc<FakeExecution>,
    pub objects: Arc<MemoryObjects>,
    pub channels: Arc<FakeChannels>,
    pub queue: Arc<FakeQueue>,
    pub clock: Arc<FakeClock>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_validator(Arc::new(StaticValidator))
    }

    pub fn with_validator(validator: Arc<dyn ConfigValidator>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let execution = Arc::new(FakeExecution::new());
        let objects = Arc::new(MemoryObjects::new());
        let channels = Arc::new(FakeChannels::new());
        let queue = Arc::new(FakeQueue::new());
        let clock = Arc::new(FakeClock::new());

        let services = Services {
            models: store.clone(),
            trainings: store.clone(),
            evaluations: store.clone(),
            submissions: store.clone(),
            profiles: store.clone(),
            account_usage: store.clone(),
            leaderboards: store.clone(),
            execution: execution.clone(),
            objects: objects.clone(),
            channels: channels.clone(),
            queue: queue.clone(),
            validator,
            clock: clock.clone(),
        };

        Self { services, store, execution, objects, channels, queue, clock }
    }

    pub async fn seed_profile(&self, profile_id: &str, max_minutes: Option<u32>) -> Profile {
        let mut builder = Profile::builder().profile_id(profile_id);
        if let Some(max) = max_minutes {
            builder = builder.max_total_compute_minutes(max);
        }
        let profile = builder.build();
        self.services.profiles.create(profile.clone()).await.unwrap();
        profile
    }

    pub async fn seed_model(
        &self,
        profile_id: &str,
        model_id: &str,
        status: ModelStatus,
    ) -> Model {
        let model =
            Model::builder().profile_id(profile_id).model_id(model_id).status(status).build();
        self.services.models.create(model.clone()).await.unwrap();
        model
    }

    pub async fn seed_training(
        &self,
        profile_id: &str,
        model_id: &str,
        status: JobStatus,
    ) -> TrainingJob {
        let model_id = ModelId::from(model_id);
        let job = TrainingJob {
            core: JobCore::builder()
                .name(JobName::training(&model_id))
                .model_id(model_id)
                .profile_id(ProfileId::from(profile_id))
                .status(status)
                .build(),
        };
        self.services.trainings.create(job.clone()).await.unwrap();
        job
    }

    pub async fn seed_evaluation(
        &self,
        profile_id: &str,
        model_id: &str,
        evaluation_id: &str,
        status: JobStatus,
    ) -> EvaluationJob {
        let evaluation_id = EvaluationId::from(evaluation_id);
        let job = EvaluationJob {
            core: JobCore::builder()
                .name(JobName::evaluation(&evaluation_id))
                .model_id(ModelId::from(model_id))
                .profile_id(ProfileId::from(profile_id))
                .status(status)
                .build(),
            evaluation_id,
        };
        self.services.evaluations.create(job.clone()).await.unwrap();
        job
    }

    pub async fn seed_submission(
        &self,
        profile_id: &str,
        model_id: &str,
        leaderboard_id: &str,
        submission_id: &str,
        status: JobStatus,
    ) -> SubmissionJob {
        let submission_id = SubmissionId::from(submission_id);
        let job = SubmissionJob {
            core: JobCore::builder()
                .name(JobName::submission(&submission_id))
                .model_id(ModelId::from(model_id))
                .profile_id(ProfileId::from(profile_id))
                .status(status)
                .build(),
            submission_id,
            leaderboard_id: LeaderboardId::from(leaderboard_id),
        };
        self.services.submissions.create(job.clone()).await.unwrap();
        job
    }

    pub async fn seed_leaderboard(&self, leaderboard_id: &str) -> Leaderboard {
        let leaderboard = Leaderboard {
            leaderboard_id: LeaderboardId::from(leaderboard_id),
            name: format!("race {leaderboard_id}"),
            created_at_ms: self.clock.epoch_ms(),
        };
        self.services.leaderboards.create(leaderboard.clone()).await.unwrap();
        leaderboard
    }
}

/// Context for a freshly dispatched job record.
pub(crate) fn context_for(job: &JobRecord) -> WorkflowContext {
    let core = job.core();
    WorkflowContext {
        job_name: core.name.clone(),
        model_id: core.model_id.clone(),
        profile_id: core.profile_id.clone(),
        leaderboard_id: job.leaderboard_id().cloned(),
        channel: None,
        execution: None,
        error: None,
    }
}
