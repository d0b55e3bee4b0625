// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record-store traits.
//!
//! `load` fails with [`StoreError::NotFound`] when the record is missing;
//! `get` returns `Ok(None)` instead. Updates are partial: unset fields of
//! the update struct leave the stored record unchanged.

use crate::{Page, StoreError};
use async_trait::async_trait;
use pw_core::{
    AccountPeriodUsage, AccountUsageUpdate, EvaluationId, EvaluationJob, JobUpdate, Leaderboard,
    LeaderboardId, Model, ModelId, ModelUpdate, Period, Profile, ProfileId, ProfileUpdate,
    SubmissionId, SubmissionJob, TrainingJob,
};

#[async_trait]
pub trait ModelStore: Send + Sync {
    async fn load(&self, profile_id: &ProfileId, model_id: &ModelId)
        -> Result<Model, StoreError>;
    async fn get(
        &self,
        profile_id: &ProfileId,
        model_id: &ModelId,
    ) -> Result<Option<Model>, StoreError>;
    async fn create(&self, model: Model) -> Result<Model, StoreError>;
    async fn update(
        &self,
        profile_id: &ProfileId,
        model_id: &ModelId,
        update: ModelUpdate,
    ) -> Result<Model, StoreError>;
    /// Model IDs owned by a profile, in stable order.
    async fn list_ids_for_profile(
        &self,
        profile_id: &ProfileId,
        cursor: Option<String>,
        max_results: usize,
    ) -> Result<Page<ModelId>, StoreError>;
}

#[async_trait]
pub trait TrainingStore: Send + Sync {
    async fn load(&self, model_id: &ModelId) -> Result<TrainingJob, StoreError>;
    async fn create(&self, job: TrainingJob) -> Result<TrainingJob, StoreError>;
    async fn update(&self, model_id: &ModelId, update: JobUpdate)
        -> Result<TrainingJob, StoreError>;
    /// The model's training run if it is in a non-terminal status.
    async fn get_stoppable(&self, model_id: &ModelId) -> Result<Option<TrainingJob>, StoreError>;
    async fn count_for_model(&self, model_id: &ModelId) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait EvaluationStore: Send + Sync {
    async fn load(
        &self,
        model_id: &ModelId,
        evaluation_id: &EvaluationId,
    ) -> Result<EvaluationJob, StoreError>;
    async fn create(&self, job: EvaluationJob) -> Result<EvaluationJob, StoreError>;
    async fn update(
        &self,
        model_id: &ModelId,
        evaluation_id: &EvaluationId,
        update: JobUpdate,
    ) -> Result<EvaluationJob, StoreError>;
    /// The model's evaluation run in a non-terminal status, if any.
    async fn get_stoppable(&self, model_id: &ModelId)
        -> Result<Option<EvaluationJob>, StoreError>;
    async fn count_for_model(&self, model_id: &ModelId) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn load(
        &self,
        profile_id: &ProfileId,
        leaderboard_id: &LeaderboardId,
        submission_id: &SubmissionId,
    ) -> Result<SubmissionJob, StoreError>;
    async fn create(&self, job: SubmissionJob) -> Result<SubmissionJob, StoreError>;
    async fn update(
        &self,
        profile_id: &ProfileId,
        leaderboard_id: &LeaderboardId,
        submission_id: &SubmissionId,
        update: JobUpdate,
    ) -> Result<SubmissionJob, StoreError>;
    /// The model's submission run in a non-terminal status, if any.
    async fn get_stoppable(
        &self,
        model_id: &ModelId,
        profile_id: &ProfileId,
    ) -> Result<Option<SubmissionJob>, StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load(&self, profile_id: &ProfileId) -> Result<Profile, StoreError>;
    async fn create(&self, profile: Profile) -> Result<Profile, StoreError>;
    async fn update(
        &self,
        profile_id: &ProfileId,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError>;
    /// All profiles, in stable order.
    async fn list(
        &self,
        cursor: Option<String>,
        max_results: usize,
    ) -> Result<Page<Profile>, StoreError>;
}

#[async_trait]
pub trait AccountUsageStore: Send + Sync {
    /// Load the period row, creating an empty one if absent.
    async fn get_or_create(&self, period: Period) -> Result<AccountPeriodUsage, StoreError>;
    async fn get(&self, period: Period) -> Result<Option<AccountPeriodUsage>, StoreError>;
    async fn update(
        &self,
        period: Period,
        update: AccountUsageUpdate,
    ) -> Result<AccountPeriodUsage, StoreError>;
}

#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn get(&self, leaderboard_id: &LeaderboardId)
        -> Result<Option<Leaderboard>, StoreError>;
    async fn create(&self, leaderboard: Leaderboard) -> Result<Leaderboard, StoreError>;
    async fn count(&self) -> Result<usize, StoreError>;
}
