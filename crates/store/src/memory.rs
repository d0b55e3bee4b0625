// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory record store.
//!
//! Backs tests and single-process embedders. Records live in `BTreeMap`s
//! so listings are stable and cursors are just the last key returned.

use crate::traits::{
    AccountUsageStore, EvaluationStore, LeaderboardStore, ModelStore, ProfileStore,
    SubmissionStore, TrainingStore,
};
use crate::{Page, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use pw_core::{
    AccountPeriodUsage, AccountUsageUpdate, EvaluationId, EvaluationJob, JobUpdate, Leaderboard,
    LeaderboardId, Model, ModelId, ModelUpdate, Period, Profile, ProfileId, ProfileUpdate,
    SubmissionId, SubmissionJob, TrainingJob,
};
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Default)]
struct Inner {
    models: BTreeMap<String, Model>,
    trainings: BTreeMap<String, TrainingJob>,
    evaluations: BTreeMap<String, EvaluationJob>,
    submissions: BTreeMap<String, SubmissionJob>,
    profiles: BTreeMap<String, Profile>,
    account_usage: BTreeMap<String, AccountPeriodUsage>,
    leaderboards: BTreeMap<String, Leaderboard>,
}

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn model_key(profile_id: &ProfileId, model_id: &ModelId) -> String {
    format!("{}/{}", profile_id, model_id)
}

fn evaluation_key(model_id: &ModelId, evaluation_id: &EvaluationId) -> String {
    format!("{}/{}", model_id, evaluation_id)
}

fn submission_key(
    profile_id: &ProfileId,
    leaderboard_id: &LeaderboardId,
    submission_id: &SubmissionId,
) -> String {
    format!("{}/{}/{}", profile_id, leaderboard_id, submission_id)
}

/// Keys strictly after `cursor`, capped at `max`. Returns the matched keys
/// and the resume cursor (set only when further keys remain).
fn page_keys<V>(
    map: &BTreeMap<String, V>,
    cursor: Option<&str>,
    max: usize,
    prefix: Option<&str>,
) -> (Vec<String>, Option<String>) {
    let lower = match cursor {
        Some(c) => Bound::Excluded(c.to_string()),
        None => match prefix {
            Some(p) => Bound::Included(p.to_string()),
            None => Bound::Unbounded,
        },
    };
    let mut keys = Vec::new();
    let mut more = false;
    for key in map.range((lower, Bound::Unbounded)).map(|(k, _)| k) {
        if let Some(p) = prefix {
            if !key.starts_with(p) {
                break;
            }
        }
        if keys.len() == max {
            more = true;
            break;
        }
        keys.push(key.clone());
    }
    let cursor = if more { keys.last().cloned() } else { None };
    (keys, cursor)
}

#[async_trait]
impl ModelStore for MemoryStore {
    async fn load(
        &self,
        profile_id: &ProfileId,
        model_id: &ModelId,
    ) -> Result<Model, StoreError> {
        self.inner
            .lock()
            .models
            .get(&model_key(profile_id, model_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("model {}", model_id)))
    }

    async fn get(
        &self,
        profile_id: &ProfileId,
        model_id: &ModelId,
    ) -> Result<Option<Model>, StoreError> {
        Ok(self.inner.lock().models.get(&model_key(profile_id, model_id)).cloned())
    }

    async fn create(&self, model: Model) -> Result<Model, StoreError> {
        let key = model_key(&model.profile_id, &model.model_id);
        let mut inner = self.inner.lock();
        if inner.models.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!("model {}", model.model_id)));
        }
        inner.models.insert(key, model.clone());
        Ok(model)
    }

    async fn update(
        &self,
        profile_id: &ProfileId,
        model_id: &ModelId,
        update: ModelUpdate,
    ) -> Result<Model, StoreError> {
        let mut inner = self.inner.lock();
        let model = inner
            .models
            .get_mut(&model_key(profile_id, model_id))
            .ok_or_else(|| StoreError::NotFound(format!("model {}", model_id)))?;
        update.apply(model);
        Ok(model.clone())
    }

    async fn list_ids_for_profile(
        &self,
        profile_id: &ProfileId,
        cursor: Option<String>,
        max_results: usize,
    ) -> Result<Page<ModelId>, StoreError> {
        let inner = self.inner.lock();
        let prefix = format!("{}/", profile_id);
        let (keys, cursor) =
            page_keys(&inner.models, cursor.as_deref(), max_results, Some(&prefix));
        let items = keys
            .iter()
            .filter_map(|k| inner.models.get(k).map(|m| m.model_id.clone()))
            .collect();
        Ok(Page { items, cursor })
    }
}

#[async_trait]
impl TrainingStore for MemoryStore {
    async fn load(&self, model_id: &ModelId) -> Result<TrainingJob, StoreError> {
        self.inner
            .lock()
            .trainings
            .get(model_id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("training for {}", model_id)))
    }

    async fn create(&self, job: TrainingJob) -> Result<TrainingJob, StoreError> {
        let key = job.core.model_id.as_str().to_string();
        let mut inner = self.inner.lock();
        if inner.trainings.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!("training for {}", job.core.model_id)));
        }
        inner.trainings.insert(key, job.clone());
        Ok(job)
    }

    async fn update(
        &self,
        model_id: &ModelId,
        update: JobUpdate,
    ) -> Result<TrainingJob, StoreError> {
        let mut inner = self.inner.lock();
        let job = inner
            .trainings
            .get_mut(model_id.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("training for {}", model_id)))?;
        update.apply(&mut job.core);
        Ok(job.clone())
    }

    async fn get_stoppable(&self, model_id: &ModelId) -> Result<Option<TrainingJob>, StoreError> {
        Ok(self
            .inner
            .lock()
            .trainings
            .get(model_id.as_str())
            .filter(|job| !job.core.status.is_terminal())
            .cloned())
    }

    async fn count_for_model(&self, model_id: &ModelId) -> Result<usize, StoreError> {
        Ok(usize::from(self.inner.lock().trainings.contains_key(model_id.as_str())))
    }
}

#[async_trait]
impl EvaluationStore for MemoryStore {
    async fn load(
        &self,
        model_id: &ModelId,
        evaluation_id: &EvaluationId,
    ) -> Result<EvaluationJob, StoreError> {
        self.inner
            .lock()
            .evaluations
            .get(&evaluation_key(model_id, evaluation_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("evaluation {}", evaluation_id)))
    }

    async fn create(&self, job: EvaluationJob) -> Result<EvaluationJob, StoreError> {
        let key = evaluation_key(&job.core.model_id, &job.evaluation_id);
        let mut inner = self.inner.lock();
        if inner.evaluations.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!("evaluation {}", job.evaluation_id)));
        }
        inner.evaluations.insert(key, job.clone());
        Ok(job)
    }

    async fn update(
        &self,
        model_id: &ModelId,
        evaluation_id: &EvaluationId,
        update: JobUpdate,
    ) -> Result<EvaluationJob, StoreError> {
        let mut inner = self.inner.lock();
        let job = inner
            .evaluations
            .get_mut(&evaluation_key(model_id, evaluation_id))
            .ok_or_else(|| StoreError::NotFound(format!("evaluation {}", evaluation_id)))?;
        update.apply(&mut job.core);
        Ok(job.clone())
    }

    async fn get_stoppable(
        &self,
        model_id: &ModelId,
    ) -> Result<Option<EvaluationJob>, StoreError> {
        Ok(self
            .inner
            .lock()
            .evaluations
            .values()
            .find(|job| job.core.model_id == *model_id && !job.core.status.is_terminal())
            .cloned())
    }

    async fn count_for_model(&self, model_id: &ModelId) -> Result<usize, StoreError> {
        Ok(self
            .inner
            .lock()
            .evaluations
            .values()
            .filter(|job| job.core.model_id == *model_id)
            .count())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn load(
        &self,
        profile_id: &ProfileId,
        leaderboard_id: &LeaderboardId,
        submission_id: &SubmissionId,
    ) -> Result<SubmissionJob, StoreError> {
        self.inner
            .lock()
            .submissions
            .get(&submission_key(profile_id, leaderboard_id, submission_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("submission {}", submission_id)))
    }

    async fn create(&self, job: SubmissionJob) -> Result<SubmissionJob, StoreError> {
        let key = submission_key(&job.core.profile_id, &job.leaderboard_id, &job.submission_id);
        let mut inner = self.inner.lock();
        if inner.submissions.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!("submission {}", job.submission_id)));
        }
        inner.submissions.insert(key, job.clone());
        Ok(job)
    }

    async fn update(
        &self,
        profile_id: &ProfileId,
        leaderboard_id: &LeaderboardId,
        submission_id: &SubmissionId,
        update: JobUpdate,
    ) -> Result<SubmissionJob, StoreError> {
        let mut inner = self.inner.lock();
        let job = inner
            .submissions
            .get_mut(&submission_key(profile_id, leaderboard_id, submission_id))
            .ok_or_else(|| StoreError::NotFound(format!("submission {}", submission_id)))?;
        update.apply(&mut job.core);
        Ok(job.clone())
    }

    async fn get_stoppable(
        &self,
        model_id: &ModelId,
        profile_id: &ProfileId,
    ) -> Result<Option<SubmissionJob>, StoreError> {
        Ok(self
            .inner
            .lock()
            .submissions
            .values()
            .find(|job| {
                job.core.model_id == *model_id
                    && job.core.profile_id == *profile_id
                    && !job.core.status.is_terminal()
            })
            .cloned())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load(&self, profile_id: &ProfileId) -> Result<Profile, StoreError> {
        self.inner
            .lock()
            .profiles
            .get(profile_id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", profile_id)))
    }

    async fn create(&self, profile: Profile) -> Result<Profile, StoreError> {
        let key = profile.profile_id.as_str().to_string();
        let mut inner = self.inner.lock();
        if inner.profiles.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!("profile {}", profile.profile_id)));
        }
        inner.profiles.insert(key, profile.clone());
        Ok(profile)
    }

    async fn update(
        &self,
        profile_id: &ProfileId,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError> {
        let mut inner = self.inner.lock();
        let profile = inner
            .profiles
            .get_mut(profile_id.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", profile_id)))?;
        update.apply(profile);
        Ok(profile.clone())
    }

    async fn list(
        &self,
        cursor: Option<String>,
        max_results: usize,
    ) -> Result<Page<Profile>, StoreError> {
        let inner = self.inner.lock();
        let (keys, cursor) = page_keys(&inner.profiles, cursor.as_deref(), max_results, None);
        let items = keys.iter().filter_map(|k| inner.profiles.get(k).cloned()).collect();
        Ok(Page { items, cursor })
    }
}

#[async_trait]
impl AccountUsageStore for MemoryStore {
    async fn get_or_create(&self, period: Period) -> Result<AccountPeriodUsage, StoreError> {
        let mut inner = self.inner.lock();
        Ok(inner
            .account_usage
            .entry(period.to_string())
            .or_insert_with(|| AccountPeriodUsage::empty(period))
            .clone())
    }

    async fn get(&self, period: Period) -> Result<Option<AccountPeriodUsage>, StoreError> {
        Ok(self.inner.lock().account_usage.get(&period.to_string()).cloned())
    }

    async fn update(
        &self,
        period: Period,
        update: AccountUsageUpdate,
    ) -> Result<AccountPeriodUsage, StoreError> {
        let mut inner = self.inner.lock();
        let usage = inner
            .account_usage
            .get_mut(&period.to_string())
            .ok_or_else(|| StoreError::NotFound(format!("account usage {}", period)))?;
        update.apply(usage);
        Ok(usage.clone())
    }
}

#[async_trait]
impl LeaderboardStore for MemoryStore {
    async fn get(
        &self,
        leaderboard_id: &LeaderboardId,
    ) -> Result<Option<Leaderboard>, StoreError> {
        Ok(self.inner.lock().leaderboards.get(leaderboard_id.as_str()).cloned())
    }

    async fn create(&self, leaderboard: Leaderboard) -> Result<Leaderboard, StoreError> {
        let key = leaderboard.leaderboard_id.as_str().to_string();
        let mut inner = self.inner.lock();
        if inner.leaderboards.contains_key(&key) {
            return Err(StoreError::AlreadyExists(format!(
                "leaderboard {}",
                leaderboard.leaderboard_id
            )));
        }
        inner.leaderboards.insert(key, leaderboard.clone());
        Ok(leaderboard)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.lock().leaderboards.len())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
