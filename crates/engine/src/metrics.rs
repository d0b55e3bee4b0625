// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metrics aggregator: system-, profile-, and model-scoped counts.

use crate::error::EngineError;
use crate::Services;
use futures_util::future::join_all;
use pw_core::{ModelId, ProfileId};
use pw_store::{
    EvaluationStore, LeaderboardStore, ModelStore, ProfileStore, TrainingStore, DEFAULT_PAGE_SIZE,
};

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Concurrent per-model count reads per chunk.
    pub fan_out: usize,
    /// Records fetched per page while walking profiles and models.
    pub page_size: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { fan_out: 10, page_size: DEFAULT_PAGE_SIZE }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemMetrics {
    pub profile_count: u64,
    pub model_count: u64,
    pub training_job_count: u64,
    pub evaluation_job_count: u64,
    pub leaderboard_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetrics {
    pub model_id: ModelId,
    pub training_job_count: u64,
    pub evaluation_job_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileMetrics {
    pub profile_id: ProfileId,
    pub model_count: u64,
    pub training_job_count: u64,
    pub evaluation_job_count: u64,
}

/// Walks profiles and their models page by page, counting jobs with a
/// bounded fan-out so the record store is never hit with more than
/// `fan_out` concurrent reads.
#[derive(Clone)]
pub struct MetricsAggregator {
    services: Services,
    config: MetricsConfig,
}

impl MetricsAggregator {
    pub fn new(services: Services) -> Self {
        Self::with_config(services, MetricsConfig::default())
    }

    pub fn with_config(services: Services, config: MetricsConfig) -> Self {
        Self { services, config }
    }

    /// Whole-system counts in a single pass over profiles and models.
    pub async fn system_metrics(&self) -> Result<SystemMetrics, EngineError> {
        let mut totals = SystemMetrics::default();
        let mut profile_cursor: Option<String> = None;

        loop {
            let profile_page =
                self.services.profiles.list(profile_cursor.take(), self.config.page_size).await?;
            totals.profile_count += profile_page.items.len() as u64;

            for profile in &profile_page.items {
                let (models, trainings, evaluations) =
                    self.count_profile_models(&profile.profile_id).await?;
                totals.model_count += models;
                totals.training_job_count += trainings;
                totals.evaluation_job_count += evaluations;
            }

            match profile_page.cursor {
                Some(next) => profile_cursor = Some(next),
                None => break,
            }
        }

        // Leaderboards are not tied to profiles or models.
        totals.leaderboard_count = self.services.leaderboards.count().await? as u64;
        Ok(totals)
    }

    /// Counts for a single model.
    pub async fn model_metrics(&self, model_id: &ModelId) -> Result<ModelMetrics, EngineError> {
        let (training_job_count, evaluation_job_count) = tokio::try_join!(
            self.services.trainings.count_for_model(model_id),
            self.services.evaluations.count_for_model(model_id),
        )?;
        Ok(ModelMetrics {
            model_id: model_id.clone(),
            training_job_count: training_job_count as u64,
            evaluation_job_count: evaluation_job_count as u64,
        })
    }

    /// Counts aggregated over one profile's models.
    pub async fn profile_metrics(
        &self,
        profile_id: &ProfileId,
    ) -> Result<ProfileMetrics, EngineError> {
        let (model_count, training_job_count, evaluation_job_count) =
            self.count_profile_models(profile_id).await?;
        Ok(ProfileMetrics {
            profile_id: profile_id.clone(),
            model_count,
            training_job_count,
            evaluation_job_count,
        })
    }

    /// Walk one profile's models, counting jobs chunk by chunk.
    async fn count_profile_models(
        &self,
        profile_id: &ProfileId,
    ) -> Result<(u64, u64, u64), EngineError> {
        let mut model_count = 0u64;
        let mut training_count = 0u64;
        let mut evaluation_count = 0u64;
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .services
                .models
                .list_ids_for_profile(profile_id, cursor.take(), self.config.page_size)
                .await?;
            model_count += page.items.len() as u64;

            for chunk in page.items.chunks(self.config.fan_out) {
                let results = join_all(chunk.iter().map(|model_id| async move {
                    tokio::try_join!(
                        self.services.trainings.count_for_model(model_id),
                        self.services.evaluations.count_for_model(model_id),
                    )
                }))
                .await;
                for result in results {
                    let (trainings, evaluations) = result?;
                    training_count += trainings as u64;
                    evaluation_count += evaluations as u64;
                }
            }

            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok((model_count, training_count, evaluation_count))
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
