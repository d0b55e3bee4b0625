// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metrics aggregation specs

use crate::prelude::World;
use pw_adapters::{ExecutionReport, ExecutionStatus};
use pw_core::{Clock, ModelMetadata, ProfileId, TrackConfig, TrackDirection};
use pw_engine::{EvaluationRequest, MetricsAggregator, MetricsConfig, TrainingRequest};
use pw_store::{LeaderboardStore, TrainingStore};

fn track() -> TrackConfig {
    TrackConfig { track_id: "monza".to_string(), direction: TrackDirection::Clockwise }
}

/// Drive `models_each` models per profile through admission, dispatch and
/// finalize, then run one evaluation per model.
async fn seed_completed_fleet(world: &World, profiles: u32, models_each: u32) {
    for p in 0..profiles {
        let profile_id = format!("prf-{:03}", p);
        world.seed_profile(&profile_id, None).await;
        for _ in 0..models_each {
            let model_id = world
                .admission
                .admit_training(TrainingRequest {
                    profile_id: profile_id.as_str().into(),
                    model_name: "fast-lap".to_string(),
                    metadata: ModelMetadata::sample(),
                    track: track(),
                    max_time_in_minutes: 30,
                    cloned_from_model_id: None,
                })
                .await
                .unwrap();

            let message = world.queue.sent().last().cloned().unwrap();
            let ctx = world.dispatcher.dispatch(message).await.unwrap().unwrap();
            let job = world.services.trainings.load(&model_id).await.unwrap();
            world.execution.set_report(
                &job.core.name,
                ExecutionReport {
                    status: ExecutionStatus::Completed,
                    reserved_minutes: 30,
                    consumed_minutes: 30,
                    artifact_location: Some("artifacts/final.tar.gz".to_string()),
                },
            );
            world.finalizer.run(ctx).await;

            world
                .admission
                .admit_evaluation(EvaluationRequest {
                    profile_id: profile_id.as_str().into(),
                    model_id,
                    track: track(),
                    max_time_in_minutes: 10,
                    max_laps: 3,
                })
                .await
                .unwrap();
        }
    }
}

#[tokio::test]
async fn system_counts_match_a_driven_fleet() {
    let world = World::new();
    seed_completed_fleet(&world, 2, 3).await;
    world.services.leaderboards.create(pw_core::Leaderboard {
        leaderboard_id: "ldb-l1".into(),
        name: "summer cup".to_string(),
        created_at_ms: world.clock.epoch_ms(),
    })
    .await
    .unwrap();

    let metrics = world.metrics.system_metrics().await.unwrap();
    assert_eq!(metrics.profile_count, 2);
    assert_eq!(metrics.model_count, 6);
    assert_eq!(metrics.training_job_count, 6);
    assert_eq!(metrics.evaluation_job_count, 6);
    assert_eq!(metrics.leaderboard_count, 1);
}

#[tokio::test]
async fn paginated_system_count_equals_sum_of_profiles() {
    let world = World::new();
    seed_completed_fleet(&world, 3, 4).await;

    // Page size 2 forces pagination on both the profile and model axes
    let aggregator = MetricsAggregator::with_config(
        world.services.clone(),
        MetricsConfig { fan_out: 2, page_size: 2 },
    );

    let system = aggregator.system_metrics().await.unwrap();
    assert_eq!(system.profile_count, 3);
    assert_eq!(system.model_count, 12);

    let mut models = 0;
    let mut trainings = 0;
    let mut evaluations = 0;
    for p in 0..3 {
        let profile = aggregator
            .profile_metrics(&ProfileId::from(format!("prf-{:03}", p)))
            .await
            .unwrap();
        models += profile.model_count;
        trainings += profile.training_job_count;
        evaluations += profile.evaluation_job_count;
    }

    assert_eq!(system.model_count, models);
    assert_eq!(system.training_job_count, trainings);
    assert_eq!(system.evaluation_job_count, evaluations);
}
