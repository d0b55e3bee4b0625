// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quota accounting specs

use crate::prelude::World;
use pw_core::{Clock, ModelMetadata, Period, Profile, TrackConfig, TrackDirection};
use pw_engine::{EngineError, TrainingRequest};
use pw_store::{AccountUsageStore, ProfileStore};

fn training_request(profile_id: &str, minutes: u32) -> TrainingRequest {
    TrainingRequest {
        profile_id: profile_id.into(),
        model_name: "fast-lap".to_string(),
        metadata: ModelMetadata::sample(),
        track: TrackConfig {
            track_id: "monza".to_string(),
            direction: TrackDirection::Clockwise,
        },
        max_time_in_minutes: minutes,
        cloned_from_model_id: None,
    }
}

#[tokio::test]
async fn admission_reserves_until_the_limit_then_rejects() {
    let world = World::new();
    world.seed_profile("prf-p1", Some(100)).await;

    // 60 minutes fit within the 100-minute budget
    world.admission.admit_training(training_request("prf-p1", 60)).await.unwrap();
    assert_eq!(world.profile("prf-p1").await.compute_minutes_queued, 60);

    // 60 + 50 + 0 > 100: rejected
    let err = world.admission.admit_training(training_request("prf-p1", 50)).await.unwrap_err();
    assert!(matches!(err, EngineError::QuotaExceeded(_)));
    assert_eq!(world.profile("prf-p1").await.compute_minutes_queued, 60);
}

#[tokio::test]
async fn account_period_usage_tracks_reservations() {
    let world = World::new();
    world.seed_profile("prf-p1", None).await;
    world.seed_profile("prf-p2", None).await;

    world.admission.admit_training(training_request("prf-p1", 40)).await.unwrap();
    world.admission.admit_training(training_request("prf-p2", 25)).await.unwrap();

    let period = Period::from_epoch_ms(world.clock.epoch_ms());
    let account = world.services.account_usage.get(period).await.unwrap().unwrap();
    assert_eq!(account.account_compute_minutes_queued, 65);
}

#[tokio::test]
async fn monthly_reset_spans_pages_and_leaves_queued_minutes() {
    let world = World::new();
    for n in 0..12 {
        let profile = Profile::builder()
            .profile_id(format!("prf-{:02}", n))
            .compute_minutes_queued(7)
            .compute_minutes_used(120)
            .model_count(4)
            .build();
        world.services.profiles.create(profile).await.unwrap();
    }

    // Page size 5 over 12 profiles: three pages
    let processed = world.quota.reset_monthly(Some(5)).await.unwrap();
    assert_eq!(processed, 12);

    for n in 0..12 {
        let profile = world.profile(&format!("prf-{:02}", n)).await;
        assert_eq!(profile.compute_minutes_used, 0);
        assert_eq!(profile.model_count, 0);
        assert_eq!(profile.compute_minutes_queued, 7);
    }
}
