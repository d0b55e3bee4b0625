// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::TestHarness;
use pw_core::{JobStatus, JobUpdate, LeaderboardId};

fn locator(job_name: &str, model_id: &str, profile_id: &str) -> JobLocator {
    JobLocator {
        job_name: JobName::from(job_name),
        model_id: ModelId::from(model_id),
        profile_id: ProfileId::from(profile_id),
        leaderboard_id: None,
    }
}

#[tokio::test]
async fn routes_training_by_model() {
    let harness = TestHarness::new();
    let job = harness.seed_training("prf-p1", "mdl-m1", JobStatus::Queued).await;
    let router = JobRouter::new(harness.services.clone());

    let record =
        router.get(&locator(job.core.name.as_str(), "mdl-m1", "prf-p1")).await.unwrap();
    assert!(record.is_training());
    assert_eq!(record.status(), JobStatus::Queued);
}

#[tokio::test]
async fn routes_evaluation_by_name_suffix() {
    let harness = TestHarness::new();
    let job = harness.seed_evaluation("prf-p1", "mdl-m1", "evl-e1", JobStatus::Queued).await;
    let router = JobRouter::new(harness.services.clone());

    let record =
        router.get(&locator(job.core.name.as_str(), "mdl-m1", "prf-p1")).await.unwrap();
    assert!(record.is_evaluation());
}

#[tokio::test]
async fn routes_submission_through_leaderboard() {
    let harness = TestHarness::new();
    let job = harness
        .seed_submission("prf-p1", "mdl-m1", "ldb-l1", "sub-s1", JobStatus::Queued)
        .await;
    let router = JobRouter::new(harness.services.clone());

    let mut loc = locator(job.core.name.as_str(), "mdl-m1", "prf-p1");
    loc.leaderboard_id = Some(LeaderboardId::from("ldb-l1"));

    let record = router.get(&loc).await.unwrap();
    assert!(record.is_submission());

    // A submission locator without its leaderboard is an internal fault
    loc.leaderboard_id = None;
    assert!(matches!(router.get(&loc).await, Err(EngineError::Internal)));
}

#[tokio::test]
async fn unknown_prefix_is_internal_error() {
    let harness = TestHarness::new();
    let router = JobRouter::new(harness.services.clone());

    let result = router.get(&locator("mystery-x", "mdl-m1", "prf-p1")).await;
    assert!(matches!(result, Err(EngineError::Internal)));
}

#[tokio::test]
async fn update_dispatches_to_matching_store() {
    let harness = TestHarness::new();
    let job = harness.seed_evaluation("prf-p1", "mdl-m1", "evl-e1", JobStatus::Queued).await;
    let router = JobRouter::new(harness.services.clone());

    let record = router
        .update(
            &locator(job.core.name.as_str(), "mdl-m1", "prf-p1"),
            JobUpdate::status(JobStatus::Canceled),
        )
        .await
        .unwrap();
    assert_eq!(record.status(), JobStatus::Canceled);

    let reloaded = harness
        .services
        .evaluations
        .load(&ModelId::from("mdl-m1"), &job.evaluation_id)
        .await
        .unwrap();
    assert_eq!(reloaded.core.status, JobStatus::Canceled);
}
