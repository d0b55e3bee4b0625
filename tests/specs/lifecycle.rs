// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle specs
//!
//! Admission through dispatch, initialization, stop and finalization.

use crate::prelude::World;
use pw_adapters::{ExecutionReport, ExecutionStatus};
use pw_core::{JobStatus, JobUpdate, ModelMetadata, ModelStatus, TrackConfig, TrackDirection};
use pw_engine::{EngineError, EvaluationRequest, TrainingRequest};
use pw_store::{EvaluationStore, TrainingStore};

fn track() -> TrackConfig {
    TrackConfig { track_id: "monza".to_string(), direction: TrackDirection::CounterClockwise }
}

fn training_request(profile_id: &str, minutes: u32) -> TrainingRequest {
    TrainingRequest {
        profile_id: profile_id.into(),
        model_name: "fast-lap".to_string(),
        metadata: ModelMetadata::sample(),
        track: track(),
        max_time_in_minutes: minutes,
        cloned_from_model_id: None,
    }
}

#[tokio::test]
async fn training_runs_from_admission_to_completion() {
    let world = World::new();
    world.seed_profile("prf-p1", Some(100)).await;

    // Admission creates the records, reserves quota and enqueues
    let model_id = world.admission.admit_training(training_request("prf-p1", 60)).await.unwrap();
    assert_eq!(world.model("prf-p1", &model_id).await.status, ModelStatus::Queued);
    assert_eq!(world.profile("prf-p1").await.compute_minutes_queued, 60);

    let messages = world.queue.sent();
    assert_eq!(messages.len(), 1);

    // The dispatcher hands the message to the initializer
    let ctx = world.dispatcher.dispatch(messages[0].clone()).await.unwrap().unwrap();
    assert!(ctx.error.is_none(), "initialization failed: {:?}", ctx.error);

    let job = world.services.trainings.load(&model_id).await.unwrap();
    assert_eq!(job.core.status, JobStatus::Initializing);
    assert!(job.core.execution_handle.is_some());
    assert_eq!(world.model("prf-p1", &model_id).await.status, ModelStatus::Training);
    assert_eq!(world.channels.created(), vec![job.core.name.clone()]);
    assert!(world.objects.get(&job.core.assets.config).is_some());

    // Execution finishes externally; finalize reconciles
    world.execution.set_report(
        &job.core.name,
        ExecutionReport {
            status: ExecutionStatus::Completed,
            reserved_minutes: 60,
            consumed_minutes: 57,
            artifact_location: Some("artifacts/final.tar.gz".to_string()),
        },
    );
    let ctx = world.finalizer.run(ctx).await;
    assert!(ctx.error.is_none(), "finalization failed: {:?}", ctx.error);

    let job = world.services.trainings.load(&model_id).await.unwrap();
    assert_eq!(job.core.status, JobStatus::Completed);
    assert!(job.core.ended_at_ms.is_some());

    let model = world.model("prf-p1", &model_id).await;
    assert_eq!(model.status, ModelStatus::Ready);
    assert_eq!(model.assets.artifact.as_deref(), Some("artifacts/final.tar.gz"));

    let profile = world.profile("prf-p1").await;
    assert_eq!(profile.compute_minutes_queued, 0);
    assert_eq!(profile.compute_minutes_used, 57);

    // The telemetry channel was torn down again
    assert_eq!(world.channels.deleted().len(), 1);
}

#[tokio::test]
async fn failed_external_submit_ends_in_failed_job_and_error_model() {
    let world = World::new();
    world.seed_profile("prf-p1", None).await;

    let model_id = world.admission.admit_training(training_request("prf-p1", 60)).await.unwrap();
    world.execution.fail_submit("service unavailable");

    let message = world.queue.sent().remove(0);
    let ctx = world.dispatcher.dispatch(message).await.unwrap().unwrap();

    assert!(ctx.error.as_deref().unwrap_or_default().contains("service unavailable"));
    let job = world.services.trainings.load(&model_id).await.unwrap();
    assert_eq!(job.core.status, JobStatus::Failed);
    assert_eq!(world.model("prf-p1", &model_id).await.status, ModelStatus::Error);
}

#[tokio::test]
async fn stop_during_initialization_is_rejected() {
    let world = World::new();
    world.seed_profile("prf-p1", None).await;

    let model_id = world.admission.admit_training(training_request("prf-p1", 60)).await.unwrap();
    let message = world.queue.sent().remove(0);
    world.dispatcher.dispatch(message).await.unwrap().unwrap();

    // Model is TRAINING, job is INITIALIZING: not stoppable yet
    let err = world.stop.stop_model(&"prf-p1".into(), &model_id).await.unwrap_err();
    assert!(matches!(err, EngineError::StateConflict(_)));
}

#[tokio::test]
async fn in_progress_evaluation_stops_then_finalizes() {
    let world = World::new();
    world.seed_profile("prf-p1", None).await;
    let model_id = world.admission.admit_training(training_request("prf-p1", 30)).await.unwrap();
    world.set_model_ready("prf-p1", &model_id).await;

    let evaluation_id = world
        .admission
        .admit_evaluation(EvaluationRequest {
            profile_id: "prf-p1".into(),
            model_id: model_id.clone(),
            track: track(),
            max_time_in_minutes: 20,
            max_laps: 3,
        })
        .await
        .unwrap();

    // Skip ahead: the evaluation is running externally
    let message = world.queue.sent().last().cloned().unwrap();
    let ctx = world.dispatcher.dispatch(message).await.unwrap().unwrap();
    assert!(ctx.error.is_none());
    world
        .services
        .evaluations
        .update(&model_id, &evaluation_id, JobUpdate::status(JobStatus::InProgress))
        .await
        .unwrap();
    let job = world.services.evaluations.load(&model_id, &evaluation_id).await.unwrap();
    world.execution.set_report(
        &job.core.name,
        ExecutionReport {
            status: ExecutionStatus::InProgress,
            reserved_minutes: 20,
            consumed_minutes: 4,
            artifact_location: None,
        },
    );

    // Stop: both records move to STOPPING, one stop call goes out
    world.stop.stop_model(&"prf-p1".into(), &model_id).await.unwrap();
    let job = world.services.evaluations.load(&model_id, &evaluation_id).await.unwrap();
    assert_eq!(job.core.status, JobStatus::Stopping);
    assert_eq!(world.model("prf-p1", &model_id).await.status, ModelStatus::Stopping);
    assert_eq!(world.execution.stopped(), vec![job.core.name.clone()]);

    // The finalize path sets the terminal statuses
    world.execution.set_report(
        &job.core.name,
        ExecutionReport {
            status: ExecutionStatus::Stopped,
            reserved_minutes: 20,
            consumed_minutes: 6,
            artifact_location: None,
        },
    );
    let ctx = world.finalizer.run(ctx).await;
    assert!(ctx.error.is_none());

    let job = world.services.evaluations.load(&model_id, &evaluation_id).await.unwrap();
    assert_eq!(job.core.status, JobStatus::Completed);
    assert_eq!(world.model("prf-p1", &model_id).await.status, ModelStatus::Ready);
    assert_eq!(world.profile("prf-p1").await.compute_minutes_used, 6);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_queued_discards_later_dispatch() {
    let world = World::new();
    world.seed_profile("prf-p1", None).await;
    let model_id = world.admission.admit_training(training_request("prf-p1", 60)).await.unwrap();
    let job = world.services.trainings.load(&model_id).await.unwrap();

    // The executor sees the job two polls in, still pending, then running
    world.execution.push_describe(&job.core.name, Err("not visible"));
    world.execution.push_describe(&job.core.name, Err("not visible"));
    world.execution.set_report(
        &job.core.name,
        pw_adapters::fake::report(ExecutionStatus::InProgress),
    );

    world.stop.stop_model(&"prf-p1".into(), &model_id).await.unwrap();

    let job = world.services.trainings.load(&model_id).await.unwrap();
    assert_eq!(job.core.status, JobStatus::Canceled);
    assert_eq!(world.model("prf-p1", &model_id).await.status, ModelStatus::Error);
    assert_eq!(world.execution.stopped().len(), 1);

    // The queued dispatch message is now a no-op
    let message = world.queue.sent().remove(0);
    let outcome = world.dispatcher.dispatch(message).await.unwrap();
    assert!(outcome.is_none());
    assert!(world.execution.submitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_while_queued_times_out_when_job_never_appears() {
    let world = World::new();
    world.seed_profile("prf-p1", None).await;
    let model_id = world.admission.admit_training(training_request("prf-p1", 60)).await.unwrap();

    let err = world.stop.stop_model(&"prf-p1".into(), &model_id).await.unwrap_err();
    assert!(matches!(err, EngineError::CancelTimeout));
    assert_eq!(
        err.to_string(),
        "failed to cancel job, contact an administrator"
    );

    // The job is still queued; nothing was stopped
    let job = world.services.trainings.load(&model_id).await.unwrap();
    assert_eq!(job.core.status, JobStatus::Queued);
    assert!(world.execution.stopped().is_empty());
}
