// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job records and the job-kind state machine vocabulary.

use crate::id::{EvaluationId, LeaderboardId, ModelId, ProfileId, SubmissionId};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Closed set of job kinds. Adding a kind forces every router match
/// to be revisited (exhaustiveness is compiler-enforced).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Training,
    Evaluation,
    Submission,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Training, JobKind::Evaluation, JobKind::Submission];

    /// Prefix encoded into job names of this kind.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            JobKind::Training => "train",
            JobKind::Evaluation => "eval",
            JobKind::Submission => "race",
        }
    }
}

crate::simple_display! {
    JobKind {
        Training => "training",
        Evaluation => "evaluation",
        Submission => "submission",
    }
}

/// Unique job name: `{kind-prefix}-{suffix}`.
///
/// Doubles as the external-system idempotency key and the dispatch-queue
/// de-duplication key, so it must be stable for the lifetime of the job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(pub SmolStr);

impl JobName {
    /// Training jobs are keyed by their model (one training per model).
    pub fn training(model_id: &ModelId) -> Self {
        Self(SmolStr::new(&format!("{}-{}", JobKind::Training.name_prefix(), model_id.suffix())))
    }

    pub fn evaluation(evaluation_id: &EvaluationId) -> Self {
        Self(SmolStr::new(&format!(
            "{}-{}",
            JobKind::Evaluation.name_prefix(),
            evaluation_id.suffix()
        )))
    }

    pub fn submission(submission_id: &SubmissionId) -> Self {
        Self(SmolStr::new(&format!(
            "{}-{}",
            JobKind::Submission.name_prefix(),
            submission_id.suffix()
        )))
    }

    /// Create a name from an existing string (for parsing/deserialization).
    pub fn from_string(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Job kind encoded in the name prefix. `None` for an unknown prefix,
    /// which callers treat as a programming error, never retried.
    pub fn kind(&self) -> Option<JobKind> {
        let prefix = self.0.split('-').next()?;
        JobKind::ALL.into_iter().find(|kind| kind.name_prefix() == prefix)
    }

    /// Name suffix (after the kind prefix).
    pub fn suffix(&self) -> &str {
        self.0
            .split_once('-')
            .map(|(_, rest)| rest)
            .unwrap_or(&self.0)
    }

    /// Evaluation ID carried in an evaluation job name.
    pub fn evaluation_id(&self) -> Option<EvaluationId> {
        (self.kind()? == JobKind::Evaluation).then(|| EvaluationId::from_suffix(self.suffix()))
    }

    /// Submission ID carried in a submission job name.
    pub fn submission_id(&self) -> Option<SubmissionId> {
        (self.kind()? == JobKind::Submission).then(|| SubmissionId::from_suffix(self.suffix()))
    }
}

impl std::fmt::Display for JobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobName {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

/// Status of one execution attempt.
///
/// Advances monotonically forward except for the stop/cancel exits;
/// a job never re-enters `Queued` after leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Initializing,
    InProgress,
    Stopping,
    Completed,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Canceled)
    }
}

crate::simple_display! {
    JobStatus {
        Queued => "queued",
        Initializing => "initializing",
        InProgress => "in_progress",
        Stopping => "stopping",
        Completed => "completed",
        Failed => "failed",
        Canceled => "canceled",
    }
}

/// Direction the car runs around the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackDirection {
    Clockwise,
    CounterClockwise,
}

/// Track selection for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    pub track_id: String,
    pub direction: TrackDirection,
}

/// Limits that terminate external execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminationConditions {
    pub max_time_in_minutes: u32,
    /// Lap budget for evaluation/submission runs; training has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_laps: Option<u32>,
}

/// Object-store locations for a job's inputs and outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAssets {
    /// Environment manifest consumed by the external executor.
    pub config: String,
    pub metrics: String,
    pub video: String,
    pub trace: String,
    /// Heartbeat marker the simulator refreshes while alive.
    pub heartbeat: String,
}

impl JobAssets {
    /// Derive the canonical locations for a job under its model's prefix.
    pub fn for_job(profile_id: &ProfileId, model_id: &ModelId, name: &JobName) -> Self {
        let kind = name.kind().map(|k| k.name_prefix()).unwrap_or("job");
        let root = format!("profiles/{}/models/{}", profile_id, model_id);
        Self {
            config: format!("{root}/jobs/{kind}/{name}/environment.json"),
            metrics: format!("{root}/metrics/{kind}/{name}.json"),
            video: format!("{root}/videos/{kind}/{name}/"),
            trace: format!("{root}/sim-trace/{kind}/{name}/"),
            heartbeat: format!("{root}/jobs/{kind}/{name}/heartbeat.json"),
        }
    }
}

/// Fields shared by every job kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCore {
    pub name: JobName,
    pub model_id: ModelId,
    pub profile_id: ProfileId,
    pub status: JobStatus,
    pub termination: TerminationConditions,
    pub track: TrackConfig,
    /// Handle returned by the external execution service once submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at_ms: Option<u64>,
    pub assets: JobAssets,
    pub created_at_ms: u64,
}

/// A training run. Keyed by model: at most one per model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingJob {
    #[serde(flatten)]
    pub core: JobCore,
}

/// An evaluation run, keyed by (model, evaluation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationJob {
    #[serde(flatten)]
    pub core: JobCore,
    pub evaluation_id: EvaluationId,
}

/// A race submission, keyed by (profile, leaderboard, submission).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionJob {
    #[serde(flatten)]
    pub core: JobCore,
    pub submission_id: SubmissionId,
    pub leaderboard_id: LeaderboardId,
}

/// One execution attempt of any kind.
///
/// A closed union so kind dispatch is an exhaustive match rather than
/// string sniffing on record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobRecord {
    Training(TrainingJob),
    Evaluation(EvaluationJob),
    Submission(SubmissionJob),
}

impl JobRecord {
    pub fn core(&self) -> &JobCore {
        match self {
            JobRecord::Training(job) => &job.core,
            JobRecord::Evaluation(job) => &job.core,
            JobRecord::Submission(job) => &job.core,
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            JobRecord::Training(_) => JobKind::Training,
            JobRecord::Evaluation(_) => JobKind::Evaluation,
            JobRecord::Submission(_) => JobKind::Submission,
        }
    }

    pub fn name(&self) -> &JobName {
        &self.core().name
    }

    pub fn status(&self) -> JobStatus {
        self.core().status
    }

    pub fn is_training(&self) -> bool {
        matches!(self, JobRecord::Training(_))
    }

    pub fn is_evaluation(&self) -> bool {
        matches!(self, JobRecord::Evaluation(_))
    }

    pub fn is_submission(&self) -> bool {
        matches!(self, JobRecord::Submission(_))
    }

    /// Leaderboard a submission races on; `None` for other kinds.
    pub fn leaderboard_id(&self) -> Option<&LeaderboardId> {
        match self {
            JobRecord::Submission(job) => Some(&job.leaderboard_id),
            _ => None,
        }
    }
}

/// Partial update applied to a job record. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub execution_handle: Option<String>,
    pub started_at_ms: Option<u64>,
    pub ended_at_ms: Option<u64>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn apply(&self, core: &mut JobCore) {
        if let Some(status) = self.status {
            core.status = status;
        }
        if let Some(handle) = &self.execution_handle {
            core.execution_handle = Some(handle.clone());
        }
        if let Some(started) = self.started_at_ms {
            core.started_at_ms = Some(started);
        }
        if let Some(ended) = self.ended_at_ms {
            core.ended_at_ms = Some(ended);
        }
    }
}

crate::builder! {
    pub struct JobCoreBuilder => JobCore {
        into {
            name: JobName = "train-test",
            model_id: ModelId = "mdl-test",
            profile_id: ProfileId = "prf-test",
        }
        set {
            status: JobStatus = JobStatus::Queued,
            termination: TerminationConditions = TerminationConditions {
                max_time_in_minutes: 60,
                max_laps: None,
            },
            track: TrackConfig = TrackConfig {
                track_id: "monza".to_string(),
                direction: TrackDirection::Clockwise,
            },
        }
        option {
            execution_handle: String = None,
            started_at_ms: u64 = None,
            ended_at_ms: u64 = None,
        }
        computed {
            assets: JobAssets = JobAssets::for_job(
                &ProfileId::from("prf-test"),
                &ModelId::from("mdl-test"),
                &JobName::from("train-test"),
            ),
            created_at_ms: u64 = 1_000_000,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
