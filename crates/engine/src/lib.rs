// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-engine: the job lifecycle orchestrator and quota-accounting engine.
//!
//! Each inbound unit of work (an admission request, a dispatch-queue
//! message, a stop request, a metrics request) is handled by a stateless
//! invocation against the shared record stores; concurrency across jobs
//! comes from the surrounding queue infrastructure, not from this crate.

pub mod admission;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod finalizer;
pub mod initializer;
pub mod manifest;
pub mod metrics;
pub mod quota;
pub mod router;
pub mod stop;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use admission::{
    Admission, EvaluationRequest, SubmissionRequest, TrainingRequest,
};
pub use context::{ExecutionState, WorkflowContext};
pub use dispatch::Dispatcher;
pub use error::EngineError;
pub use finalizer::JobFinalizer;
pub use initializer::JobInitializer;
pub use metrics::{MetricsAggregator, MetricsConfig, ModelMetrics, ProfileMetrics, SystemMetrics};
pub use quota::{QuotaConfig, QuotaHelper};
pub use router::{JobLocator, JobRouter};
pub use stop::{StopConfig, StopCoordinator};

use pw_adapters::{ConfigValidator, DispatchQueue, ExecutionService, ObjectStore, TelemetryChannels};
use pw_core::Clock;
use pw_store::{
    AccountUsageStore, EvaluationStore, LeaderboardStore, ModelStore, ProfileStore,
    SubmissionStore, TrainingStore,
};
use std::sync::Arc;

/// Shared handles to every record store and external collaborator.
///
/// Record ownership follows the shared-resource policy: any component may
/// read any record, but only the initializer, finalizer and stop
/// coordinator write job/model status, and only the quota helper writes
/// quota counters.
#[derive(Clone)]
pub struct Services {
    pub models: Arc<dyn ModelStore>,
    pub trainings: Arc<dyn TrainingStore>,
    pub evaluations: Arc<dyn EvaluationStore>,
    pub submissions: Arc<dyn SubmissionStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub account_usage: Arc<dyn AccountUsageStore>,
    pub leaderboards: Arc<dyn LeaderboardStore>,
    pub execution: Arc<dyn ExecutionService>,
    pub objects: Arc<dyn ObjectStore>,
    pub channels: Arc<dyn TelemetryChannels>,
    pub queue: Arc<dyn DispatchQueue>,
    pub validator: Arc<dyn ConfigValidator>,
    pub clock: Arc<dyn Clock>,
}
