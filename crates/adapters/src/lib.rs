// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw-adapters: interfaces to the orchestrator's external collaborators.
//!
//! Each trait is the narrow surface the engine consumes: the external
//! execution service, the shared object store, the telemetry channel
//! provisioner, the dispatch queue, and the opaque configuration validator.
//! Fake implementations live behind the `test-support` feature.

pub mod execution;
pub mod object_store;
pub mod queue;
pub mod telemetry;
pub mod validator;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use execution::{ExecutionError, ExecutionReport, ExecutionRequest, ExecutionService, ExecutionStatus};
pub use object_store::{ObjectStore, ObjectStoreError};
pub use queue::{DispatchMessage, DispatchQueue, QueueError};
pub use telemetry::{TelemetryChannels, TelemetryError};
pub use validator::{ConfigValidator, ValidationFailure};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{
    FakeChannels, FakeExecution, FakeQueue, MemoryObjects, RejectingValidator, StaticValidator,
};
