// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake collaborators for tests.
//!
//! Each fake records the calls it receives and lets tests script failures
//! and describe sequences.

use crate::execution::{
    ExecutionError, ExecutionReport, ExecutionRequest, ExecutionService, ExecutionStatus,
};
use crate::object_store::{ObjectStore, ObjectStoreError};
use crate::queue::{DispatchMessage, DispatchQueue, QueueError};
use crate::telemetry::{TelemetryChannels, TelemetryError};
use crate::validator::{ConfigValidator, ValidationFailure};
use async_trait::async_trait;
use parking_lot::Mutex;
use pw_core::{JobName, TrackConfig};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Build a describe report with the given status and no timing data.
pub fn report(status: ExecutionStatus) -> ExecutionReport {
    ExecutionReport { status, reserved_minutes: 0, consumed_minutes: 0, artifact_location: None }
}

#[derive(Default)]
struct FakeExecutionState {
    submitted: Vec<ExecutionRequest>,
    stopped: Vec<JobName>,
    describe_calls: usize,
    /// One-shot describe results consumed in order, per job.
    scripted: HashMap<JobName, VecDeque<Result<ExecutionReport, String>>>,
    /// Fallback report once the script is exhausted, per job.
    steady: HashMap<JobName, ExecutionReport>,
    fail_submit: Option<String>,
}

/// Scriptable in-memory execution service.
#[derive(Default)]
pub struct FakeExecution {
    state: Mutex<FakeExecutionState>,
}

impl FakeExecution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot describe result for `job`.
    pub fn push_describe(&self, job: &JobName, result: Result<ExecutionReport, &str>) {
        self.state
            .lock()
            .scripted
            .entry(job.clone())
            .or_default()
            .push_back(result.map_err(str::to_string));
    }

    /// Set the report returned once any scripted results are exhausted.
    pub fn set_report(&self, job: &JobName, report: ExecutionReport) {
        self.state.lock().steady.insert(job.clone(), report);
    }

    /// Make the next `submit` call fail with the given message.
    pub fn fail_submit(&self, message: &str) {
        self.state.lock().fail_submit = Some(message.to_string());
    }

    pub fn submitted(&self) -> Vec<ExecutionRequest> {
        self.state.lock().submitted.clone()
    }

    pub fn stopped(&self) -> Vec<JobName> {
        self.state.lock().stopped.clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.state.lock().describe_calls
    }
}

#[async_trait]
impl ExecutionService for FakeExecution {
    async fn submit(&self, request: ExecutionRequest) -> Result<String, ExecutionError> {
        let mut state = self.state.lock();
        if let Some(message) = state.fail_submit.take() {
            return Err(ExecutionError::Service(message));
        }
        let handle = format!("exec-{}", request.job_name);
        state.submitted.push(request);
        Ok(handle)
    }

    async fn describe(&self, job_name: &JobName) -> Result<ExecutionReport, ExecutionError> {
        let mut state = self.state.lock();
        state.describe_calls += 1;
        if let Some(queue) = state.scripted.get_mut(job_name) {
            if let Some(result) = queue.pop_front() {
                return result.map_err(ExecutionError::Service);
            }
        }
        state
            .steady
            .get(job_name)
            .cloned()
            .ok_or_else(|| ExecutionError::NotFound(job_name.to_string()))
    }

    async fn stop(&self, job_name: &JobName) -> Result<(), ExecutionError> {
        self.state.lock().stopped.push(job_name.clone());
        Ok(())
    }
}

#[derive(Default)]
struct MemoryObjectsState {
    objects: BTreeMap<String, String>,
    deleted: Vec<String>,
    fail_writes: bool,
    fail_deletes: bool,
}

/// In-memory object store.
#[derive(Default)]
pub struct MemoryObjects {
    state: Mutex<MemoryObjectsState>,
}

impl MemoryObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location: &str) -> Option<String> {
        self.state.lock().objects.get(location).cloned()
    }

    pub fn locations(&self) -> Vec<String> {
        self.state.lock().objects.keys().cloned().collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().deleted.clone()
    }

    pub fn fail_writes(&self) {
        self.state.lock().fail_writes = true;
    }

    pub fn fail_deletes(&self) {
        self.state.lock().fail_deletes = true;
    }
}

#[async_trait]
impl ObjectStore for MemoryObjects {
    async fn write(&self, location: &str, content: &str) -> Result<(), ObjectStoreError> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(ObjectStoreError::Backend("write refused".to_string()));
        }
        state.objects.insert(location.to_string(), content.to_string());
        Ok(())
    }

    async fn delete(&self, location: &str) -> Result<(), ObjectStoreError> {
        let mut state = self.state.lock();
        if state.fail_deletes {
            return Err(ObjectStoreError::Backend("delete refused".to_string()));
        }
        state.objects.retain(|key, _| !key.starts_with(location));
        state.deleted.push(location.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct FakeChannelsState {
    created: Vec<JobName>,
    deleted: Vec<String>,
    fail_create: bool,
}

/// In-memory telemetry channel provisioner.
#[derive(Default)]
pub struct FakeChannels {
    state: Mutex<FakeChannelsState>,
}

impl FakeChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<JobName> {
        self.state.lock().created.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().deleted.clone()
    }

    pub fn fail_create(&self) {
        self.state.lock().fail_create = true;
    }
}

#[async_trait]
impl TelemetryChannels for FakeChannels {
    async fn create_channel(&self, name: &JobName) -> Result<String, TelemetryError> {
        let mut state = self.state.lock();
        if state.fail_create {
            return Err(TelemetryError::Service("channel provisioning refused".to_string()));
        }
        state.created.push(name.clone());
        Ok(format!("chan-{}", name))
    }

    async fn delete_channel(&self, handle: &str) -> Result<(), TelemetryError> {
        self.state.lock().deleted.push(handle.to_string());
        Ok(())
    }
}

/// Queue fake that records sent messages.
#[derive(Default)]
pub struct FakeQueue {
    sent: Mutex<Vec<DispatchMessage>>,
}

impl FakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<DispatchMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl DispatchQueue for FakeQueue {
    async fn send(&self, message: DispatchMessage) -> Result<(), QueueError> {
        self.sent.lock().push(message);
        Ok(())
    }
}

/// Validator that approves everything.
#[derive(Default)]
pub struct StaticValidator;

#[async_trait]
impl ConfigValidator for StaticValidator {
    async fn validate_reward_function(
        &self,
        _reward_function: &str,
        _track: &TrackConfig,
    ) -> Result<(), ValidationFailure> {
        Ok(())
    }
}

/// Validator that rejects everything with a fixed message.
pub struct RejectingValidator(pub String);

#[async_trait]
impl ConfigValidator for RejectingValidator {
    async fn validate_reward_function(
        &self,
        _reward_function: &str,
        _track: &TrackConfig,
    ) -> Result<(), ValidationFailure> {
        Err(ValidationFailure(self.0.clone()))
    }
}
