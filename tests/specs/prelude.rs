// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared world for workspace specs: engine components wired to the
//! in-memory store and fake collaborators.

use pw_adapters::{FakeChannels, FakeExecution, FakeQueue, MemoryObjects, StaticValidator};
use pw_core::{FakeClock, Model, ModelId, ModelStatus, Profile, ProfileId};
use pw_engine::{
    Admission, Dispatcher, JobFinalizer, MetricsAggregator, QuotaHelper, Services, StopCoordinator,
};
use pw_store::{MemoryStore, ModelStore, ProfileStore};
use std::sync::Arc;

pub struct World {
    pub services: Services,
    pub execution: Arc<FakeExecution>,
    pub objects: Arc<MemoryObjects>,
    pub channels: Arc<FakeChannels>,
    pub queue: Arc<FakeQueue>,
    pub clock: Arc<FakeClock>,
    pub admission: Admission,
    pub dispatcher: Dispatcher,
    pub finalizer: JobFinalizer,
    pub stop: StopCoordinator,
    pub metrics: MetricsAggregator,
    pub quota: QuotaHelper,
}

impl World {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let execution = Arc::new(FakeExecution::new());
        let objects = Arc::new(MemoryObjects::new());
        let channels = Arc::new(FakeChannels::new());
        let queue = Arc::new(FakeQueue::new());
        let clock = Arc::new(FakeClock::new());

        let services = Services {
            models: store.clone(),
            trainings: store.clone(),
            evaluations: store.clone(),
            submissions: store.clone(),
            profiles: store.clone(),
            account_usage: store.clone(),
            leaderboards: store.clone(),
            execution: execution.clone(),
            objects: objects.clone(),
            channels: channels.clone(),
            queue: queue.clone(),
            validator: Arc::new(StaticValidator),
            clock: clock.clone(),
        };

        Self {
            admission: Admission::new(services.clone()),
            dispatcher: Dispatcher::new(services.clone()),
            finalizer: JobFinalizer::new(services.clone()),
            stop: StopCoordinator::new(services.clone()),
            metrics: MetricsAggregator::new(services.clone()),
            quota: QuotaHelper::new(services.clone()),
            services,
            execution,
            objects,
            channels,
            queue,
            clock,
        }
    }

    pub async fn seed_profile(&self, profile_id: &str, max_minutes: Option<u32>) -> Profile {
        let mut builder = Profile::builder().profile_id(profile_id);
        if let Some(max) = max_minutes {
            builder = builder.max_total_compute_minutes(max);
        }
        let profile = builder.build();
        self.services.profiles.create(profile.clone()).await.unwrap();
        profile
    }

    pub async fn profile(&self, profile_id: &str) -> Profile {
        self.services.profiles.load(&ProfileId::from(profile_id)).await.unwrap()
    }

    pub async fn model(&self, profile_id: &str, model_id: &ModelId) -> Model {
        self.services.models.load(&ProfileId::from(profile_id), model_id).await.unwrap()
    }

    pub async fn set_model_ready(&self, profile_id: &str, model_id: &ModelId) {
        self.services
            .models
            .update(
                &ProfileId::from(profile_id),
                model_id,
                pw_core::ModelUpdate::status(ModelStatus::Ready),
            )
            .await
            .unwrap();
    }
}
