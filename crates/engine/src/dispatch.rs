// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch-queue consumer.

use crate::context::WorkflowContext;
use crate::error::EngineError;
use crate::initializer::JobInitializer;
use crate::router::{JobLocator, JobRouter};
use crate::Services;
use pw_adapters::DispatchMessage;
use pw_core::JobStatus;

/// Processes one dispatch-queue message.
///
/// Errors propagate to the caller so the surrounding queue returns the
/// message for reprocessing.
#[derive(Clone)]
pub struct Dispatcher {
    router: JobRouter,
    initializer: JobInitializer,
}

impl Dispatcher {
    pub fn new(services: Services) -> Self {
        Self {
            router: JobRouter::new(services.clone()),
            initializer: JobInitializer::new(services),
        }
    }

    /// Hand the message to the initializer, unless the job was canceled
    /// while still queued — a canceled job never reaches the external
    /// system, so the message is discarded. Returns `None` for a
    /// discarded message.
    pub async fn dispatch(
        &self,
        message: DispatchMessage,
    ) -> Result<Option<WorkflowContext>, EngineError> {
        let ctx = WorkflowContext::from(message);
        let locator = JobLocator::from(&ctx);

        let job = self.router.get(&locator).await?;
        if job.status() == JobStatus::Canceled {
            tracing::info!(
                job = %ctx.job_name,
                "job canceled prior to initialization, discarding dispatch message"
            );
            return Ok(None);
        }

        Ok(Some(self.initializer.run(ctx).await))
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
