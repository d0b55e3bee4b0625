// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque reward-function/configuration validator interface.

use async_trait::async_trait;
use pw_core::TrackConfig;
use thiserror::Error;

/// A rejected reward function or configuration. The message is shown to
/// the user as-is.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationFailure(pub String);

/// Pass/fail validation of user-supplied reward logic against a track.
///
/// The engine treats this as a black box: admission proceeds only on `Ok`.
#[async_trait]
pub trait ConfigValidator: Send + Sync {
    async fn validate_reward_function(
        &self,
        reward_function: &str,
        track: &TrackConfig,
    ) -> Result<(), ValidationFailure>;
}
