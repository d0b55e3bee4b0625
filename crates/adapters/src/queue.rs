// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch queue interface.

use async_trait::async_trait;
use pw_core::{JobName, LeaderboardId, ModelId, ProfileId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue error: {0}")]
    Send(String),
}

/// The message admission produces and the dispatcher consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMessage {
    pub job_name: JobName,
    pub model_id: ModelId,
    pub profile_id: ProfileId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaderboard_id: Option<LeaderboardId>,
}

/// Queue producer surface.
///
/// Implementations must use `message.job_name` as the de-duplication key
/// so repeated admission attempts for the same job do not double-dispatch.
#[async_trait]
pub trait DispatchQueue: Send + Sync {
    async fn send(&self, message: DispatchMessage) -> Result<(), QueueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_wire_shape_is_camel_case() {
        let message = DispatchMessage {
            job_name: JobName::from("train-m1"),
            model_id: ModelId::from("mdl-m1"),
            profile_id: ProfileId::from("prf-p1"),
            leaderboard_id: None,
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["jobName"], "train-m1");
        assert_eq!(json["modelId"], "mdl-m1");
        assert_eq!(json["profileId"], "prf-p1");
        assert!(json.get("leaderboardId").is_none());
    }

    #[test]
    fn message_round_trips_with_leaderboard() {
        let message = DispatchMessage {
            job_name: JobName::from("race-s1"),
            model_id: ModelId::from("mdl-m1"),
            profile_id: ProfileId::from("prf-p1"),
            leaderboard_id: Some(LeaderboardId::from("ldb-l1")),
        };
        let json = serde_json::to_string(&message).unwrap();
        let parsed: DispatchMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, message);
    }
}
