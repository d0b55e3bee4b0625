// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model records.

use crate::id::{ModelId, ProfileId};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Queued,
    Training,
    Evaluating,
    Stopping,
    Importing,
    Ready,
    Error,
    Deleting,
}

crate::simple_display! {
    ModelStatus {
        Queued => "queued",
        Training => "training",
        Evaluating => "evaluating",
        Stopping => "stopping",
        Importing => "importing",
        Ready => "ready",
        Error => "error",
        Deleting => "deleting",
    }
}

/// Steering/speed ranges the agent may choose from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpace {
    Continuous {
        low_speed: f64,
        high_speed: f64,
        low_steering_angle: f64,
        high_steering_angle: f64,
    },
    Discrete(Vec<DiscreteAction>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteAction {
    pub speed: f64,
    pub steering_angle: f64,
}

/// Reward logic and agent configuration attached to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Reward function source, validated by an external collaborator
    /// before admission.
    pub reward_function: String,
    pub action_space: ActionSpace,
    pub sensors: Vec<String>,
}

/// Object-store locations for a model's inputs and trained output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAssets {
    pub root: String,
    pub metadata: String,
    pub reward_function: String,
    /// Prefix the external executor writes checkpoints and artifacts under.
    pub artifacts: String,
    /// Final trained artifact, set when a training job completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
}

impl ModelAssets {
    pub fn for_model(profile_id: &ProfileId, model_id: &ModelId) -> Self {
        let root = format!("profiles/{}/models/{}", profile_id, model_id);
        Self {
            metadata: format!("{root}/model/model_metadata.json"),
            reward_function: format!("{root}/model/reward_function.py"),
            artifacts: format!("{root}/artifacts/"),
            artifact: None,
            root,
        }
    }
}

/// One user-created artifact under training/evaluation.
///
/// Created at admission, mutated by every job-lifecycle transition,
/// never deleted while a job references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub model_id: ModelId,
    pub profile_id: ProfileId,
    pub name: String,
    pub status: ModelStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_from_model_id: Option<ModelId>,
    pub metadata: ModelMetadata,
    pub assets: ModelAssets,
    pub created_at_ms: u64,
}

/// Partial update applied to a model record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelUpdate {
    pub status: Option<ModelStatus>,
    pub artifact: Option<String>,
}

impl ModelUpdate {
    pub fn status(status: ModelStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn apply(&self, model: &mut Model) {
        if let Some(status) = self.status {
            model.status = status;
        }
        if let Some(artifact) = &self.artifact {
            model.assets.artifact = Some(artifact.clone());
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ModelMetadata {
    /// Minimal metadata for tests.
    pub fn sample() -> Self {
        Self {
            reward_function: "def reward_function(params):\n    return 1.0\n".to_string(),
            action_space: ActionSpace::Continuous {
                low_speed: 0.5,
                high_speed: 4.0,
                low_steering_angle: -30.0,
                high_steering_angle: 30.0,
            },
            sensors: vec!["FRONT_FACING_CAMERA".to_string()],
        }
    }
}

crate::builder! {
    pub struct ModelBuilder => Model {
        into {
            model_id: ModelId = "mdl-test",
            profile_id: ProfileId = "prf-test",
            name: String = "test-model",
        }
        set {
            status: ModelStatus = ModelStatus::Ready,
            metadata: ModelMetadata = ModelMetadata::sample(),
        }
        option {
            cloned_from_model_id: ModelId = None,
        }
        computed {
            assets: ModelAssets = ModelAssets::for_model(
                &ProfileId::from("prf-test"),
                &ModelId::from("mdl-test"),
            ),
            created_at_ms: u64 = 1_000_000,
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
