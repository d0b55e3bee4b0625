// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders for the files the external executor and simulator consume.

use pw_core::{ActionSpace, JobKind, JobRecord, Model, Profile, TrackDirection};
use serde_json::json;
use std::collections::BTreeMap;

/// Network architecture baked into every model metadata file.
pub const NEURAL_NETWORK: &str = "DEEP_CONVOLUTIONAL_NETWORK_SHALLOW";
/// Simulator application version the manifest targets.
pub const SIM_APP_VERSION: &str = "5";

/// Environment manifest written to shared storage for the simulator.
pub fn environment_manifest(job: &JobRecord, model: &Model, profile: &Profile) -> String {
    let core = job.core();
    let mut vars = BTreeMap::new();

    vars.insert("JOB_TYPE".to_string(), json!(job.kind().to_string()));
    vars.insert("JOB_NAME".to_string(), json!(core.name.as_str()));
    vars.insert("CHANNEL_NAME".to_string(), json!(core.name.as_str()));
    vars.insert("MODEL_NAME".to_string(), json!(model.name));
    vars.insert("RACER_NAME".to_string(), json!(profile.alias));
    vars.insert("WORLD_NAME".to_string(), json!(core.track.track_id));
    vars.insert(
        "TRACK_DIRECTION_CLOCKWISE".to_string(),
        json!(core.track.direction == TrackDirection::Clockwise),
    );
    vars.insert("METRICS_LOCATION".to_string(), json!(core.assets.metrics));
    vars.insert("TRACE_LOCATION".to_string(), json!(core.assets.trace));
    vars.insert("VIDEO_LOCATION".to_string(), json!(core.assets.video));

    match job.kind() {
        JobKind::Training => {
            vars.insert("METADATA_LOCATION".to_string(), json!(model.assets.metadata));
            vars.insert("REWARD_LOCATION".to_string(), json!(model.assets.reward_function));
            vars.insert("ARTIFACTS_LOCATION".to_string(), json!(model.assets.artifacts));
            vars.insert("CHANGE_START_POSITION".to_string(), json!(true));
        }
        JobKind::Evaluation | JobKind::Submission => {
            vars.insert("MODEL_LOCATION".to_string(), json!(model.assets.artifacts));
            if let Some(max_laps) = core.termination.max_laps {
                vars.insert("NUMBER_OF_TRIALS".to_string(), json!(max_laps));
            }
        }
    }

    serde_json::to_string_pretty(&vars).unwrap_or_default()
}

/// Model metadata file written to shared storage for training jobs.
pub fn model_metadata_file(model: &Model) -> String {
    let (action_space, action_space_type) = match &model.metadata.action_space {
        ActionSpace::Continuous {
            low_speed,
            high_speed,
            low_steering_angle,
            high_steering_angle,
        } => (
            json!({
                "speed": { "high": high_speed, "low": low_speed },
                "steering_angle": { "high": high_steering_angle, "low": low_steering_angle },
            }),
            "continuous",
        ),
        ActionSpace::Discrete(actions) => (
            json!(actions
                .iter()
                .map(|action| json!({
                    "speed": action.speed,
                    "steering_angle": action.steering_angle,
                }))
                .collect::<Vec<_>>()),
            "discrete",
        ),
    };

    let contents = json!({
        "action_space": action_space,
        "action_space_type": action_space_type,
        "neural_network": NEURAL_NETWORK,
        "sensor": model.metadata.sensors,
        "version": SIM_APP_VERSION,
    });

    serde_json::to_string_pretty(&contents).unwrap_or_default()
}

/// Environment handed to the execution service at submit time.
///
/// `clone_source` carries the pre-trained model when this training run
/// clones an existing one.
pub fn execution_environment(
    job: &JobRecord,
    model: &Model,
    clone_source: Option<&Model>,
) -> BTreeMap<String, String> {
    let core = job.core();
    let mut env = BTreeMap::new();

    env.insert("heartbeat_location".to_string(), core.assets.heartbeat.clone());
    env.insert("channel_name".to_string(), core.name.to_string());
    env.insert("manifest_location".to_string(), core.assets.config.clone());
    env.insert("metadata_location".to_string(), model.assets.metadata.clone());
    env.insert("reward_location".to_string(), model.assets.reward_function.clone());
    env.insert("artifacts_location".to_string(), model.assets.artifacts.clone());
    env.insert("world_name".to_string(), core.track.track_id.clone());
    env.insert(
        "track_direction_clockwise".to_string(),
        (core.track.direction == TrackDirection::Clockwise).to_string(),
    );

    if let Some(source) = clone_source {
        env.insert("pretrained_location".to_string(), source.assets.artifacts.clone());
    }

    env
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
