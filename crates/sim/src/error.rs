use crate::config::ShapingTarget;
use crate::episode::EpisodeState;
use thiserror::Error;

/// Failure reported by, or detected in the output of, an external collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("spatial query failed: {0}")]
    SpatialQuery(String),
    #[error("collision service failed: {0}")]
    CollisionService(String),
    #[error("malformed collaborator data: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("item catalogue is empty")]
    EmptyCatalogue,
    #[error("sensors.ray_count must be at least 1")]
    NoRays,
    #[error("task.max_steps must be at least 1")]
    ZeroMaxSteps,
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("task.preheld_probability must lie in [0, 1], got {0}")]
    Probability(f32),
    #[error("shaping target {0:?} needs a goal zone, but the task has none")]
    ShapingTargetUnavailable(ShapingTarget),
    #[error("configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid action index {index}: action set has {available} actions")]
    InvalidAction { index: usize, available: usize },
    #[error("step called while the episode is {state}")]
    InvalidState { state: EpisodeState },
    #[error("engine fault, episode aborted: {0}")]
    EngineFault(#[from] CollaboratorError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("batch expected {expected} actions, got {got}")]
    BatchSize { expected: usize, got: usize },
}
