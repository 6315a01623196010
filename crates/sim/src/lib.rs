#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]
//! # Courier Simulation Core
//!
//! An episodic, single-agent task engine for reinforcement learning. An agent
//! on a flat floor perceives its surroundings through a fan of distance rays,
//! moves with discrete actions, and is rewarded for finding a demanded item
//! and carrying it to a goal zone.
//!
//! The crate owns the task logic only. Geometry lives behind two collaborator
//! traits so that the same engine can run against a lightweight kinematic
//! arena, a full physics engine, or a scripted test double.
//!
//! ## Key Components
//!
//! -   **World:** [`WorldState`] places entities from a per-episode seed and
//!     tracks which item is demanded and which is held.
//! -   **Perception:** [`PerceptionEngine`] casts the ray fan through a
//!     [`SpatialQuery`] and encodes a fixed-shape [`Observation`].
//! -   **Motion:** [`MotionIntegrator`] proposes one fixed tick of movement and
//!     lets a [`CollisionService`] resolve it.
//! -   **Reward:** [`RewardModel`] combines step cost, event rewards, the
//!     timeout penalty and optional potential-based shaping.
//! -   **Control:** [`EpisodeController`] runs the episode state machine and
//!     implements [`Env`]; [`EpisodeBatch`] steps many of them in lockstep.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sim::{EngineConfig, EpisodeController};
//!
//! let mut env = EpisodeController::new(EngineConfig::warehouse(), physics)?;
//! let mut obs = env.reset(42)?;
//! loop {
//!     let outcome = env.step(policy(&obs))?;
//!     obs = outcome.observation;
//!     if outcome.done {
//!         break;
//!     }
//! }
//! ```

pub mod action;
pub mod batch;
pub mod collaborator;
pub mod config;
pub mod env;
pub mod episode;
pub mod error;
pub mod motion;
pub mod perception;
pub mod reward;
pub mod types;
pub mod world;

pub use action::{Action, ActionInterpreter, ActionSet, Command, MotionCommand, SideEffect};
pub use batch::{BatchStep, EpisodeBatch, SEED_STRIDE};
pub use collaborator::{
    CollisionObserver, CollisionService, ContactObserver, CosmeticEvent, CosmeticSink, Physics,
    RayHit, Scene, SpatialQuery, TriggerObserver,
};
pub use config::{
    EngineConfig, ItemSpec, MissPolicy, MotionConfig, RewardTable, SensorConfig, ShapingConfig,
    ShapingTarget, SpawnConfig, TaskConfig, TaskKind,
};
pub use env::Env;
pub use episode::{Episode, EpisodeController, EpisodeState, StepOutcome};
pub use error::{CollaboratorError, ConfigError, EngineError};
pub use motion::MotionIntegrator;
pub use perception::{LabelSet, Observation, ObservationLayout, PerceptionEngine, RaycastResult};
pub use reward::{RewardBreakdown, RewardModel};
pub use types::{
    heading_vector, normalize_heading, BodyPose, ContactKind, Entity, ItemId, Pose, Tag,
    TerminationCause, WorldEvent,
};
pub use world::{AgentState, WorldState};
