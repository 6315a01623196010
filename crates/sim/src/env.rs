use crate::collaborator::Physics;
use crate::episode::{EpisodeController, StepOutcome};
use crate::error::EngineError;
use crate::perception::Observation;

/// Reinforcement learning environment trait.
///
/// The Gym-style surface a trainer drives: [`step`] advances the simulation
/// by one discrete action, [`reset`] starts a new seeded episode. Both are
/// fallible because the engine depends on external collaborators.
///
/// [`step`]: Env::step
/// [`reset`]: Env::reset
pub trait Env {
    /// Advance the environment by one action.
    fn step(&mut self, action: usize) -> Result<StepOutcome, EngineError>;

    /// Start a new episode from `seed` and return its first observation.
    fn reset(&mut self, seed: u64) -> Result<Observation, EngineError>;

    /// Size of the observation vector.
    fn obs_size(&self) -> usize;

    /// Number of discrete actions.
    fn action_size(&self) -> usize;
}

impl<P: Physics> Env for EpisodeController<P> {
    fn step(&mut self, action: usize) -> Result<StepOutcome, EngineError> {
        EpisodeController::step(self, action)
    }

    fn reset(&mut self, seed: u64) -> Result<Observation, EngineError> {
        EpisodeController::reset(self, seed)
    }

    fn obs_size(&self) -> usize {
        self.observation_len()
    }

    fn action_size(&self) -> usize {
        self.action_count()
    }
}
