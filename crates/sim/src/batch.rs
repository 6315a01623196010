//! Many independent environments stepped in lockstep.
//!
//! Members share nothing: each owns its world, its random stream and its
//! collaborators. Member `i` plays its `k`-th episode from seed
//! `base_seed + i * SEED_STRIDE + k`, so every member walks its own seed
//! sequence and a finished member is reset in place.

use crate::env::Env;
use crate::error::EngineError;
use crate::perception::Observation;
use crate::types::TerminationCause;
use tracing::warn;

/// Distance between the seed sequences of neighbouring members.
pub const SEED_STRIDE: u64 = 1 << 32;

/// Result of stepping every member once.
#[derive(Debug, Default)]
pub struct BatchStep {
    /// Observation to act on next. For finished members this is the first
    /// observation of the new episode.
    pub observations: Vec<Observation>,
    pub rewards: Vec<f32>,
    pub dones: Vec<bool>,
    pub causes: Vec<Option<TerminationCause>>,
    /// Last observation of each episode that ended this step.
    pub terminal_observations: Vec<Option<Observation>>,
    /// Error that cut a member's episode short. The member is reported done
    /// with no cause and has already been restarted on its next seed.
    pub faults: Vec<Option<EngineError>>,
}

impl BatchStep {
    fn push(
        &mut self,
        observation: Observation,
        reward: f32,
        done: bool,
        cause: Option<TerminationCause>,
        terminal: Option<Observation>,
        fault: Option<EngineError>,
    ) {
        self.observations.push(observation);
        self.rewards.push(reward);
        self.dones.push(done);
        self.causes.push(cause);
        self.terminal_observations.push(terminal);
        self.faults.push(fault);
    }
}

pub struct EpisodeBatch<E: Env> {
    envs: Vec<E>,
    base_seed: u64,
    completed: Vec<u64>,
    /// Members whose last reset failed; they are reset again instead of stepped.
    stalled: Vec<bool>,
}

impl<E: Env> EpisodeBatch<E> {
    #[must_use]
    pub fn new(envs: Vec<E>, base_seed: u64) -> Self {
        let completed = vec![0; envs.len()];
        let stalled = vec![false; envs.len()];
        Self { envs, base_seed, completed, stalled }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.envs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }

    #[must_use]
    pub fn envs(&self) -> &[E] {
        &self.envs
    }

    /// Episodes finished so far across all members, faulted ones included.
    #[must_use]
    pub fn completed_episodes(&self) -> u64 {
        self.completed.iter().sum()
    }

    /// Seed the member at `index` will use for its next reset.
    #[must_use]
    pub fn seed_for(&self, index: usize) -> u64 {
        self.base_seed
            .wrapping_add((index as u64).wrapping_mul(SEED_STRIDE))
            .wrapping_add(self.completed[index])
    }

    pub fn reset_all(&mut self) -> Result<Vec<Observation>, EngineError> {
        (0..self.envs.len())
            .map(|index| {
                let seed = self.seed_for(index);
                let observation = self.envs[index].reset(seed)?;
                self.stalled[index] = false;
                Ok(observation)
            })
            .collect()
    }

    /// Steps member `i` with `actions[i]`, resetting members whose episode ended.
    ///
    /// Only a malformed action vector fails the whole call, and it does so
    /// before any member moves. A member that fails on its own is reported in
    /// [`BatchStep::faults`] while the others carry on.
    pub fn step(&mut self, actions: &[usize]) -> Result<BatchStep, EngineError> {
        if actions.len() != self.envs.len() {
            return Err(EngineError::BatchSize { expected: self.envs.len(), got: actions.len() });
        }
        for (env, &action) in self.envs.iter().zip(actions) {
            let available = env.action_size();
            if action >= available {
                return Err(EngineError::InvalidAction { index: action, available });
            }
        }

        let mut batch = BatchStep::default();
        for (index, &action) in actions.iter().enumerate() {
            if self.stalled[index] {
                let (observation, fault) = self.restart(index);
                batch.push(observation, 0.0, false, None, None, fault);
                continue;
            }
            match self.envs[index].step(action) {
                Ok(outcome) if outcome.done => {
                    self.completed[index] += 1;
                    let (observation, fault) = self.restart(index);
                    batch.push(observation, outcome.reward, true, outcome.cause, Some(outcome.observation), fault);
                }
                Ok(outcome) => {
                    batch.push(outcome.observation, outcome.reward, false, None, None, None);
                }
                Err(err) => {
                    warn!(member = index, error = %err, "batch member failed, restarting it");
                    self.completed[index] += 1;
                    let (observation, _) = self.restart(index);
                    batch.push(observation, 0.0, true, None, None, Some(err));
                }
            }
        }
        Ok(batch)
    }

    /// Resets member `index` on its next seed. On failure the member is
    /// marked stalled and gets an empty observation.
    fn restart(&mut self, index: usize) -> (Observation, Option<EngineError>) {
        let seed = self.seed_for(index);
        match self.envs[index].reset(seed) {
            Ok(observation) => {
                self.stalled[index] = false;
                (observation, None)
            }
            Err(err) => {
                warn!(member = index, seed, error = %err, "batch member reset failed");
                self.stalled[index] = true;
                (Observation::default(), Some(err))
            }
        }
    }
}
