//! # Episode Controller
//!
//! Owns one world and its collaborators and runs the episode state machine:
//!
//! ```text
//! Idle --reset--> Active --step--> Terminated(cause) --reset--> Active
//!                   |
//!                   +--collaborator fault--> Aborted --reset--> Active
//! ```
//!
//! One `step` is, in order: state check, action decode, action side effect,
//! one motion tick with contact dispatch, step count, truncation check,
//! reward, perception. Decoding happens before anything is mutated, so an
//! invalid action leaves the episode untouched.

use crate::action::{ActionInterpreter, SideEffect};
use crate::collaborator::{ContactLog, CosmeticSink, Physics};
use crate::config::{EngineConfig, TaskKind};
use crate::error::{CollaboratorError, EngineError};
use crate::motion::MotionIntegrator;
use crate::perception::{Observation, PerceptionEngine};
use crate::reward::{RewardBreakdown, RewardModel};
use crate::types::{TerminationCause, WorldEvent};
use crate::world::WorldState;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EpisodeState {
    /// Constructed, never reset.
    Idle,
    Active,
    Terminated(TerminationCause),
    /// A collaborator failed mid-step. Only `reset` is accepted.
    Aborted,
}

impl fmt::Display for EpisodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeState::Idle => f.write_str("idle"),
            EpisodeState::Active => f.write_str("active"),
            EpisodeState::Terminated(cause) => write!(f, "terminated ({cause})"),
            EpisodeState::Aborted => f.write_str("aborted"),
        }
    }
}

/// Bookkeeping for the current episode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Episode {
    pub seed: u64,
    pub max_steps: u32,
    pub current_step: u32,
    pub terminal: bool,
    pub cause: Option<TerminationCause>,
}

impl Episode {
    const fn start(seed: u64, max_steps: u32) -> Self {
        Self { seed, max_steps, current_step: 0, terminal: false, cause: None }
    }
}

/// Everything a policy learns from one step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f32,
    pub done: bool,
    pub cause: Option<TerminationCause>,
    pub breakdown: RewardBreakdown,
    /// Non-trivial world events, in the order they happened.
    pub events: Vec<WorldEvent>,
}

pub struct EpisodeController<P: Physics> {
    config: EngineConfig,
    physics: P,
    world: WorldState,
    perception: PerceptionEngine,
    actions: ActionInterpreter,
    motion: MotionIntegrator,
    rewards: RewardModel,
    episode: Episode,
    state: EpisodeState,
    renderer: Option<Box<dyn CosmeticSink + Send>>,
}

impl<P: Physics> EpisodeController<P> {
    /// Validates `config` and wires up every component. The controller starts
    /// `Idle`; call [`EpisodeController::reset`] before stepping.
    pub fn new(config: EngineConfig, physics: P) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            world: WorldState::new(&config),
            perception: PerceptionEngine::new(&config),
            actions: ActionInterpreter::new(config.task.action_set, &config.motion),
            motion: MotionIntegrator::new(config.motion.tick_seconds),
            rewards: RewardModel::new(config.rewards.clone(), config.shaping.clone()),
            episode: Episode::start(0, config.task.max_steps),
            state: EpisodeState::Idle,
            renderer: None,
            physics,
            config,
        })
    }

    /// Forwards cosmetic events (demanded/held visuals) to `renderer`.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn CosmeticSink + Send>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Starts a new episode from `seed` and returns its first observation.
    ///
    /// Accepted in every state.
    pub fn reset(&mut self, seed: u64) -> Result<Observation, EngineError> {
        self.world.reset(seed);
        self.rewards.reset();
        self.episode = Episode::start(seed, self.config.task.max_steps);

        if let Err(err) = self.physics.begin_episode(&self.world.scene()) {
            return Err(self.abort(err));
        }
        if let Err(err) = self.perception.observe(&self.physics, &self.world) {
            return Err(self.abort(err));
        }

        self.state = EpisodeState::Active;
        self.flush_cosmetics();
        debug!(seed, demanded = %self.world.demanded(), "episode started");
        Ok(self.perception.encode(&self.world))
    }

    /// Applies action `index` for exactly one tick.
    pub fn step(&mut self, index: usize) -> Result<StepOutcome, EngineError> {
        if self.state != EpisodeState::Active {
            return Err(EngineError::InvalidState { state: self.state });
        }
        let command = self.actions.decode(index)?;

        let mut events = Vec::new();
        let mut cause = None;

        if let Some(effect) = command.effect {
            let event = match effect {
                SideEffect::Pickup => self.world.pickup(),
                SideEffect::Drop => self.world.drop_held(),
            };
            cause = self.note(event, &mut events);
        }

        let mut contacts = ContactLog::default();
        if let Err(err) = self.motion.step(&mut self.physics, &mut self.world, command.motion, &mut contacts) {
            return Err(self.abort(err));
        }
        let contacts = contacts.into_contacts();
        if let Some((tag, _)) = contacts.iter().find(|(tag, _)| !self.world.knows(*tag)) {
            let err = CollaboratorError::Malformed(format!("contact with unknown entity {tag}"));
            return Err(self.abort(err));
        }
        // after a terminal side effect the tick still runs, but its contacts are dropped
        if cause.is_none() {
            for (tag, kind) in contacts {
                let event = self.world.record_event(tag, kind);
                cause = self.note(event, &mut events);
                if cause.is_some() {
                    break;
                }
            }
        }

        self.episode.current_step += 1;
        let truncated = cause.is_none() && self.episode.current_step >= self.episode.max_steps;
        if truncated {
            cause = Some(TerminationCause::Timeout);
        }

        let target = self.world.shaping_target(self.config.shaping.target);
        let phi = self.rewards.potential(self.world.agent().pose.position, target);
        let breakdown = self.rewards.score(&events, phi, truncated);
        let reward = breakdown.total();
        self.world.finish_step(reward);

        if let Err(err) = self.perception.observe(&self.physics, &self.world) {
            return Err(self.abort(err));
        }
        let observation = self.perception.encode(&self.world);

        if let Some(cause) = cause {
            self.episode.terminal = true;
            self.episode.cause = Some(cause);
            self.state = EpisodeState::Terminated(cause);
            let agent = self.world.agent();
            info!(
                seed = self.episode.seed,
                steps = self.episode.current_step,
                reward = agent.cumulative_reward,
                shaping = self.rewards.shaping_total(),
                %cause,
                "episode finished"
            );
        }
        self.flush_cosmetics();

        Ok(StepOutcome { observation, reward, done: cause.is_some(), cause, breakdown, events })
    }

    /// Records a non-trivial event and classifies whether it ends the episode.
    fn note(&self, event: WorldEvent, events: &mut Vec<WorldEvent>) -> Option<TerminationCause> {
        if event.is_none() {
            return None;
        }
        debug!(?event, step = self.episode.current_step, "world event");
        events.push(event);
        self.termination(event)
    }

    fn termination(&self, event: WorldEvent) -> Option<TerminationCause> {
        let task = &self.config.task;
        let find = task.kind == TaskKind::Find;
        match event {
            WorldEvent::None => None,
            WorldEvent::WallHit => Some(TerminationCause::WallHit),
            WorldEvent::PickedUpCorrect if find => Some(TerminationCause::FoundCorrect),
            WorldEvent::PickedUpCorrect => None,
            WorldEvent::PickedUpIncorrect if find || task.end_on_incorrect_pickup => {
                Some(TerminationCause::FoundIncorrect)
            }
            WorldEvent::PickedUpIncorrect => None,
            WorldEvent::DeliveredCorrect => Some(TerminationCause::DeliveredCorrect),
            WorldEvent::DeliveredIncorrect => Some(TerminationCause::DeliveredIncorrect),
        }
    }

    fn abort(&mut self, err: CollaboratorError) -> EngineError {
        warn!(seed = self.episode.seed, step = self.episode.current_step, error = %err, "episode aborted");
        self.state = EpisodeState::Aborted;
        EngineError::EngineFault(err)
    }

    fn flush_cosmetics(&mut self) {
        let events = self.world.drain_cosmetics();
        if let Some(renderer) = &mut self.renderer {
            for event in &events {
                renderer.publish(event);
            }
        }
    }

    #[must_use]
    pub const fn state(&self) -> EpisodeState {
        self.state
    }

    #[must_use]
    pub const fn episode(&self) -> &Episode {
        &self.episode
    }

    #[must_use]
    pub const fn world(&self) -> &WorldState {
        &self.world
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn physics(&self) -> &P {
        &self.physics
    }

    #[must_use]
    pub const fn perception(&self) -> &PerceptionEngine {
        &self.perception
    }

    #[must_use]
    pub const fn observation_len(&self) -> usize {
        self.perception.layout().len()
    }

    #[must_use]
    pub const fn action_count(&self) -> usize {
        self.actions.action_count()
    }
}
