//! # Courier Runner
//!
//! Loads a run configuration, drives episodes against the kinematic arena with
//! a uniform random policy, and summarises how they ended. The random policy is
//! a smoke test for configs and collaborators, not a learner.

use anyhow::{Context, Result};
use arena::{ArenaConfig, KinematicArena};
use serde::{Deserialize, Serialize};
use sim::{CosmeticEvent, CosmeticSink, EngineConfig, EpisodeController, TerminationCause};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Named engine configurations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    #[default]
    Warehouse,
    Find,
    Deliver,
    Manipulate,
}

impl Preset {
    #[must_use]
    pub fn config(self) -> EngineConfig {
        match self {
            Preset::Warehouse => EngineConfig::warehouse(),
            Preset::Find => EngineConfig::find_items(),
            Preset::Deliver => EngineConfig::find_and_deliver(),
            Preset::Manipulate => EngineConfig::manipulate(),
        }
    }
}

/// Everything a run needs: the engine variant and the arena it plays in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub engine: EngineConfig,
    pub arena: ArenaConfig,
}

impl RunConfig {
    #[must_use]
    pub fn from_preset(preset: Preset) -> Self {
        Self { engine: preset.config(), arena: ArenaConfig::default() }
    }

    /// Reads a JSON run configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
        config.engine.validate().with_context(|| format!("validating {}", path.display()))?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Logs cosmetic changes instead of drawing them.
struct LogRenderer;

impl CosmeticSink for LogRenderer {
    fn publish(&mut self, event: &CosmeticEvent) {
        match event {
            CosmeticEvent::DemandChanged { item, visual } => debug!(%item, %visual, "demand changed"),
            CosmeticEvent::HeldChanged { item: Some(item), visual } => {
                debug!(%item, visual = visual.as_deref().unwrap_or_default(), "now holding");
            }
            CosmeticEvent::HeldChanged { item: None, .. } => debug!("hands empty"),
        }
    }
}

/// How a batch of episodes went.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub episodes: usize,
    pub total_steps: u64,
    pub mean_reward: f32,
    pub causes: BTreeMap<String, usize>,
}

impl Summary {
    #[must_use]
    pub fn count(&self, cause: TerminationCause) -> usize {
        self.causes.get(&cause.to_string()).copied().unwrap_or(0)
    }
}

/// Plays `episodes` episodes with a random policy. Episode `i` uses seed
/// `seed + i`, and the policy draws from its own stream seeded with `seed`.
pub fn run(config: RunConfig, episodes: usize, seed: u64) -> Result<Summary> {
    let arena = KinematicArena::new(config.arena);
    let mut env = EpisodeController::new(config.engine, arena)
        .context("building episode controller")?
        .with_renderer(Box::new(LogRenderer));
    let policy = fastrand::Rng::with_seed(seed);

    let mut summary = Summary { episodes, ..Summary::default() };
    let mut reward_sum = 0.0;
    for episode in 0..episodes as u64 {
        env.reset(seed.wrapping_add(episode))?;
        let cause = loop {
            let outcome = env.step(policy.usize(..env.action_count()))?;
            if let Some(cause) = outcome.cause {
                break cause;
            }
        };
        let agent = env.world().agent();
        info!(episode, steps = agent.step, reward = agent.cumulative_reward, %cause, "episode done");
        summary.total_steps += u64::from(agent.step);
        reward_sum += agent.cumulative_reward;
        *summary.causes.entry(cause.to_string()).or_default() += 1;
    }
    if episodes > 0 {
        summary.mean_reward = reward_sum / episodes as f32;
    }
    info!(
        episodes,
        steps = summary.total_steps,
        mean_reward = summary.mean_reward,
        causes = ?summary.causes,
        "run finished"
    );
    Ok(summary)
}
