//! Construction-time configuration.
//!
//! One [`EngineConfig`] describes a whole task variant: sensor layout, motion
//! speeds, spawn bounds, reward magnitudes, shaping and task shape. It is
//! immutable for the lifetime of an [`crate::EpisodeController`]. Configs are
//! plain serde structs, so variants can live in JSON files next to the
//! trainer instead of in code.

use crate::action::ActionSet;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Complete description of a task variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub task: TaskConfig,
    /// Item catalogue. The order defines every item's [`crate::ItemId`] and
    /// the order of item channels in the observation.
    pub items: Vec<ItemSpec>,
    pub sensors: SensorConfig,
    pub motion: MotionConfig,
    pub spawn: SpawnConfig,
    pub rewards: RewardTable,
    pub shaping: ShapingConfig,
}

/// Shape of the task the agent has to solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Reach the demanded item. Any item contact ends the episode.
    Find,
    /// Pick up the demanded item and bring it to the goal zone.
    #[default]
    Deliver,
}

impl TaskKind {
    #[must_use]
    pub const fn has_goal(self) -> bool {
        matches!(self, TaskKind::Deliver)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub kind: TaskKind,
    pub action_set: ActionSet,
    /// Steps after which the episode is truncated with a timeout.
    pub max_steps: u32,
    /// Probability that an episode starts with the demanded item already held.
    pub preheld_probability: f32,
    /// End the episode when the agent touches (or picks up) a wrong item.
    pub end_on_incorrect_pickup: bool,
    /// Entering the goal zone empty-handed counts as an incorrect delivery.
    pub penalize_empty_delivery: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            kind: TaskKind::Deliver,
            action_set: ActionSet::Steer,
            max_steps: 1000,
            preheld_probability: 0.0,
            end_on_incorrect_pickup: false,
            penalize_empty_delivery: false,
        }
    }
}

/// One entry in the item catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub category: String,
    #[serde(default)]
    pub visual: String,
}

impl ItemSpec {
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        let category = category.into();
        Self { visual: category.clone(), category }
    }
}

/// Distance value written for a ray that hit nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MissPolicy {
    /// Misses read as the ray's maximum distance.
    #[default]
    MaxDistance,
    /// Misses read as a fixed sentinel value.
    Constant { value: f32 },
    /// Every distance is divided by the maximum distance; misses read as 1.0.
    Normalized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub ray_count: usize,
    pub max_distance: f32,
    pub miss_policy: MissPolicy,
    /// Add a classification channel for wall hits.
    pub classify_walls: bool,
    /// Append `[x, z, forward_x, forward_z]` to the observation.
    pub include_pose: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ray_count: 8,
            max_distance: 10.0,
            miss_policy: MissPolicy::MaxDistance,
            classify_walls: false,
            include_pose: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Forward speed in world units per second.
    pub linear_speed: f32,
    /// Turn rate in degrees per second.
    pub angular_speed: f32,
    /// Fixed simulation tick; one tick per step.
    pub tick_seconds: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self { linear_speed: 3.0, angular_speed: 180.0, tick_seconds: 0.02 }
    }
}

/// Half-widths of the square regions entities are spawned in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub item_bound: f32,
    pub goal_bound: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self { item_bound: 2.0, goal_bound: 2.0 }
    }
}

/// Per-variant reward magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTable {
    /// Paid on every step, usually negative.
    pub step_cost: f32,
    pub picked_up_correct: f32,
    pub picked_up_incorrect: f32,
    pub delivered_correct: f32,
    pub delivered_incorrect: f32,
    pub wall_hit: f32,
    /// Added once, on the step that triggers truncation.
    pub timeout_penalty: f32,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            step_cost: -0.4,
            picked_up_correct: 100.0,
            picked_up_incorrect: -100.0,
            delivered_correct: 100.0,
            delivered_incorrect: 0.0,
            wall_hit: -50.0,
            timeout_penalty: 0.0,
        }
    }
}

/// What the shaping potential measures the distance to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapingTarget {
    /// The goal zone. Requires a task with a goal.
    Goal,
    /// The demanded item, whether held or not.
    DemandedItem,
    /// The demanded item until it is held, then the goal zone if any.
    #[default]
    Task,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingConfig {
    /// Scale of the potential `-distance * coefficient`. Zero disables shaping.
    pub coefficient: f32,
    pub target: ShapingTarget,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::warehouse()
    }
}

fn two_colours() -> Vec<ItemSpec> {
    vec![ItemSpec::new("Resource_Blue"), ItemSpec::new("Resource_Yellow")]
}

impl EngineConfig {
    /// Two coloured resources and a warehouse; half of the episodes start with
    /// the demanded resource already held.
    #[must_use]
    pub fn warehouse() -> Self {
        Self {
            task: TaskConfig { preheld_probability: 0.5, ..TaskConfig::default() },
            items: two_colours(),
            sensors: SensorConfig::default(),
            motion: MotionConfig::default(),
            spawn: SpawnConfig::default(),
            rewards: RewardTable::default(),
            shaping: ShapingConfig::default(),
        }
    }

    /// Reach the demanded item among several; any item contact ends the episode.
    #[must_use]
    pub fn find_items() -> Self {
        Self {
            task: TaskConfig {
                kind: TaskKind::Find,
                end_on_incorrect_pickup: true,
                ..TaskConfig::default()
            },
            items: two_colours(),
            sensors: SensorConfig { ray_count: 16, max_distance: 100.0, ..SensorConfig::default() },
            motion: MotionConfig { linear_speed: 10.0, angular_speed: 360.0, ..MotionConfig::default() },
            spawn: SpawnConfig { item_bound: 1.5, goal_bound: 1.5 },
            rewards: RewardTable {
                step_cost: 0.0,
                picked_up_correct: 100.0,
                picked_up_incorrect: 20.0,
                delivered_correct: 0.0,
                delivered_incorrect: 0.0,
                wall_hit: 0.0,
                timeout_penalty: 0.0,
            },
            shaping: ShapingConfig::default(),
        }
    }

    /// Find the demanded item, then carry it into the goal zone.
    #[must_use]
    pub fn find_and_deliver() -> Self {
        Self {
            task: TaskConfig {
                kind: TaskKind::Deliver,
                end_on_incorrect_pickup: true,
                penalize_empty_delivery: true,
                ..TaskConfig::default()
            },
            rewards: RewardTable {
                delivered_correct: 100.0,
                delivered_incorrect: 0.0,
                ..Self::find_items().rewards
            },
            ..Self::find_items()
        }
    }

    /// Explicit pickup/drop actions, pose observations, mild wall penalty.
    #[must_use]
    pub fn manipulate() -> Self {
        Self {
            task: TaskConfig { action_set: ActionSet::Manipulate, ..TaskConfig::default() },
            items: two_colours(),
            sensors: SensorConfig { include_pose: true, ..SensorConfig::default() },
            motion: MotionConfig::default(),
            spawn: SpawnConfig::default(),
            rewards: RewardTable {
                step_cost: 0.0,
                delivered_incorrect: -100.0,
                wall_hit: -1.0,
                ..RewardTable::default()
            },
            shaping: ShapingConfig::default(),
        }
    }

    /// Builder: set max episode steps.
    #[must_use]
    pub fn with_max_steps(mut self, steps: u32) -> Self {
        self.task.max_steps = steps;
        self
    }

    /// Builder: enable potential-based shaping.
    #[must_use]
    pub fn with_shaping(mut self, coefficient: f32, target: ShapingTarget) -> Self {
        self.shaping = ShapingConfig { coefficient, target };
        self
    }

    /// Builder: replace the item catalogue.
    #[must_use]
    pub fn with_items(mut self, items: Vec<ItemSpec>) -> Self {
        self.items = items;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every invariant the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.items.is_empty() {
            return Err(ConfigError::EmptyCatalogue);
        }
        if self.sensors.ray_count == 0 {
            return Err(ConfigError::NoRays);
        }
        if self.task.max_steps == 0 {
            return Err(ConfigError::ZeroMaxSteps);
        }
        positive("sensors.max_distance", self.sensors.max_distance)?;
        positive("motion.linear_speed", self.motion.linear_speed)?;
        positive("motion.angular_speed", self.motion.angular_speed)?;
        positive("motion.tick_seconds", self.motion.tick_seconds)?;
        positive("spawn.item_bound", self.spawn.item_bound)?;
        if self.task.kind.has_goal() {
            positive("spawn.goal_bound", self.spawn.goal_bound)?;
        }
        if !(0.0..=1.0).contains(&self.task.preheld_probability) {
            return Err(ConfigError::Probability(self.task.preheld_probability));
        }
        if let MissPolicy::Constant { value } = self.sensors.miss_policy {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field: "sensors.miss_policy.value", value });
            }
        }
        if !self.shaping.coefficient.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "shaping.coefficient",
                value: self.shaping.coefficient,
            });
        }
        if self.shaping.target == ShapingTarget::Goal && !self.task.kind.has_goal() {
            return Err(ConfigError::ShapingTargetUnavailable(self.shaping.target));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
