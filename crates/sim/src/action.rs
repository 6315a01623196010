//! Discrete action decoding.

use crate::config::MotionConfig;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Stay,
    Forward,
    TurnLeft,
    TurnRight,
    Pickup,
    Drop,
}

/// Which discrete action table the policy acts through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSet {
    /// `[Forward, TurnLeft, TurnRight]`.
    #[default]
    Steer,
    /// `[Stay, Forward, TurnLeft, TurnRight]`.
    Navigate,
    /// `Navigate` plus `[Pickup, Drop]`. Item and goal contacts only mark
    /// proximity; the side-effecting actions perform the transitions.
    Manipulate,
}

const STEER: [Action; 3] = [Action::Forward, Action::TurnLeft, Action::TurnRight];
const NAVIGATE: [Action; 4] = [Action::Stay, Action::Forward, Action::TurnLeft, Action::TurnRight];
const MANIPULATE: [Action; 6] = [
    Action::Stay,
    Action::Forward,
    Action::TurnLeft,
    Action::TurnRight,
    Action::Pickup,
    Action::Drop,
];

impl ActionSet {
    #[must_use]
    pub const fn actions(self) -> &'static [Action] {
        match self {
            ActionSet::Steer => &STEER,
            ActionSet::Navigate => &NAVIGATE,
            ActionSet::Manipulate => &MANIPULATE,
        }
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.actions().len()
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.actions().is_empty()
    }

    /// Whether contacts merely record proximity instead of picking up.
    #[must_use]
    pub const fn uses_explicit_pickup(self) -> bool {
        matches!(self, ActionSet::Manipulate)
    }
}

/// Velocity command for one tick: units per second and degrees per second.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct MotionCommand {
    pub linear: f32,
    pub angular: f32,
}

impl MotionCommand {
    pub const IDLE: Self = Self { linear: 0.0, angular: 0.0 };
}

/// World transition requested directly by an action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SideEffect {
    Pickup,
    Drop,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Command {
    pub action: Action,
    pub motion: MotionCommand,
    pub effect: Option<SideEffect>,
}

/// Maps discrete indices from the policy onto commands.
#[derive(Clone, Debug)]
pub struct ActionInterpreter {
    set: ActionSet,
    linear_speed: f32,
    angular_speed: f32,
}

impl ActionInterpreter {
    #[must_use]
    pub fn new(set: ActionSet, motion: &MotionConfig) -> Self {
        Self { set, linear_speed: motion.linear_speed, angular_speed: motion.angular_speed }
    }

    #[must_use]
    pub const fn action_count(&self) -> usize {
        self.set.len()
    }

    /// Decodes `index`; indices outside the table fail with `InvalidAction`.
    pub fn decode(&self, index: usize) -> Result<Command, EngineError> {
        let action = *self.set.actions().get(index).ok_or(EngineError::InvalidAction {
            index,
            available: self.set.len(),
        })?;
        let (motion, effect) = match action {
            Action::Stay => (MotionCommand::IDLE, None),
            Action::Forward => (MotionCommand { linear: self.linear_speed, angular: 0.0 }, None),
            Action::TurnLeft => (MotionCommand { linear: 0.0, angular: -self.angular_speed }, None),
            Action::TurnRight => (MotionCommand { linear: 0.0, angular: self.angular_speed }, None),
            Action::Pickup => (MotionCommand::IDLE, Some(SideEffect::Pickup)),
            Action::Drop => (MotionCommand::IDLE, Some(SideEffect::Drop)),
        };
        Ok(Command { action, motion, effect })
    }
}
