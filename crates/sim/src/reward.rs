//! Per-step reward: step cost, event rewards, timeout penalty and optional
//! potential-based shaping.
//!
//! Shaping uses `phi = -distance(agent, target) * coefficient` and pays
//! `phi_t - phi_{t-1}`. The first step after a reset has no previous potential
//! and pays nothing, so the shaping terms of an episode telescope to
//! `phi(last) - phi(first)`.

use crate::config::{RewardTable, ShapingConfig};
use crate::types::WorldEvent;
use glam::Vec2;
use serde::Serialize;

/// Additive parts of one step's reward.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct RewardBreakdown {
    pub step_cost: f32,
    pub event: f32,
    pub shaping: f32,
    pub timeout: f32,
}

impl RewardBreakdown {
    #[must_use]
    pub fn total(&self) -> f32 {
        self.step_cost + self.event + self.shaping + self.timeout
    }
}

#[derive(Clone, Debug)]
pub struct RewardModel {
    table: RewardTable,
    shaping: ShapingConfig,
    phi_prev: Option<f32>,
    shaping_total: f32,
}

impl RewardModel {
    #[must_use]
    pub fn new(table: RewardTable, shaping: ShapingConfig) -> Self {
        Self { table, shaping, phi_prev: None, shaping_total: 0.0 }
    }

    /// Forgets the previous potential. Called on every episode reset.
    pub fn reset(&mut self) {
        self.phi_prev = None;
        self.shaping_total = 0.0;
    }

    #[must_use]
    pub fn shaping_enabled(&self) -> bool {
        self.shaping.coefficient != 0.0
    }

    /// Shaping paid so far this episode.
    #[must_use]
    pub const fn shaping_total(&self) -> f32 {
        self.shaping_total
    }

    #[must_use]
    pub fn event_reward(&self, event: WorldEvent) -> f32 {
        match event {
            WorldEvent::None => 0.0,
            WorldEvent::PickedUpCorrect => self.table.picked_up_correct,
            WorldEvent::PickedUpIncorrect => self.table.picked_up_incorrect,
            WorldEvent::DeliveredCorrect => self.table.delivered_correct,
            WorldEvent::DeliveredIncorrect => self.table.delivered_incorrect,
            WorldEvent::WallHit => self.table.wall_hit,
        }
    }

    /// Potential of the agent at `agent` with respect to `target`, or `None`
    /// when shaping is disabled or the target does not exist.
    #[must_use]
    pub fn potential(&self, agent: Vec2, target: Option<Vec2>) -> Option<f32> {
        if !self.shaping_enabled() {
            return None;
        }
        target.map(|target| -agent.distance(target) * self.shaping.coefficient)
    }

    /// Difference to the previous potential. Stores `phi` for the next step.
    pub fn shaping_reward(&mut self, phi: Option<f32>) -> f32 {
        let reward = match (self.phi_prev, phi) {
            (Some(prev), Some(phi)) => phi - prev,
            _ => 0.0,
        };
        self.phi_prev = phi;
        self.shaping_total += reward;
        reward
    }

    /// Scores one step from the events it produced.
    pub fn score(&mut self, events: &[WorldEvent], phi: Option<f32>, truncated: bool) -> RewardBreakdown {
        RewardBreakdown {
            step_cost: self.table.step_cost,
            event: events.iter().map(|&event| self.event_reward(event)).sum(),
            shaping: self.shaping_reward(phi),
            timeout: if truncated { self.table.timeout_penalty } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapingTarget;

    fn model(coefficient: f32) -> RewardModel {
        RewardModel::new(
            RewardTable { timeout_penalty: -7.0, ..RewardTable::default() },
            ShapingConfig { coefficient, target: ShapingTarget::Goal },
        )
    }

    #[test]
    fn breakdown_sums_parts() {
        let mut rewards = model(0.0);
        let breakdown = rewards.score(&[WorldEvent::WallHit], None, false);
        assert_eq!(breakdown.step_cost, -0.4);
        assert_eq!(breakdown.event, -50.0);
        assert_eq!(breakdown.shaping, 0.0);
        assert!((breakdown.total() - -50.4).abs() < 1e-5);
    }

    #[test]
    fn timeout_penalty_only_when_truncated() {
        let mut rewards = model(0.0);
        assert_eq!(rewards.score(&[], None, false).timeout, 0.0);
        assert_eq!(rewards.score(&[], None, true).timeout, -7.0);
    }

    #[test]
    fn disabled_shaping_has_no_potential() {
        let rewards = model(0.0);
        assert_eq!(rewards.potential(Vec2::ZERO, Some(Vec2::ONE)), None);
    }

    #[test]
    fn first_step_after_reset_pays_no_shaping() {
        let mut rewards = model(0.1);
        let target = Some(Vec2::new(3.0, 4.0));
        let phi = rewards.potential(Vec2::ZERO, target);
        assert_eq!(phi, Some(-0.5));
        assert_eq!(rewards.shaping_reward(phi), 0.0);

        let phi = rewards.potential(Vec2::new(3.0, 0.0), target);
        assert!((rewards.shaping_reward(phi) - 0.1).abs() < 1e-6);

        rewards.reset();
        assert_eq!(rewards.shaping_reward(phi), 0.0);
    }

    #[test]
    fn shaping_telescopes() {
        let mut rewards = model(0.25);
        let target = Some(Vec2::new(1.0, 1.0));
        let path = [Vec2::new(4.0, 0.0), Vec2::new(3.0, 2.0), Vec2::new(-2.0, 1.0), Vec2::new(1.5, 1.0)];
        let phis: Vec<f32> = path.iter().map(|&p| rewards.potential(p, target).unwrap()).collect();
        let total: f32 = phis.iter().map(|&phi| rewards.shaping_reward(Some(phi))).sum();
        assert!((total - (phis[3] - phis[0])).abs() < 1e-5);
        assert!((rewards.shaping_total() - total).abs() < 1e-6);
    }
}
