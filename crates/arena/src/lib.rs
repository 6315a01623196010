#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Kinematic Arena
//!
//! A reference implementation of the engine's geometry collaborators. The
//! agent is a disc sliding inside a walled square; items and the goal zone
//! are discs it can drive through. There are no dynamics: a tick moves the
//! agent straight to its target and clamps it against the walls.
//!
//! Contacts are derived by diffing overlaps between ticks, so every entity
//! reports exactly one enter and one exit per visit.

pub mod geometry;

use geometry::{clamp_to_walls, discs_overlap, ray_disc, ray_walls};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use sim::{
    BodyPose, CollaboratorError, CollisionService, ContactObserver, Entity, Pose, RayHit, Scene,
    SpatialQuery, Tag,
};
use std::collections::BTreeSet;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Walls sit at `±half_extent` on both axes.
    pub half_extent: f32,
    pub agent_radius: f32,
    pub item_radius: f32,
    pub goal_radius: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self { half_extent: 5.0, agent_radius: 0.25, item_radius: 0.2, goal_radius: 0.5 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KinematicArena {
    config: ArenaConfig,
    touching: BTreeSet<Tag>,
}

impl KinematicArena {
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self { config, touching: BTreeSet::new() }
    }

    fn radius(&self, entity: &Entity) -> f32 {
        match entity.tag {
            Tag::Goal => self.config.goal_radius,
            Tag::Item(_) | Tag::Wall => self.config.item_radius,
        }
    }
}

impl SpatialQuery for KinematicArena {
    fn raycast(
        &self,
        scene: &Scene<'_>,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
    ) -> Result<Option<RayHit>, CollaboratorError> {
        if !direction.is_finite() || !origin.is_finite() {
            return Err(CollaboratorError::SpatialQuery(format!(
                "cannot cast from {origin} towards {direction}"
            )));
        }
        let wall = RayHit { distance: ray_walls(origin, direction, self.config.half_extent), tag: Tag::Wall };
        let nearest = scene
            .active_entities()
            .filter_map(|entity| {
                ray_disc(origin, direction, entity.position, self.radius(entity))
                    .map(|distance| RayHit { distance, tag: entity.tag })
            })
            .fold(wall, |best, hit| if hit.distance < best.distance { hit } else { best });
        Ok((nearest.distance <= max_distance).then_some(nearest))
    }
}

impl CollisionService for KinematicArena {
    fn begin_episode(&mut self, _scene: &Scene<'_>) -> Result<(), CollaboratorError> {
        self.touching.clear();
        Ok(())
    }

    fn advance(
        &mut self,
        scene: &Scene<'_>,
        target: Pose,
        _dt: f32,
        observer: &mut dyn ContactObserver,
    ) -> Result<BodyPose, CollaboratorError> {
        let (position, at_wall) =
            clamp_to_walls(target.position, self.config.agent_radius, self.config.half_extent);

        let mut now = BTreeSet::new();
        if at_wall {
            now.insert(Tag::Wall);
        }
        now.extend(
            scene
                .active_entities()
                .filter(|entity| {
                    discs_overlap(position, self.config.agent_radius, entity.position, self.radius(entity))
                })
                .map(|entity| entity.tag),
        );

        for &tag in self.touching.difference(&now) {
            trace!(%tag, "contact exit");
            match tag {
                Tag::Wall => observer.on_collision_exit(tag),
                Tag::Goal | Tag::Item(_) => observer.on_trigger_exit(tag),
            }
        }
        for &tag in now.difference(&self.touching) {
            trace!(%tag, "contact enter");
            match tag {
                Tag::Wall => observer.on_collision_enter(tag),
                Tag::Goal | Tag::Item(_) => observer.on_trigger_enter(tag),
            }
        }
        self.touching = now;

        Ok(BodyPose::planar(Pose::new(position, target.heading)))
    }
}
