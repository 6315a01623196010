//! # Perception
//!
//! A fan of `ray_count` rays is cast from the agent at heading offsets
//! `i * 360 / ray_count`. Each ray is resolved by the [`SpatialQuery`]
//! collaborator and encoded as a distance followed by one classification bit
//! per label in the [`LabelSet`].
//!
//! The observation layout is fixed by the configuration:
//!
//! ```text
//! [demanded one-hot | held one-hot | ray_0 (distance, labels..) | .. | pose?]
//! ```
//!
//! Item channels follow catalogue order, and every held/demanded bit compares
//! against its own item identity.

use crate::collaborator::{Scene, SpatialQuery};
use crate::config::{EngineConfig, MissPolicy};
use crate::error::CollaboratorError;
use crate::types::{heading_vector, ItemId, Tag};
use crate::world::WorldState;
use glam::Vec2;
use std::ops::Deref;

/// Tolerance for hits reported marginally beyond the query range.
const RANGE_EPSILON: f32 = 1e-4;

/// Declared classification channels, in observation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<Tag>,
    item_count: usize,
    has_goal: bool,
}

impl LabelSet {
    /// `[Wall]` if walls are classified, `[Goal]` if the task has one, then
    /// every catalogue item.
    #[must_use]
    pub fn for_config(config: &EngineConfig) -> Self {
        let has_goal = config.task.kind.has_goal();
        let mut labels = Vec::with_capacity(config.items.len() + 2);
        if config.sensors.classify_walls {
            labels.push(Tag::Wall);
        }
        if has_goal {
            labels.push(Tag::Goal);
        }
        labels.extend((0..config.items.len()).map(|index| Tag::Item(ItemId(index))));
        Self { labels, item_count: config.items.len(), has_goal }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn labels(&self) -> &[Tag] {
        &self.labels
    }

    #[must_use]
    pub fn index_of(&self, tag: Tag) -> Option<usize> {
        self.labels.iter().position(|&label| label == tag)
    }

    /// Whether a collaborator may legitimately report `tag` at all.
    fn admits(&self, tag: Tag) -> bool {
        match tag {
            Tag::Wall => true,
            Tag::Goal => self.has_goal,
            Tag::Item(id) => id.index() < self.item_count,
        }
    }
}

/// Offsets and length of every observation field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ObservationLayout {
    pub items: usize,
    pub rays: usize,
    pub labels: usize,
    pub pose: bool,
}

impl ObservationLayout {
    pub const POSE_LEN: usize = 4;

    #[must_use]
    pub const fn demanded_offset(&self) -> usize {
        0
    }

    #[must_use]
    pub const fn held_offset(&self) -> usize {
        self.items
    }

    #[must_use]
    pub const fn rays_offset(&self) -> usize {
        2 * self.items
    }

    /// Floats per ray: distance plus one bit per label.
    #[must_use]
    pub const fn ray_stride(&self) -> usize {
        1 + self.labels
    }

    #[must_use]
    pub const fn pose_offset(&self) -> usize {
        self.rays_offset() + self.rays * self.ray_stride()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.pose_offset() + if self.pose { Self::POSE_LEN } else { 0 }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flat observation vector handed to the policy.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Observation(Vec<f32>);

impl Observation {
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Raw native-endian bytes for shipping to a trainer on the same host.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.0)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

impl Deref for Observation {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

/// One encoded ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastResult {
    /// Distance after the miss policy has been applied.
    pub distance: f32,
    /// Index into the [`LabelSet`] of the hit's label, if it has one.
    pub label: Option<usize>,
}

impl RaycastResult {
    /// One-hot classification over `label_count` channels; all false on miss.
    pub fn classification(&self, label_count: usize) -> impl Iterator<Item = bool> + '_ {
        (0..label_count).map(move |index| self.label == Some(index))
    }
}

pub struct PerceptionEngine {
    ray_count: usize,
    max_distance: f32,
    miss_policy: MissPolicy,
    include_pose: bool,
    labels: LabelSet,
    layout: ObservationLayout,
    last_fan: Vec<RaycastResult>,
}

impl PerceptionEngine {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let labels = LabelSet::for_config(config);
        let layout = ObservationLayout {
            items: config.items.len(),
            rays: config.sensors.ray_count,
            labels: labels.len(),
            pose: config.sensors.include_pose,
        };
        let miss = RaycastResult { distance: 0.0, label: None };
        Self {
            ray_count: config.sensors.ray_count,
            max_distance: config.sensors.max_distance,
            miss_policy: config.sensors.miss_policy,
            include_pose: config.sensors.include_pose,
            labels,
            layout,
            last_fan: vec![miss; config.sensors.ray_count],
        }
    }

    #[must_use]
    pub const fn layout(&self) -> ObservationLayout {
        self.layout
    }

    /// Heading offsets of the fan in degrees, strictly increasing from 0.
    pub fn ray_offsets(&self) -> impl Iterator<Item = f32> {
        let increment = 360.0 / self.ray_count as f32;
        (0..self.ray_count).map(move |index| index as f32 * increment)
    }

    /// Casts the configured fan from `origin` and returns it in ray order.
    pub fn cast_fan<Q: SpatialQuery + ?Sized>(
        &self,
        query: &Q,
        scene: &Scene<'_>,
        origin: Vec2,
        heading: f32,
    ) -> Result<Vec<RaycastResult>, CollaboratorError> {
        self.ray_offsets()
            .map(|offset| {
                let direction = heading_vector(heading + offset);
                let hit = query.raycast(scene, origin, direction, self.max_distance)?;
                self.resolve(hit.map(|hit| (hit.distance, hit.tag)))
            })
            .collect()
    }

    fn resolve(&self, hit: Option<(f32, Tag)>) -> Result<RaycastResult, CollaboratorError> {
        let Some((distance, tag)) = hit else {
            let distance = match self.miss_policy {
                MissPolicy::MaxDistance => self.max_distance,
                MissPolicy::Constant { value } => value,
                MissPolicy::Normalized => 1.0,
            };
            return Ok(RaycastResult { distance, label: None });
        };
        if !distance.is_finite() || distance < 0.0 || distance > self.max_distance + RANGE_EPSILON {
            return Err(CollaboratorError::Malformed(format!(
                "ray distance {distance} outside [0, {}]",
                self.max_distance
            )));
        }
        if !self.labels.admits(tag) {
            return Err(CollaboratorError::Malformed(format!("ray hit unknown entity {tag}")));
        }
        let distance = distance.min(self.max_distance);
        let distance = match self.miss_policy {
            MissPolicy::Normalized => distance / self.max_distance,
            MissPolicy::MaxDistance | MissPolicy::Constant { .. } => distance,
        };
        Ok(RaycastResult { distance, label: self.labels.index_of(tag) })
    }

    /// Casts the fan from the agent's current pose and keeps it for encoding.
    pub fn observe<Q: SpatialQuery + ?Sized>(
        &mut self,
        query: &Q,
        world: &WorldState,
    ) -> Result<(), CollaboratorError> {
        let pose = world.agent().pose;
        self.last_fan = self.cast_fan(query, &world.scene(), pose.position, pose.heading)?;
        Ok(())
    }

    /// Flattens world identity state and the last fan into an observation.
    #[must_use]
    pub fn encode(&self, world: &WorldState) -> Observation {
        let layout = self.layout;
        let mut data = vec![0.0; layout.len()];

        let agent = world.agent();
        data[layout.demanded_offset() + agent.demanded.index()] = 1.0;
        if let Some(held) = agent.held {
            data[layout.held_offset() + held.index()] = 1.0;
        }

        let rays = data[layout.rays_offset()..layout.pose_offset()].chunks_exact_mut(layout.ray_stride());
        for (slot, ray) in rays.zip(&self.last_fan) {
            slot[0] = ray.distance;
            for (bit, hit) in slot[1..].iter_mut().zip(ray.classification(layout.labels)) {
                *bit = if hit { 1.0 } else { 0.0 };
            }
        }

        if self.include_pose {
            let forward = agent.pose.forward();
            let offset = layout.pose_offset();
            data[offset..offset + ObservationLayout::POSE_LEN].copy_from_slice(&[
                agent.pose.position.x,
                agent.pose.position.y,
                forward.x,
                forward.y,
            ]);
        }

        debug_assert_eq!(data.len(), layout.len());
        Observation(data)
    }
}
