//! Seams to the external collaborators.
//!
//! The engine never does geometry itself. Ray intersection goes through a
//! [`SpatialQuery`], pose integration and contact detection through a
//! [`CollisionService`], and cosmetic state flows one way into a
//! [`CosmeticSink`]. Collaborators see the world through a borrowed [`Scene`].

use crate::error::CollaboratorError;
use crate::types::{BodyPose, ContactKind, Entity, ItemId, Pose, Tag};
use glam::Vec2;

/// Read-only view of the world handed to collaborators.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub agent: Pose,
    pub items: &'a [Entity],
    pub goal: Option<&'a Entity>,
}

impl<'a> Scene<'a> {
    /// Items that still take part in contacts and ray queries, then the goal.
    pub fn active_entities(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        self.items.iter().chain(self.goal).filter(|entity| entity.active)
    }
}

/// A ray hit as reported by a [`SpatialQuery`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub tag: Tag,
}

pub trait SpatialQuery {
    /// Casts one ray in the (x, z) plane.
    ///
    /// `direction` is a unit vector. Returns `Ok(None)` when nothing lies within
    /// `max_distance`.
    fn raycast(
        &self,
        scene: &Scene<'_>,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
    ) -> Result<Option<RayHit>, CollaboratorError>;
}

/// Receives solid-body contacts (walls).
pub trait CollisionObserver {
    fn on_collision_enter(&mut self, tag: Tag);
    fn on_collision_exit(&mut self, _tag: Tag) {}
}

/// Receives trigger-volume contacts (items, goal zone).
pub trait TriggerObserver {
    fn on_trigger_enter(&mut self, tag: Tag);
    fn on_trigger_exit(&mut self, tag: Tag);
}

pub trait ContactObserver: CollisionObserver + TriggerObserver {}

impl<T: CollisionObserver + TriggerObserver> ContactObserver for T {}

pub trait CollisionService {
    /// Called once per reset, after the world has been re-randomized.
    fn begin_episode(&mut self, _scene: &Scene<'_>) -> Result<(), CollaboratorError> {
        Ok(())
    }

    /// Moves the agent body towards `target` over exactly one fixed tick.
    ///
    /// Contacts that start or end during the tick are reported synchronously
    /// to `observer`. Returns the body pose after collision response.
    fn advance(
        &mut self,
        scene: &Scene<'_>,
        target: Pose,
        dt: f32,
        observer: &mut dyn ContactObserver,
    ) -> Result<BodyPose, CollaboratorError>;
}

/// Everything an [`crate::EpisodeController`] needs from the outside world.
pub trait Physics: SpatialQuery + CollisionService {}

impl<T: SpatialQuery + CollisionService> Physics for T {}

/// One-way notification for renderers. The engine never reads renderer state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CosmeticEvent {
    DemandChanged { item: ItemId, visual: String },
    HeldChanged { item: Option<ItemId>, visual: Option<String> },
}

pub trait CosmeticSink {
    fn publish(&mut self, event: &CosmeticEvent);
}

/// Contacts reported during one tick, in the order they arrived.
#[derive(Debug, Default)]
pub(crate) struct ContactLog {
    contacts: Vec<(Tag, ContactKind)>,
}

impl ContactLog {
    pub(crate) fn into_contacts(self) -> Vec<(Tag, ContactKind)> {
        self.contacts
    }
}

impl CollisionObserver for ContactLog {
    fn on_collision_enter(&mut self, tag: Tag) {
        self.contacts.push((tag, ContactKind::Enter));
    }

    fn on_collision_exit(&mut self, tag: Tag) {
        self.contacts.push((tag, ContactKind::Exit));
    }
}

impl TriggerObserver for ContactLog {
    fn on_trigger_enter(&mut self, tag: Tag) {
        self.contacts.push((tag, ContactKind::Enter));
    }

    fn on_trigger_exit(&mut self, tag: Tag) {
        self.contacts.push((tag, ContactKind::Exit));
    }
}
