//! # World State
//!
//! Owns entity and agent placement, the held/demanded item identities, and the
//! episode's private random stream.
//!
//! All randomness of an episode comes from one `fastrand::Rng` seeded at
//! [`WorldState::reset`]. Draw order is fixed: heading, item positions in
//! catalogue order, goal position, demanded item, pre-held roll. The same seed
//! therefore always yields the same placement and demand.
//!
//! `held` and entity `active` flags change only through contact handling
//! ([`WorldState::record_event`]) or the explicit pickup/drop transitions.

use crate::collaborator::{CosmeticEvent, Scene};
use crate::config::{EngineConfig, ShapingTarget, SpawnConfig};
use crate::types::{ContactKind, Entity, ItemId, Pose, Tag, WorldEvent};
use glam::Vec2;
use std::collections::BTreeSet;
use tracing::debug;

/// Agent bookkeeping for the current episode.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    pub pose: Pose,
    pub held: Option<ItemId>,
    pub demanded: ItemId,
    pub cumulative_reward: f32,
    pub step: u32,
}

impl AgentState {
    fn start(pose: Pose, demanded: ItemId) -> Self {
        Self { pose, held: None, demanded, cumulative_reward: 0.0, step: 0 }
    }
}

pub struct WorldState {
    rng: fastrand::Rng,
    spawn: SpawnConfig,
    preheld_probability: f32,
    explicit_pickup: bool,
    penalize_empty_delivery: bool,
    agent: AgentState,
    items: Vec<Entity>,
    goal: Option<Entity>,
    /// Items currently overlapped, tracked only with explicit pickup.
    nearby: BTreeSet<ItemId>,
    in_goal: bool,
    cosmetics: Vec<CosmeticEvent>,
}

/// Uniform offset in `[-bound, bound)` on both axes.
fn sample_offset(rng: &fastrand::Rng, bound: f32) -> Vec2 {
    let x = (rng.f32() * 2.0 - 1.0) * bound;
    let z = (rng.f32() * 2.0 - 1.0) * bound;
    Vec2::new(x, z)
}

impl WorldState {
    /// Builds an unplaced world. Every entity stays inactive until `reset`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let items = config
            .items
            .iter()
            .enumerate()
            .map(|(index, spec)| Entity {
                tag: Tag::Item(ItemId(index)),
                category: spec.category.clone(),
                position: Vec2::ZERO,
                active: false,
                visual: spec.visual.clone(),
            })
            .collect();
        let goal = config.task.kind.has_goal().then(|| Entity {
            tag: Tag::Goal,
            category: "Warehouse".to_owned(),
            position: Vec2::ZERO,
            active: false,
            visual: "Warehouse".to_owned(),
        });
        Self {
            rng: fastrand::Rng::with_seed(0),
            spawn: config.spawn.clone(),
            preheld_probability: config.task.preheld_probability,
            explicit_pickup: config.task.action_set.uses_explicit_pickup(),
            penalize_empty_delivery: config.task.penalize_empty_delivery,
            agent: AgentState::start(Pose::ORIGIN, ItemId(0)),
            items,
            goal,
            nearby: BTreeSet::new(),
            in_goal: false,
            cosmetics: Vec::new(),
        }
    }

    /// Re-randomizes the world from `seed`.
    pub fn reset(&mut self, seed: u64) {
        self.rng = fastrand::Rng::with_seed(seed);
        let heading = self.rng.f32() * 360.0;

        for item in &mut self.items {
            item.position = sample_offset(&self.rng, self.spawn.item_bound);
            item.active = true;
        }
        if let Some(goal) = &mut self.goal {
            goal.position = sample_offset(&self.rng, self.spawn.goal_bound);
            goal.active = true;
        }

        let demanded = ItemId(self.rng.usize(..self.items.len()));
        let preheld = self.rng.f32() < self.preheld_probability;

        self.agent = AgentState::start(Pose::new(Vec2::ZERO, heading), demanded);
        self.nearby.clear();
        self.in_goal = false;
        if preheld {
            self.agent.held = Some(demanded);
            self.items[demanded.index()].active = false;
        }

        self.cosmetics.clear();
        self.cosmetics.push(CosmeticEvent::DemandChanged {
            item: demanded,
            visual: self.items[demanded.index()].visual.clone(),
        });
        self.publish_held();
        debug!(seed, %demanded, preheld, heading, "world reset");
    }

    /// Applies one contact reported by the collision service.
    pub fn record_event(&mut self, tag: Tag, kind: ContactKind) -> WorldEvent {
        match tag {
            Tag::Wall => match kind {
                ContactKind::Enter => WorldEvent::WallHit,
                ContactKind::Exit => WorldEvent::None,
            },
            Tag::Item(id) => {
                if self.explicit_pickup {
                    match kind {
                        ContactKind::Enter if self.is_active(id) => {
                            self.nearby.insert(id);
                        }
                        ContactKind::Enter => {}
                        ContactKind::Exit => {
                            self.nearby.remove(&id);
                        }
                    }
                    WorldEvent::None
                } else if kind == ContactKind::Enter && self.is_active(id) {
                    self.take(id)
                } else {
                    WorldEvent::None
                }
            }
            Tag::Goal => {
                if self.goal.is_none() {
                    return WorldEvent::None;
                }
                if self.explicit_pickup {
                    self.in_goal = kind == ContactKind::Enter;
                    WorldEvent::None
                } else if kind == ContactKind::Enter {
                    self.deliver(self.penalize_empty_delivery)
                } else {
                    WorldEvent::None
                }
            }
        }
    }

    /// Explicit pickup: succeeds only with the demanded item within reach and
    /// nothing held.
    pub fn pickup(&mut self) -> WorldEvent {
        let demanded = self.agent.demanded;
        if self.nearby.contains(&demanded) && self.is_active(demanded) {
            self.take(demanded)
        } else {
            WorldEvent::PickedUpIncorrect
        }
    }

    /// Explicit drop: succeeds only inside the goal zone with the demanded item.
    pub fn drop_held(&mut self) -> WorldEvent {
        if self.in_goal {
            self.deliver(true)
        } else {
            WorldEvent::DeliveredIncorrect
        }
    }

    fn take(&mut self, id: ItemId) -> WorldEvent {
        if self.agent.held.is_some() || id != self.agent.demanded {
            return WorldEvent::PickedUpIncorrect;
        }
        self.agent.held = Some(id);
        self.items[id.index()].active = false;
        self.nearby.remove(&id);
        self.publish_held();
        WorldEvent::PickedUpCorrect
    }

    fn deliver(&mut self, penalize_empty: bool) -> WorldEvent {
        match self.agent.held {
            // identity, not category: two items may share a colour
            Some(held) if held == self.agent.demanded => {
                self.agent.held = None;
                self.publish_held();
                WorldEvent::DeliveredCorrect
            }
            Some(_) => WorldEvent::DeliveredIncorrect,
            None if penalize_empty => WorldEvent::DeliveredIncorrect,
            None => WorldEvent::None,
        }
    }

    fn publish_held(&mut self) {
        let held = self.agent.held;
        let visual = held.map(|id| self.items[id.index()].visual.clone());
        self.cosmetics.push(CosmeticEvent::HeldChanged { item: held, visual });
    }

    fn is_active(&self, id: ItemId) -> bool {
        self.items.get(id.index()).is_some_and(|item| item.active)
    }

    /// Whether `tag` names something that exists in this world.
    #[must_use]
    pub fn knows(&self, tag: Tag) -> bool {
        match tag {
            Tag::Wall => true,
            Tag::Goal => self.goal.is_some(),
            Tag::Item(id) => id.index() < self.items.len(),
        }
    }

    #[must_use]
    pub fn scene(&self) -> Scene<'_> {
        Scene { agent: self.agent.pose, items: &self.items, goal: self.goal.as_ref() }
    }

    #[must_use]
    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    #[must_use]
    pub fn items(&self) -> &[Entity] {
        &self.items
    }

    #[must_use]
    pub fn goal(&self) -> Option<&Entity> {
        self.goal.as_ref()
    }

    #[must_use]
    pub fn demanded(&self) -> ItemId {
        self.agent.demanded
    }

    #[must_use]
    pub fn held(&self) -> Option<ItemId> {
        self.agent.held
    }

    /// Position the shaping potential measures distance to.
    #[must_use]
    pub fn shaping_target(&self, target: ShapingTarget) -> Option<Vec2> {
        let demanded = self.items.get(self.agent.demanded.index()).map(|item| item.position);
        let goal = self.goal.as_ref().map(|goal| goal.position);
        match target {
            ShapingTarget::Goal => goal,
            ShapingTarget::DemandedItem => demanded,
            ShapingTarget::Task if self.agent.held.is_some() => goal.or(demanded),
            ShapingTarget::Task => demanded,
        }
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.agent.pose = pose;
    }

    pub(crate) fn finish_step(&mut self, reward: f32) {
        self.agent.step += 1;
        self.agent.cumulative_reward += reward;
    }

    pub(crate) fn drain_cosmetics(&mut self) -> Vec<CosmeticEvent> {
        std::mem::take(&mut self.cosmetics)
    }
}
