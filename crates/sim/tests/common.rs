#![allow(dead_code)]

use glam::{Vec2, Vec3};
use sim::{
    BodyPose, CollaboratorError, CollisionService, ContactKind, ContactObserver, CosmeticEvent,
    CosmeticSink, EngineConfig, ItemId, ItemSpec, Pose, RayHit, Scene, SpatialQuery, Tag,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Test double for both collaborators.
///
/// Every ray answers with `hit`. Each tick pops one entry off `script` and
/// reports those contacts; an exhausted script reports none. `drift` is added
/// to every resolved body pose to imitate an engine that lets the body bounce.
#[derive(Default)]
pub struct ScriptedPhysics {
    pub hit: Option<RayHit>,
    pub script: VecDeque<Vec<(Tag, ContactKind)>>,
    pub drift: Option<BodyPose>,
    pub fail_on_tick: Option<usize>,
    pub ticks: usize,
    pub episodes: usize,
}

impl ScriptedPhysics {
    pub fn open() -> Self {
        Self::default()
    }

    /// Quiet for `quiet` ticks, then enters `tag`.
    pub fn touch_after(quiet: usize, tag: Tag) -> Self {
        let mut script: VecDeque<_> = std::iter::repeat_with(Vec::new).take(quiet).collect();
        script.push_back(vec![(tag, ContactKind::Enter)]);
        Self { script, ..Self::default() }
    }

    pub fn then(mut self, contacts: Vec<(Tag, ContactKind)>) -> Self {
        self.script.push_back(contacts);
        self
    }

    pub fn with_hit(mut self, distance: f32, tag: Tag) -> Self {
        self.hit = Some(RayHit { distance, tag });
        self
    }

    pub fn failing_on_tick(mut self, tick: usize) -> Self {
        self.fail_on_tick = Some(tick);
        self
    }
}

impl SpatialQuery for ScriptedPhysics {
    fn raycast(
        &self,
        _scene: &Scene<'_>,
        _origin: Vec2,
        _direction: Vec2,
        _max_distance: f32,
    ) -> Result<Option<RayHit>, CollaboratorError> {
        Ok(self.hit)
    }
}

impl CollisionService for ScriptedPhysics {
    fn begin_episode(&mut self, _scene: &Scene<'_>) -> Result<(), CollaboratorError> {
        self.episodes += 1;
        Ok(())
    }

    fn advance(
        &mut self,
        _scene: &Scene<'_>,
        target: Pose,
        _dt: f32,
        observer: &mut dyn ContactObserver,
    ) -> Result<BodyPose, CollaboratorError> {
        let tick = self.ticks;
        self.ticks += 1;
        if self.fail_on_tick == Some(tick) {
            return Err(CollaboratorError::CollisionService(format!("solver diverged on tick {tick}")));
        }
        for (tag, kind) in self.script.pop_front().unwrap_or_default() {
            match (tag, kind) {
                (Tag::Wall, ContactKind::Enter) => observer.on_collision_enter(tag),
                (Tag::Wall, ContactKind::Exit) => observer.on_collision_exit(tag),
                (_, ContactKind::Enter) => observer.on_trigger_enter(tag),
                (_, ContactKind::Exit) => observer.on_trigger_exit(tag),
            }
        }
        let mut body = BodyPose::planar(target);
        if let Some(drift) = self.drift {
            body.position += drift.position;
            body.pitch += drift.pitch;
            body.roll += drift.roll;
        }
        Ok(body)
    }
}

/// Collects cosmetic events from a controller running elsewhere.
#[derive(Clone, Default)]
pub struct Recorder(pub Arc<Mutex<Vec<CosmeticEvent>>>);

impl CosmeticSink for Recorder {
    fn publish(&mut self, event: &CosmeticEvent) {
        if let Ok(mut events) = self.0.lock() {
            events.push(event.clone());
        }
    }
}

pub fn four_items() -> Vec<ItemSpec> {
    vec![
        ItemSpec::new("Resource_Blue"),
        ItemSpec::new("Resource_Yellow"),
        ItemSpec::new("Resource_Red"),
        ItemSpec::new("Resource_Green"),
    ]
}

/// Item demanded after `reset(seed)` under `config`.
pub fn demanded_for(config: &EngineConfig, seed: u64) -> ItemId {
    let mut world = sim::WorldState::new(config);
    world.reset(seed);
    world.demanded()
}

/// Some item other than `id`.
pub fn other_than(id: ItemId) -> ItemId {
    ItemId((id.index() + 1) % 4)
}

pub fn drift() -> BodyPose {
    BodyPose { position: Vec3::new(0.0, 0.05, 0.0), pitch: 3.0, yaw: 0.0, roll: -2.0 }
}
