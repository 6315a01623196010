//! Fixed-tick kinematic integration.
//!
//! The integrator only proposes a target pose. The collision service decides
//! where the body actually ends up, and the result is flattened back onto the
//! plane: any elevation, pitch or roll the service introduces is discarded.

use crate::action::MotionCommand;
use crate::collaborator::{CollisionService, ContactObserver};
use crate::error::CollaboratorError;
use crate::types::{BodyPose, Pose};
use crate::world::WorldState;
use glam::Vec2;

#[derive(Copy, Clone, Debug)]
pub struct MotionIntegrator {
    dt: f32,
}

impl MotionIntegrator {
    #[must_use]
    pub const fn new(tick_seconds: f32) -> Self {
        Self { dt: tick_seconds }
    }

    /// Pose after one tick of `command`, ignoring collisions.
    ///
    /// Translation uses the heading at the start of the tick.
    #[must_use]
    pub fn target(&self, pose: Pose, command: MotionCommand) -> Pose {
        let position = pose.position + pose.forward() * command.linear * self.dt;
        Pose::new(position, pose.heading + command.angular * self.dt)
    }

    /// Advances the agent one tick through `collision` and stores the
    /// resolved, flattened pose in `world`.
    pub fn step<C: CollisionService + ?Sized>(
        &self,
        collision: &mut C,
        world: &mut WorldState,
        command: MotionCommand,
        observer: &mut dyn ContactObserver,
    ) -> Result<Pose, CollaboratorError> {
        let target = self.target(world.agent().pose, command);
        let body = collision.advance(&world.scene(), target, self.dt, observer)?;
        let pose = flatten(body)?;
        world.set_pose(pose);
        Ok(pose)
    }
}

/// Projects a rigid-body pose onto the (x, z) plane, keeping only yaw.
pub fn flatten(body: BodyPose) -> Result<Pose, CollaboratorError> {
    if !body.is_finite() {
        return Err(CollaboratorError::Malformed(format!("non-finite body pose {body:?}")));
    }
    Ok(Pose::new(Vec2::new(body.position.x, body.position.z), body.yaw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::types::Tag;
    use glam::Vec3;

    /// Accepts every target but lets the body bounce and tilt.
    struct Wobbly;

    impl CollisionService for Wobbly {
        fn advance(
            &mut self,
            _scene: &crate::collaborator::Scene<'_>,
            target: Pose,
            _dt: f32,
            observer: &mut dyn ContactObserver,
        ) -> Result<BodyPose, CollaboratorError> {
            observer.on_collision_enter(Tag::Wall);
            Ok(BodyPose {
                position: Vec3::new(target.position.x, 0.3, target.position.y),
                pitch: 12.0,
                yaw: target.heading,
                roll: -4.0,
            })
        }
    }

    #[derive(Default)]
    struct Count(usize);

    impl crate::collaborator::CollisionObserver for Count {
        fn on_collision_enter(&mut self, _tag: Tag) {
            self.0 += 1;
        }
    }

    impl crate::collaborator::TriggerObserver for Count {
        fn on_trigger_enter(&mut self, _tag: Tag) {}
        fn on_trigger_exit(&mut self, _tag: Tag) {}
    }

    #[test]
    fn forward_moves_along_heading() {
        let integrator = MotionIntegrator::new(0.5);
        let pose = Pose::new(Vec2::ZERO, 90.0);
        let next = integrator.target(pose, MotionCommand { linear: 2.0, angular: 0.0 });
        assert!((next.position - Vec2::new(1.0, 0.0)).length() < 1e-5);
        assert_eq!(next.heading, 90.0);
    }

    #[test]
    fn turning_wraps_heading() {
        let integrator = MotionIntegrator::new(0.02);
        let pose = Pose::new(Vec2::ZERO, 1.0);
        let next = integrator.target(pose, MotionCommand { linear: 0.0, angular: -180.0 });
        assert!((next.heading - 357.4).abs() < 1e-3);
        assert_eq!(next.position, Vec2::ZERO);
    }

    #[test]
    fn drift_is_flattened_away() {
        let config = EngineConfig::warehouse();
        let mut world = WorldState::new(&config);
        world.reset(2);
        let integrator = MotionIntegrator::new(config.motion.tick_seconds);
        let mut observer = Count::default();
        for _ in 0..10 {
            let pose = integrator
                .step(&mut Wobbly, &mut world, MotionCommand { linear: 3.0, angular: 0.0 }, &mut observer)
                .unwrap();
            assert_eq!(pose, world.agent().pose);
        }
        assert_eq!(observer.0, 10);
        let pose = world.agent().pose;
        let travelled = pose.position.length();
        assert!((travelled - 10.0 * 3.0 * 0.02).abs() < 1e-4);
    }

    #[test]
    fn non_finite_body_is_malformed() {
        let body = BodyPose { position: Vec3::new(f32::NAN, 0.0, 0.0), pitch: 0.0, yaw: 0.0, roll: 0.0 };
        assert!(matches!(flatten(body), Err(CollaboratorError::Malformed(_))));
        let body = BodyPose::planar(Pose::new(Vec2::new(1.0, 2.0), 45.0));
        assert_eq!(flatten(body).unwrap(), Pose::new(Vec2::new(1.0, 2.0), 45.0));
    }
}
