//! Value types shared by every engine component.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an item: its index in the configured item catalogue.
///
/// Two items may share a category tag, but never an `ItemId`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub usize);

impl ItemId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Wraps any angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_heading(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unit vector in the (x, z) plane for a heading in degrees.
///
/// Heading 0 looks down +z, heading 90 looks down +x.
#[must_use]
pub fn heading_vector(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.sin(), radians.cos())
}

/// Planar agent pose: position in (x, z) and a heading in degrees.
///
/// Elevation, pitch and roll are not representable and therefore always zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec2,
    pub heading: f32,
}

impl Pose {
    pub const ORIGIN: Self = Self { position: Vec2::ZERO, heading: 0.0 };

    #[must_use]
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading: normalize_heading(heading) }
    }

    #[must_use]
    pub fn forward(&self) -> Vec2 {
        heading_vector(self.heading)
    }
}

/// Full rigid-body pose as reported by a collision service.
///
/// Angles are Euler angles in degrees. Only `yaw` survives flattening.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl BodyPose {
    #[must_use]
    pub fn planar(pose: Pose) -> Self {
        Self {
            position: Vec3::new(pose.position.x, 0.0, pose.position.y),
            pitch: 0.0,
            yaw: pose.heading,
            roll: 0.0,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.pitch.is_finite()
            && self.yaw.is_finite()
            && self.roll.is_finite()
    }
}

/// Tag of anything the agent can touch or a ray can hit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    Wall,
    Goal,
    Item(ItemId),
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Wall => f.write_str("wall"),
            Tag::Goal => f.write_str("goal"),
            Tag::Item(id) => id.fmt(f),
        }
    }
}

/// Whether a contact starts or ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Enter,
    Exit,
}

/// A scene object placed by the world: an item or the goal zone.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entity {
    pub tag: Tag,
    /// Resource category shared by interchangeable-looking items.
    pub category: String,
    pub position: Vec2,
    /// Collected items become inactive until the next reset.
    pub active: bool,
    /// Opaque cosmetic identifier, forwarded to renderers only.
    pub visual: String,
}

/// Classification of a world transition, produced by contact handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WorldEvent {
    None,
    PickedUpCorrect,
    PickedUpIncorrect,
    DeliveredCorrect,
    DeliveredIncorrect,
    WallHit,
}

impl WorldEvent {
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, WorldEvent::None)
    }
}

/// Why an episode ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TerminationCause {
    WallHit,
    /// The demanded item was reached in a task that ends on pickup.
    FoundCorrect,
    /// A wrong item was reached in a task that ends on wrong pickups.
    FoundIncorrect,
    DeliveredCorrect,
    DeliveredIncorrect,
    Timeout,
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationCause::WallHit => "wall hit",
            TerminationCause::FoundCorrect => "found correct item",
            TerminationCause::FoundIncorrect => "found incorrect item",
            TerminationCause::DeliveredCorrect => "delivered correctly",
            TerminationCause::DeliveredIncorrect => "delivered incorrectly",
            TerminationCause::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_wraps_into_range() {
        assert_eq!(normalize_heading(370.0), 10.0);
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(360.0), 0.0);
        let tiny = normalize_heading(-1e-9);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn heading_vector_axes() {
        let north = heading_vector(0.0);
        assert!((north - Vec2::new(0.0, 1.0)).length() < 1e-6);
        let east = heading_vector(90.0);
        assert!((east - Vec2::new(1.0, 0.0)).length() < 1e-6);
    }
}
