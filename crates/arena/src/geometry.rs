//! Planar intersection tests between rays, discs and the arena walls.

use glam::Vec2;

/// Distance along a unit ray to the first point of a disc, if any.
///
/// A ray starting inside the disc hits it at distance zero.
#[must_use]
pub fn ray_disc(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let offset = origin - center;
    let b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    // outside and pointing away
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

/// Distance along a unit ray from inside the square `[-half, half]^2` to its
/// boundary.
#[must_use]
pub fn ray_walls(origin: Vec2, direction: Vec2, half_extent: f32) -> f32 {
    let axis = |position: f32, heading: f32| {
        if heading > 0.0 {
            (half_extent - position) / heading
        } else if heading < 0.0 {
            (-half_extent - position) / heading
        } else {
            f32::INFINITY
        }
    };
    axis(origin.x, direction.x).min(axis(origin.y, direction.y)).max(0.0)
}

/// Whether two discs overlap.
#[must_use]
pub fn discs_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) < reach * reach
}

/// Clamps a disc centre so the disc stays inside the square. Returns the
/// clamped centre and whether it touched a wall.
#[must_use]
pub fn clamp_to_walls(center: Vec2, radius: f32, half_extent: f32) -> (Vec2, bool) {
    let limit = (half_extent - radius).max(0.0);
    let clamped = center.clamp(Vec2::splat(-limit), Vec2::splat(limit));
    let touching = clamped.x.abs() >= limit || clamped.y.abs() >= limit;
    (clamped, touching)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_disc_front() {
        let hit = ray_disc(Vec2::ZERO, Vec2::Y, Vec2::new(0.0, 5.0), 1.0);
        assert_eq!(hit, Some(4.0));
    }

    #[test]
    fn ray_misses_disc_behind_or_beside() {
        assert_eq!(ray_disc(Vec2::ZERO, Vec2::NEG_Y, Vec2::new(0.0, 5.0), 1.0), None);
        assert_eq!(ray_disc(Vec2::ZERO, Vec2::Y, Vec2::new(3.0, 5.0), 1.0), None);
    }

    #[test]
    fn ray_from_inside_disc_hits_immediately() {
        assert_eq!(ray_disc(Vec2::ZERO, Vec2::X, Vec2::new(0.5, 0.0), 1.0), Some(0.0));
    }

    #[test]
    fn ray_reaches_nearest_wall() {
        assert!((ray_walls(Vec2::ZERO, Vec2::X, 5.0) - 5.0).abs() < 1e-6);
        assert!((ray_walls(Vec2::new(1.0, 0.0), Vec2::NEG_X, 5.0) - 6.0).abs() < 1e-6);
        let diagonal = Vec2::ONE.normalize();
        assert!((ray_walls(Vec2::ZERO, diagonal, 5.0) - 5.0 * 2f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn clamping_reports_wall_contact() {
        let (inside, touching) = clamp_to_walls(Vec2::new(1.0, 1.0), 0.25, 5.0);
        assert_eq!(inside, Vec2::new(1.0, 1.0));
        assert!(!touching);

        let (clamped, touching) = clamp_to_walls(Vec2::new(9.0, -1.0), 0.25, 5.0);
        assert_eq!(clamped, Vec2::new(4.75, -1.0));
        assert!(touching);
    }

    #[test]
    fn overlap_is_strict() {
        assert!(discs_overlap(Vec2::ZERO, 0.5, Vec2::new(0.9, 0.0), 0.5));
        assert!(!discs_overlap(Vec2::ZERO, 0.5, Vec2::new(1.0, 0.0), 0.5));
    }
}
