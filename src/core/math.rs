//! Vector helpers shared by steering, movement and spatial queries
//!
//! Everything moves on the XZ plane; y is kept at zero by the movers.

use glam::Vec3;

/// Vectors at or below this length are treated as zero
pub const ZERO_LENGTH: f32 = 1e-4;

/// Normalize, returning zero for (near) zero-length input
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len = v.length();
    if len <= ZERO_LENGTH {
        Vec3::ZERO
    } else {
        v / len
    }
}

/// Clamp a vector to a maximum length
///
/// Near-zero vectors collapse to zero instead of being divided by their
/// length.
#[inline]
pub fn limit(v: Vec3, max_length: f32) -> Vec3 {
    let len = v.length();
    if len <= ZERO_LENGTH {
        return Vec3::ZERO;
    }
    if len > max_length {
        v * (max_length.max(0.0) / len)
    } else {
        v
    }
}

/// Drop the vertical component
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Unit vector on the XZ plane for an angle in radians
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec3 {
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Step `position` toward `target` by at most `step`
///
/// Returns the new position and whether the target was reached.
pub fn step_toward(position: Vec3, target: Vec3, step: f32, arrive_distance: f32) -> (Vec3, bool) {
    let to_target = flatten(target - position);
    let dist = to_target.length();
    if dist <= arrive_distance {
        return (position, true);
    }
    if dist <= step {
        return (Vec3::new(target.x, position.y, target.z), true);
    }
    (position + to_target / dist * step, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_short_vector_untouched() {
        let v = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(limit(v, 5.0), v);
    }

    #[test]
    fn test_limit_clamps_long_vector() {
        let v = Vec3::new(30.0, 0.0, 40.0);
        let l = limit(v, 5.0);
        assert!((l.length() - 5.0).abs() < 1e-4);
        assert!((l.x - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_limit_tiny_vector_is_zero() {
        assert_eq!(limit(Vec3::new(1e-5, 0.0, 0.0), 1.0), Vec3::ZERO);
    }

    #[test]
    fn test_normalize_or_zero() {
        assert_eq!(normalize_or_zero(Vec3::ZERO), Vec3::ZERO);
        let n = normalize_or_zero(Vec3::new(0.0, 0.0, 3.0));
        assert!((n.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_toward_arrives() {
        let (pos, arrived) = step_toward(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 4.0, 0.5);
        assert!(!arrived);
        assert!((pos.x - 4.0).abs() < 1e-5);

        let (pos, arrived) = step_toward(pos, Vec3::new(10.0, 0.0, 0.0), 10.0, 0.5);
        assert!(arrived);
        assert!((pos.x - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_step_toward_inside_arrive_distance_stays_put() {
        let start = Vec3::new(1.0, 0.0, 1.0);
        let (pos, arrived) = step_toward(start, Vec3::new(1.2, 0.0, 1.0), 4.0, 0.5);
        assert!(arrived);
        assert_eq!(pos, start);
    }
}
