//! Axis-aligned bounding boxes and rays
//!
//! Colliders are reduced to world-space [`AABB`]s for both the broad phase and
//! the narrow phase; ray queries use the slab method against the same boxes.

use crate::foundation::math::{utils, Vec3};
use crate::scene::entity::{EntityId, EntityKey};

/// Direction components smaller than this are treated as parallel to a slab
const PARALLEL_EPSILON: f32 = 1.0e-8;

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl AABB {
    /// Box from corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered at `center` with half-size `extents`
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        let extents = extents.abs();
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-size
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Point containment (inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Overlap on all three axes; touching faces count
    pub fn intersects(&self, other: &AABB) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && self.max[axis] >= other.min[axis])
    }

    /// Per-axis penetration depth `min(maxA, maxB) - max(minA, minB)`
    pub fn overlap(&self, other: &AABB) -> Vec3 {
        Vec3::from_fn(|axis, _| self.max[axis].min(other.max[axis]) - self.min[axis].max(other.min[axis]))
    }

    /// Slab test. Returns the entry distance and the face normal that was hit.
    ///
    /// A ray starting inside the box reports distance 0 and a normal opposing
    /// the ray direction.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut enter_axis = None;
        let mut enter_sign = 0.0;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction.abs() < PARALLEL_EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            if t0 > t_enter {
                t_enter = t0;
                enter_axis = Some(axis);
                enter_sign = -direction.signum();
            }
            t_exit = t_exit.min(t1);

            if t_enter > t_exit {
                return None;
            }
        }

        if t_exit < 0.0 {
            return None;
        }

        if t_enter < 0.0 {
            return Some((0.0, -ray.direction));
        }

        let normal = enter_axis.map_or(-ray.direction, |axis| utils::axis_unit(axis) * enter_sign);
        Some((t_enter, normal))
    }
}

/// Half-line used for scene queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin in world space
    pub origin: Vec3,
    /// Unit direction (zero if constructed from a degenerate vector)
    pub direction: Vec3,
}

impl Ray {
    /// Ray from origin and direction; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: utils::safe_normalize(direction),
        }
    }

    /// Point at distance `t`
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest collider hit by a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Entity owning the collider
    pub entity: EntityKey,
    /// Stable id of that entity
    pub entity_id: EntityId,
    /// Index of the collider unit on the entity
    pub component_index: usize,
    /// Distance along the ray
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Face normal at the hit point
    pub normal: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> AABB {
        AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_aabb_intersects() {
        let a = AABB::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let b = AABB::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        let c = AABB::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(7.0, 7.0, 7.0));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(unit_box().contains_point(Vec3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_overlap_depth() {
        let a = AABB::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5));
        let b = AABB::from_center_extents(Vec3::new(0.8, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(a.overlap(&b), Vec3::new(0.2, 1.0, 1.0), epsilon = 1.0e-6);
    }

    #[test]
    fn test_ray_hits_front_face() {
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let (distance, normal) = unit_box().intersect_ray(&ray).unwrap();
        assert_relative_eq!(distance, 4.0);
        assert_relative_eq!(normal, Vec3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(ray.point_at(distance), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_parallel_ray_outside_slab_misses() {
        let ray = Ray::new(Vec3::new(-5.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(unit_box().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert!(unit_box().intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_ray_from_inside() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0));
        let (distance, _) = unit_box().intersect_ray(&ray).unwrap();
        assert_eq!(distance, 0.0);
    }
}
