//! Contact bookkeeping and impulse resolution
//!
//! Narrow phase works directly on the world AABBs of the two colliders: the
//! axis of least penetration gives the contact normal, positional correction
//! pushes the boxes apart in proportion to inverse mass, and a restitution
//! impulse followed by a Coulomb friction impulse updates the velocities.

use crate::foundation::math::{utils, Vec3};
use crate::physics::aabb::AABB;
use crate::scene::entity::{EntityId, EntityKey};

/// Tangential speeds below this produce no friction impulse
const TANGENT_EPSILON: f32 = 1.0e-6;

/// Unordered entity pair, smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    /// Entity with the smaller id
    pub first: EntityId,
    /// Entity with the larger id
    pub second: EntityId,
}

impl PairKey {
    /// Build the canonical key for two entities
    pub fn new(a: EntityId, b: EntityId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

/// What kind of contact a touching pair reported on enter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Solid contact: collision callbacks, resolved
    Collision,
    /// At least one trigger: trigger callbacks, never resolved
    Trigger,
}

/// A touching pair as remembered between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// Entity owning the smaller id
    pub first: EntityKey,
    /// Entity owning the larger id
    pub second: EntityKey,
    /// Collision or trigger
    pub kind: ContactKind,
}

/// One side of a contact as the solver sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactBody {
    /// World bounds
    pub aabb: AABB,
    /// 0 means immovable
    pub inverse_mass: f32,
    /// Linear velocity
    pub velocity: Vec3,
}

/// Solver output: what to add to each side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactResolution {
    /// Unit normal pointing from B toward A
    pub normal: Vec3,
    /// Penetration depth along the normal
    pub depth: f32,
    /// Position change for A
    pub correction_a: Vec3,
    /// Position change for B
    pub correction_b: Vec3,
    /// Velocity change for A
    pub delta_velocity_a: Vec3,
    /// Velocity change for B
    pub delta_velocity_b: Vec3,
}

/// Least-penetration axis of two overlapping boxes.
///
/// Ties prefer X, then Y, then Z. Returns `None` unless all three axes
/// overlap by a positive amount.
pub fn contact_normal(a: &AABB, b: &AABB) -> Option<(Vec3, f32)> {
    let overlap = a.overlap(b);
    if (0..3).any(|axis| overlap[axis] <= 0.0) {
        return None;
    }

    let mut axis = 0;
    for candidate in 1..3 {
        if overlap[candidate] < overlap[axis] {
            axis = candidate;
        }
    }

    let separation = a.center()[axis] - b.center()[axis];
    let sign = if separation < 0.0 { -1.0 } else { 1.0 };
    Some((utils::axis_unit(axis) * sign, overlap[axis]))
}

/// Resolve one solid contact.
///
/// Returns `None` when the boxes do not penetrate or when both sides are
/// immovable. Velocity deltas stay zero while the bodies already separate.
pub fn resolve(a: &ContactBody, b: &ContactBody, restitution: f32, friction: f32) -> Option<ContactResolution> {
    let total_inverse_mass = a.inverse_mass + b.inverse_mass;
    if total_inverse_mass <= 0.0 {
        return None;
    }
    let (normal, depth) = contact_normal(&a.aabb, &b.aabb)?;

    let correction = normal * (depth / total_inverse_mass);
    let mut resolution = ContactResolution {
        normal,
        depth,
        correction_a: correction * a.inverse_mass,
        correction_b: -correction * b.inverse_mass,
        delta_velocity_a: Vec3::zeros(),
        delta_velocity_b: Vec3::zeros(),
    };

    let relative = a.velocity - b.velocity;
    let normal_speed = relative.dot(&normal);
    if normal_speed >= 0.0 {
        return Some(resolution);
    }

    let j = -(1.0 + restitution) * normal_speed / total_inverse_mass;
    let normal_impulse = normal * j;
    resolution.delta_velocity_a += normal_impulse * a.inverse_mass;
    resolution.delta_velocity_b -= normal_impulse * b.inverse_mass;

    let relative = (a.velocity + resolution.delta_velocity_a) - (b.velocity + resolution.delta_velocity_b);
    let tangential = relative - normal * relative.dot(&normal);
    let tangential_speed = tangential.norm();
    if tangential_speed > TANGENT_EPSILON {
        let tangent = tangential / tangential_speed;
        let max_friction = j * friction;
        let jt = (-relative.dot(&tangent) / total_inverse_mass).clamp(-max_friction, max_friction);
        let friction_impulse = tangent * jt;
        resolution.delta_velocity_a += friction_impulse * a.inverse_mass;
        resolution.delta_velocity_b -= friction_impulse * b.inverse_mass;
    }

    Some(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube(center: Vec3) -> AABB {
        AABB::from_center_extents(center, Vec3::new(0.5, 0.5, 0.5))
    }

    fn body(center: Vec3, inverse_mass: f32, velocity: Vec3) -> ContactBody {
        ContactBody {
            aabb: cube(center),
            inverse_mass,
            velocity,
        }
    }

    #[test]
    fn test_pair_key_is_unordered() {
        let a = EntityId::new(9);
        let b = EntityId::new(2);
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
        assert_eq!(PairKey::new(a, b).first, b);
    }

    #[test]
    fn test_normal_points_from_b_to_a() {
        let (normal, depth) = contact_normal(&cube(Vec3::zeros()), &cube(Vec3::new(0.8, 0.0, 0.0))).unwrap();
        assert_relative_eq!(normal, Vec3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(depth, 0.2, epsilon = 1.0e-6);
    }

    #[test]
    fn test_axis_tie_prefers_x() {
        let (normal, _) = contact_normal(&cube(Vec3::zeros()), &cube(Vec3::new(0.5, 0.5, 0.5))).unwrap();
        assert_relative_eq!(normal, Vec3::new(-1.0, 0.0, 0.0));

        let (normal, _) = contact_normal(&cube(Vec3::zeros()), &cube(Vec3::new(0.0, 0.5, 0.5))).unwrap();
        assert_relative_eq!(normal, Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_touching_faces_do_not_resolve() {
        assert!(contact_normal(&cube(Vec3::zeros()), &cube(Vec3::new(1.0, 0.0, 0.0))).is_none());
    }

    #[test]
    fn test_equal_masses_split_correction() {
        let a = body(Vec3::zeros(), 1.0, Vec3::zeros());
        let b = body(Vec3::new(0.8, 0.0, 0.0), 1.0, Vec3::zeros());
        let resolution = resolve(&a, &b, 0.2, 0.5).unwrap();

        assert_relative_eq!(resolution.correction_a, Vec3::new(-0.1, 0.0, 0.0), epsilon = 1.0e-6);
        assert_relative_eq!(resolution.correction_b, Vec3::new(0.1, 0.0, 0.0), epsilon = 1.0e-6);
    }

    #[test]
    fn test_immovable_side_takes_nothing() {
        let a = body(Vec3::zeros(), 1.0, Vec3::zeros());
        let b = body(Vec3::new(0.8, 0.0, 0.0), 0.0, Vec3::zeros());
        let resolution = resolve(&a, &b, 0.2, 0.5).unwrap();

        assert_relative_eq!(resolution.correction_a, Vec3::new(-0.2, 0.0, 0.0), epsilon = 1.0e-6);
        assert_eq!(resolution.correction_b, Vec3::zeros());
    }

    #[test]
    fn test_both_immovable_is_skipped() {
        let a = body(Vec3::zeros(), 0.0, Vec3::zeros());
        let b = body(Vec3::new(0.8, 0.0, 0.0), 0.0, Vec3::zeros());
        assert!(resolve(&a, &b, 0.2, 0.5).is_none());
    }

    #[test]
    fn test_restitution_impulse() {
        // A falls onto static B at 10 m/s.
        let a = body(Vec3::new(0.0, 0.9, 0.0), 1.0, Vec3::new(0.0, -10.0, 0.0));
        let b = body(Vec3::zeros(), 0.0, Vec3::zeros());
        let resolution = resolve(&a, &b, 0.2, 0.5).unwrap();

        assert_relative_eq!(resolution.normal, Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(a.velocity + resolution.delta_velocity_a, Vec3::new(0.0, 2.0, 0.0), epsilon = 1.0e-5);
    }

    #[test]
    fn test_separating_bodies_get_no_impulse() {
        let a = body(Vec3::zeros(), 1.0, Vec3::new(-1.0, 0.0, 0.0));
        let b = body(Vec3::new(0.8, 0.0, 0.0), 1.0, Vec3::new(1.0, 0.0, 0.0));
        let resolution = resolve(&a, &b, 0.2, 0.5).unwrap();

        assert_eq!(resolution.delta_velocity_a, Vec3::zeros());
        assert_eq!(resolution.delta_velocity_b, Vec3::zeros());
    }

    #[test]
    fn test_friction_is_capped() {
        // Fast slide with a small normal speed: friction cannot stop the slide.
        let a = body(Vec3::new(0.0, 0.9, 0.0), 1.0, Vec3::new(10.0, -1.0, 0.0));
        let b = body(Vec3::zeros(), 0.0, Vec3::zeros());
        let resolution = resolve(&a, &b, 0.2, 0.5).unwrap();

        // j = 1.2, friction cap = 0.6
        let velocity = a.velocity + resolution.delta_velocity_a;
        assert_relative_eq!(velocity.x, 9.4, epsilon = 1.0e-5);
        assert_relative_eq!(velocity.y, 0.2, epsilon = 1.0e-5);
    }
}
