//! Math utilities and types
//!
//! Provides the vector/matrix aliases used by the scene graph and physics,
//! plus the Euler-degree TRS composition the transform cache is built on.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Squared length below which a vector is treated as zero-length
pub const DEGENERATE_LENGTH_SQUARED: f32 = 1.0e-12;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Quat, Vec3, DEGENERATE_LENGTH_SQUARED};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Normalize a vector, returning zero for zero-length input instead of NaN
    pub fn safe_normalize(v: Vec3) -> Vec3 {
        let length_squared = v.magnitude_squared();
        if length_squared <= DEGENERATE_LENGTH_SQUARED || !length_squared.is_finite() {
            Vec3::zeros()
        } else {
            v / length_squared.sqrt()
        }
    }

    /// Rotation quaternion from Euler angles in degrees (roll about X, pitch about Y, yaw about Z)
    pub fn quat_from_euler_degrees(euler: &Vec3) -> Quat {
        Quat::from_euler_angles(
            deg_to_rad(euler.x),
            deg_to_rad(euler.y),
            deg_to_rad(euler.z),
        )
    }

    /// Compose a translation * rotation * scale matrix from an Euler-degree pose
    pub fn trs_matrix(position: &Vec3, rotation_degrees: &Vec3, scale: &Vec3) -> Mat4 {
        Mat4::new_translation(position)
            * quat_from_euler_degrees(rotation_degrees).to_homogeneous()
            * Mat4::new_nonuniform_scaling(scale)
    }

    /// Translation column of an affine matrix
    pub fn translation_of(matrix: &Mat4) -> Vec3 {
        Vec3::new(matrix.m14, matrix.m24, matrix.m34)
    }

    /// Basis column `index` (0 = X, 1 = Y, 2 = Z) of an affine matrix
    pub fn basis_column(matrix: &Mat4, index: usize) -> Vec3 {
        Vec3::new(matrix[(0, index)], matrix[(1, index)], matrix[(2, index)])
    }

    /// Unit vector along `axis` (0 = X, 1 = Y, 2 = Z)
    pub fn axis_unit(axis: usize) -> Vec3 {
        match axis {
            0 => Vec3::x(),
            1 => Vec3::y(),
            _ => Vec3::z(),
        }
    }
}
