//! Math utilities and types
//!
//! Provides the vector types used by entities and the integration step.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Clamp the length of `v` to `max_length`.
    ///
    /// A `max_length` of zero or less means "no limit" and returns `v` unchanged.
    pub fn clamp_magnitude(v: Vec3, max_length: f32) -> Vec3 {
        if max_length <= 0.0 {
            return v;
        }
        let length = v.magnitude();
        if length > max_length {
            v * (max_length / length)
        } else {
            v
        }
    }
}
