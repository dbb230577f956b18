//! Point and vector aliases

use nalgebra::{Point2, Point3, Vector2, Vector3};

/// A 2D point with floating point coordinates
pub type Point2f = Point2<f32>;

/// A 2D vector with floating point components
pub type Vector2f = Vector2<f32>;

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Normal assumed for vertices of meshes that carry no normals
pub fn up_vector() -> Vector3f {
    Vector3f::new(0.0, 0.0, 1.0)
}
