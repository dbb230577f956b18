//! Core data structures and traits for procmesh
//!
//! This crate provides the fundamental types shared by the mesh simplifier
//! and the procedural island generators: point aliases, indexed triangle
//! meshes, 2D bounds, seeded random streams and the common error type.

pub mod point;
pub mod mesh;
pub mod bounds;
pub mod random;
pub mod traits;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use bounds::*;
pub use random::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Point3, Vector2, Vector3, Matrix3};

/// Tolerance used when guarding against degenerate sizes
pub const KINDA_SMALL_NUMBER: f32 = 1.0e-4;
