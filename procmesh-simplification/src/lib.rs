//! Mesh simplification for procedurally generated sections
//!
//! This crate reduces triangle count on generated terrain and island meshes
//! while keeping their open boundaries fixed, so neighbouring sections still
//! stitch together:
//! - Quadric error function solving for collapse positions
//! - Randomized, conflict free edge collapse passes
//! - Parallel simplification of independent sections

pub mod qef;
pub mod options;
pub mod edge_collapse;

pub use qef::*;
pub use options::*;
pub use edge_collapse::*;

use procmesh_core::{Result, TriangleMesh};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Simplify `mesh` using the simplifier's own configuration
    fn simplify(&self, mesh: &TriangleMesh) -> Result<TriangleMesh>;
}
