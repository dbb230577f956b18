//! # procmesh
//!
//! Procedural island geometry and mesh simplification for Rust.
//!
//! This is the umbrella crate that provides convenient access to all procmesh functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Meshes, 2D bounds, seeded random streams and the shared error type
//! - **Procedural**: Rough island outlines, grid masks and island height maps
//! - **Simplification**: Randomized QEF edge collapse for generated sections
//!
//! ## Quick Start
//!
//! ```rust
//! use procmesh::prelude::*;
//!
//! fn main() -> procmesh::Result<()> {
//!     // Rough island outline fitted into a 64x64 grid
//!     let mut params = PolyIslandParams::new(Vector2f::new(64.0, 64.0));
//!     params.displacement_range = Vector2f::new(0.1, 0.4);
//!     let outline = generate_poly(&params)?;
//!
//!     // Rasterize it and build a height map
//!     let mut grid = GridData::new(64, 64);
//!     grid.draw_point_mask(&outline);
//!     IslandHeightMapTask::new(1, 2, MapGenerationInfo::with_target(0, HeightBlendType::Replace))
//!         .execute(&mut grid)?;
//!
//!     // Turn it into a mesh section and simplify
//!     let section = grid.create_mesh_section(0, 8.0, false);
//!     let simplified = QefEdgeCollapseSimplifier::new().simplify(&section)?;
//!     assert!(simplified.triangle_count() <= section.triangle_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables core, procedural and simplification
//! - `core`: Core data structures (always enabled)
//! - `procedural`: Island outlines and height maps
//! - `simplification`: QEF edge collapse simplification
//! - `all`: Enables all features

// Re-export core functionality
pub use procmesh_core::*;

// Re-export sub-crates
#[cfg(feature = "procedural")]
pub use procmesh_procedural as procedural;

#[cfg(feature = "simplification")]
pub use procmesh_simplification as simplification;

/// Convenient imports for common use cases
pub mod prelude {
    pub use procmesh_core::*;

    #[cfg(feature = "procedural")]
    pub use procmesh_procedural::*;

    #[cfg(feature = "simplification")]
    pub use procmesh_simplification::*;
}
