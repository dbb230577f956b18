//! Procedural island generation
//!
//! This crate builds the 2D and grid inputs of island meshes:
//! - Rough island outlines from randomly jittered polygon subdivision
//! - Grid data with solid/border classification and blended height maps
//! - Island height maps from a border flood fill

pub mod poly_island;
pub mod grid;
pub mod island_height;

pub use poly_island::*;
pub use grid::*;
pub use island_height::*;
