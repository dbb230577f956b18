//! Tuning parameters for QEF edge-collapse simplification

use serde::{Deserialize, Serialize};

/// Default seed for the candidate sampling stream
pub const DEFAULT_SEED: u32 = 1337;

/// Default cap on triangles incident to the two endpoints of a collapse
pub const DEFAULT_MAX_TRIANGLES_PER_VERTEX: i32 = 16;

/// Options controlling [`QefEdgeCollapseSimplifier`](crate::QefEdgeCollapseSimplifier).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifierOptions {
    /// Stop once the triangle count falls below this fraction of the input
    pub target_percentage: f32,
    /// Upper bound on collapse passes
    pub max_iteration: i32,
    /// Fraction of candidate edges sampled per pass.
    ///
    /// Sampling more edges finds more collapses per pass but also produces
    /// more conflicting candidates that get discarded.
    pub edge_fraction: f32,
    /// Maximum collapse cost, where cost is `1 / qef_error` plus the hub penalty
    pub max_error: f32,
    /// Edges longer than this are never collapsed
    pub max_edge_size: f32,
    /// Collapses whose endpoint normals have a smaller cosine are rejected
    pub min_angle_cosine: f32,
    /// Seed of the sampling stream
    pub seed: u32,
    /// Collapses whose endpoints touch more triangles than this are rejected
    pub max_triangles_per_vertex: i32,
}

impl Default for SimplifierOptions {
    fn default() -> Self {
        Self {
            target_percentage: 0.05,
            max_iteration: 10,
            edge_fraction: 0.125,
            max_error: 5.0,
            max_edge_size: 2.5,
            min_angle_cosine: 0.8,
            seed: DEFAULT_SEED,
            max_triangles_per_vertex: DEFAULT_MAX_TRIANGLES_PER_VERTEX,
        }
    }
}

impl SimplifierOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the options with negative counts and fractions clamped to zero
    pub fn sanitized(&self) -> Self {
        Self {
            target_percentage: self.target_percentage.max(0.0),
            max_iteration: self.max_iteration.max(0),
            edge_fraction: self.edge_fraction.max(0.0),
            max_triangles_per_vertex: self.max_triangles_per_vertex.max(0),
            ..*self
        }
    }

    pub fn with_target_percentage(mut self, target_percentage: f32) -> Self {
        self.target_percentage = target_percentage;
        self
    }

    pub fn with_max_iteration(mut self, max_iteration: i32) -> Self {
        self.max_iteration = max_iteration;
        self
    }

    pub fn with_edge_fraction(mut self, edge_fraction: f32) -> Self {
        self.edge_fraction = edge_fraction;
        self
    }

    pub fn with_max_error(mut self, max_error: f32) -> Self {
        self.max_error = max_error;
        self
    }

    pub fn with_max_edge_size(mut self, max_edge_size: f32) -> Self {
        self.max_edge_size = max_edge_size;
        self
    }

    pub fn with_min_angle_cosine(mut self, min_angle_cosine: f32) -> Self {
        self.min_angle_cosine = min_angle_cosine;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_triangles_per_vertex(mut self, max_triangles_per_vertex: i32) -> Self {
        self.max_triangles_per_vertex = max_triangles_per_vertex;
        self
    }
}
