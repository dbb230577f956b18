//! Randomized QEF edge collapse simplification
//!
//! Each pass samples a random subset of the interior edges, scores every
//! sampled edge by solving a quadric error function over its two endpoints,
//! and collapses the edges that are the cheapest choice for both of their
//! endpoints. Since no vertex takes part in more than one collapse per pass,
//! all accepted collapses of a pass can be applied through a single
//! vertex-to-vertex mapping without conflicts.
//!
//! Edges touching the open boundary of the mesh are never candidates, so
//! boundary vertices keep their exact positions.

use crate::options::SimplifierOptions;
use crate::qef;
use crate::MeshSimplifier;
use itertools::Itertools;
use procmesh_core::{up_vector, Point3f, RandomStream, Result, TriangleMesh, Vector3f};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const INVALID: u32 = u32::MAX;
const INVALID_EDGE: usize = usize::MAX;

/// Meshes with fewer vertices are returned untouched
pub const MIN_VERTEX_COUNT: usize = 16;

/// Meshes with fewer indices are returned untouched
pub const MIN_INDEX_COUNT: usize = 16 * 3;

/// Collapses producing more incident triangles than this are penalized
const HUB_TRIANGLE_COUNT: u32 = 10;

// ============================================================
// Working Data
// ============================================================

/// Undirected edge with `min < max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    min: u32,
    max: u32,
}

impl Edge {
    fn new(a: u32, b: u32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Both ids packed into one sortable key
    #[inline]
    fn key(&self) -> u64 {
        ((self.max as u64) << 32) | self.min as u64
    }
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    position: Point3f,
    normal: Vector3f,
}

/// A sampled edge that passed every threshold this pass
#[derive(Debug, Clone, Copy)]
struct CollapseCandidate {
    edge: usize,
    position: Point3f,
    normal: Vector3f,
    cost: f32,
}

/// Mesh state and scratch buffers reused across collapse passes.
struct CollapseMesh {
    vertices: Vec<Vertex>,
    triangles: Vec<[u32; 3]>,
    edges: Vec<Edge>,
    vertex_triangle_counts: Vec<u32>,

    candidates: Vec<CollapseCandidate>,
    sampled_edges: Vec<usize>,
    /// Cheapest candidate edge per vertex this pass
    best_edge: Vec<usize>,
    best_cost: Vec<f32>,
    /// Vertex each vertex merges into this pass (INVALID if it survives)
    collapse_target: Vec<u32>,

    triangle_buffer: Vec<[u32; 3]>,
    edge_buffer: Vec<Edge>,
}

impl CollapseMesh {
    fn from_triangle_mesh(mesh: &TriangleMesh) -> Self {
        let vertex_count = mesh.positions.len();

        let vertices: Vec<Vertex> = match &mesh.normals {
            Some(normals) => mesh
                .positions
                .iter()
                .zip(normals)
                .map(|(&position, &normal)| Vertex { position, normal })
                .collect(),
            None => mesh
                .positions
                .iter()
                .map(|&position| Vertex {
                    position,
                    normal: up_vector(),
                })
                .collect(),
        };

        let triangles: Vec<[u32; 3]> = mesh
            .triangles()
            .filter(|t| !is_degenerate(t))
            .collect();

        let mut cm = CollapseMesh {
            vertices,
            edges: Vec::with_capacity(triangles.len() * 3),
            vertex_triangle_counts: vec![0; vertex_count],
            candidates: Vec::new(),
            sampled_edges: Vec::new(),
            best_edge: vec![INVALID_EDGE; vertex_count],
            best_cost: vec![f32::INFINITY; vertex_count],
            collapse_target: vec![INVALID; vertex_count],
            triangle_buffer: Vec::with_capacity(triangles.len()),
            edge_buffer: Vec::new(),
            triangles,
        };
        cm.build_candidate_edges();
        cm.count_vertex_triangles();
        cm.candidates.reserve(cm.edges.len());
        cm.edge_buffer.reserve(cm.edges.len());
        cm
    }

    /// Collect the interior edges that do not touch a boundary vertex.
    ///
    /// After sorting by packed key, an edge seen exactly once belongs to a
    /// single triangle and marks both endpoints as boundary.
    fn build_candidate_edges(&mut self) {
        self.edges.clear();
        for &[a, b, c] in &self.triangles {
            self.edges.push(Edge::new(a, b));
            self.edges.push(Edge::new(b, c));
            self.edges.push(Edge::new(a, c));
        }
        self.edges.sort_unstable_by_key(Edge::key);

        let mut boundary = vec![false; self.vertices.len()];
        let mut interior = Vec::with_capacity(self.edges.len() / 2);

        for (count, edge) in self.edges.iter().dedup_with_count() {
            if count == 1 {
                boundary[edge.min as usize] = true;
                boundary[edge.max as usize] = true;
            } else {
                interior.push(*edge);
            }
        }

        self.edges.clear();
        self.edges.extend(
            interior
                .into_iter()
                .filter(|e| !boundary[e.min as usize] && !boundary[e.max as usize]),
        );
    }

    fn count_vertex_triangles(&mut self) {
        self.vertex_triangle_counts.fill(0);
        for tri in &self.triangles {
            for &v in tri {
                self.vertex_triangle_counts[v as usize] += 1;
            }
        }
    }

    fn reset_pass(&mut self) {
        self.candidates.clear();
        self.best_edge.fill(INVALID_EDGE);
        self.best_cost.fill(f32::INFINITY);
        self.collapse_target.fill(INVALID);
    }

    /// Score a random sample of edges and record the cheapest edge per vertex.
    ///
    /// Returns the number of sampled edges that passed every threshold.
    fn find_valid_collapses(&mut self, options: &SimplifierOptions, rng: &mut RandomStream) -> usize {
        let edge_count = self.edges.len();
        let sample_count = (edge_count as f32 * options.edge_fraction) as usize;

        self.sampled_edges.clear();
        for _ in 0..sample_count {
            match rng.index(edge_count) {
                Some(i) => self.sampled_edges.push(i),
                None => break,
            }
        }
        // Sorted ids walk the edge and vertex buffers in order
        self.sampled_edges.sort_unstable();
        self.sampled_edges.dedup();

        let max_edge_size_sq = options.max_edge_size * options.max_edge_size;
        let max_degree = options.max_triangles_per_vertex as u32;
        let hub_penalty = options.max_error * 0.1;

        for &i in &self.sampled_edges {
            let edge = self.edges[i];
            let v_min = self.vertices[edge.min as usize];
            let v_max = self.vertices[edge.max as usize];

            if v_min.normal.dot(&v_max.normal) < options.min_angle_cosine {
                continue;
            }

            if (v_max.position - v_min.position).norm_squared() > max_edge_size_sq {
                continue;
            }

            let degree = self.vertex_triangle_counts[edge.min as usize]
                + self.vertex_triangle_counts[edge.max as usize];
            if degree > max_degree {
                continue;
            }

            let solution = qef::solve_from_points(
                &[v_min.position, v_max.position],
                &[v_min.normal, v_max.normal],
            );

            let mut cost = if solution.error > 0.0 {
                1.0 / solution.error
            } else {
                0.0
            };
            cost += degree.saturating_sub(HUB_TRIANGLE_COUNT) as f32 * hub_penalty;

            if cost > options.max_error {
                continue;
            }

            self.candidates.push(CollapseCandidate {
                edge: i,
                position: solution.position,
                normal: (v_min.normal + v_max.normal) * 0.5,
                cost,
            });

            for v in [edge.min as usize, edge.max as usize] {
                if cost < self.best_cost[v] {
                    self.best_cost[v] = cost;
                    self.best_edge[v] = i;
                }
            }
        }

        self.candidates.len()
    }

    /// Merge the higher endpoint into the lower one for every candidate that
    /// is the cheapest edge of both endpoints. Returns the collapse count.
    fn collapse_edges(&mut self) -> usize {
        let mut collapsed = 0;

        for candidate in &self.candidates {
            let edge = self.edges[candidate.edge];
            if self.best_edge[edge.min as usize] != candidate.edge
                || self.best_edge[edge.max as usize] != candidate.edge
            {
                continue;
            }

            self.collapse_target[edge.max as usize] = edge.min;
            self.vertices[edge.min as usize] = Vertex {
                position: candidate.position,
                normal: candidate.normal,
            };
            collapsed += 1;
        }

        collapsed
    }

    #[inline]
    fn remap(&self, v: u32) -> u32 {
        match self.collapse_target[v as usize] {
            INVALID => v,
            target => target,
        }
    }

    /// Rewrite triangles through the collapse targets, dropping the ones that
    /// degenerate, and recount incident triangles. Returns the removed count.
    fn remove_triangles(&mut self) -> usize {
        let before = self.triangles.len();

        self.triangle_buffer.clear();
        for i in 0..self.triangles.len() {
            let [a, b, c] = self.triangles[i];
            let tri = [self.remap(a), self.remap(b), self.remap(c)];
            if !is_degenerate(&tri) {
                self.triangle_buffer.push(tri);
            }
        }
        std::mem::swap(&mut self.triangles, &mut self.triangle_buffer);
        self.count_vertex_triangles();

        before - self.triangles.len()
    }

    /// Rewrite edges through the collapse targets, dropping self loops
    fn remove_edges(&mut self) {
        self.edge_buffer.clear();
        for i in 0..self.edges.len() {
            let edge = self.edges[i];
            let min = self.remap(edge.min);
            let max = self.remap(edge.max);
            if min != max {
                self.edge_buffer.push(Edge::new(min, max));
            }
        }
        std::mem::swap(&mut self.edges, &mut self.edge_buffer);
    }

    /// Drop unreferenced vertices and renumber the rest in ascending id order
    fn into_triangle_mesh(self, with_normals: bool) -> TriangleMesh {
        let mut used = vec![false; self.vertices.len()];
        for tri in &self.triangles {
            for &v in tri {
                used[v as usize] = true;
            }
        }

        let mut remapped = vec![INVALID; self.vertices.len()];
        let mut positions = Vec::with_capacity(self.vertices.len());
        let mut normals = Vec::with_capacity(if with_normals { self.vertices.len() } else { 0 });

        for (i, vertex) in self.vertices.iter().enumerate() {
            if used[i] {
                remapped[i] = positions.len() as u32;
                positions.push(vertex.position);
                if with_normals {
                    normals.push(vertex.normal);
                }
            }
        }

        let indices = self
            .triangles
            .iter()
            .flat_map(|tri| tri.iter().map(|&v| remapped[v as usize]))
            .collect();

        let mut mesh = TriangleMesh::from_positions_and_indices(positions, indices);
        if with_normals {
            mesh.set_normals(normals);
        }
        mesh
    }
}

#[inline]
fn is_degenerate(t: &[u32; 3]) -> bool {
    t[0] == t[1] || t[0] == t[2] || t[1] == t[2]
}

// ============================================================
// Statistics
// ============================================================

/// Why a simplification run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Input was below the minimum size and returned untouched
    TooSmall,
    /// A pass found no edge passing the thresholds
    NoValidCollapse,
    /// Triangle count fell below the target
    TargetReached,
    /// The iteration budget ran out
    IterationLimit,
}

/// Summary of one simplification run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplifyStats {
    pub iterations: usize,
    pub collapses: usize,
    pub input_triangles: usize,
    pub output_triangles: usize,
    pub termination: Termination,
}

// ============================================================
// QEF Edge Collapse Simplifier
// ============================================================

/// Iterative randomized edge collapse simplifier driven by a QEF cost.
///
/// The simplifier is stateless apart from its options; every call seeds its
/// own random stream from `options.seed`, so repeated calls on the same mesh
/// give the same result and calls from several threads do not interfere.
#[derive(Debug, Clone, Default)]
pub struct QefEdgeCollapseSimplifier {
    pub options: SimplifierOptions,
}

impl QefEdgeCollapseSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SimplifierOptions) -> Self {
        Self { options }
    }

    /// Simplify `mesh` and report what happened
    pub fn simplify_with_stats(&self, mesh: &TriangleMesh) -> Result<(TriangleMesh, SimplifyStats)> {
        mesh.validate_indices()?;

        let input_triangles = mesh.triangle_count();

        if mesh.positions.len() < MIN_VERTEX_COUNT || mesh.indices.len() < MIN_INDEX_COUNT {
            debug!(
                vertices = mesh.positions.len(),
                indices = mesh.indices.len(),
                "mesh below minimum size, skipping simplification"
            );
            let stats = SimplifyStats {
                iterations: 0,
                collapses: 0,
                input_triangles,
                output_triangles: input_triangles,
                termination: Termination::TooSmall,
            };
            return Ok((mesh.clone(), stats));
        }

        let options = self.options.sanitized();
        let mut rng = RandomStream::new(options.seed);
        let mut cm = CollapseMesh::from_triangle_mesh(mesh);

        let target_triangles = (cm.triangles.len() as f32 * options.target_percentage) as usize;

        debug!(
            vertices = cm.vertices.len(),
            triangles = cm.triangles.len(),
            candidate_edges = cm.edges.len(),
            target_triangles,
            "starting edge collapse"
        );

        let mut iterations = 0;
        let mut collapses = 0;
        let mut termination = Termination::IterationLimit;

        for iteration in 0..options.max_iteration {
            iterations += 1;
            cm.reset_pass();

            let valid = cm.find_valid_collapses(&options, &mut rng);
            if valid == 0 {
                termination = Termination::NoValidCollapse;
                break;
            }

            let collapsed = cm.collapse_edges();
            let removed = cm.remove_triangles();
            cm.remove_edges();
            collapses += collapsed;

            trace!(
                iteration,
                sampled = cm.sampled_edges.len(),
                valid,
                collapsed,
                removed,
                triangles = cm.triangles.len(),
                "collapse pass"
            );

            if collapsed == 0 {
                termination = Termination::NoValidCollapse;
                break;
            }

            if cm.triangles.len() < target_triangles {
                termination = Termination::TargetReached;
                break;
            }
        }

        let result = cm.into_triangle_mesh(mesh.has_normals());
        let stats = SimplifyStats {
            iterations,
            collapses,
            input_triangles,
            output_triangles: result.triangle_count(),
            termination,
        };

        debug!(
            termination = ?stats.termination,
            iterations,
            collapses,
            vertices = result.vertex_count(),
            triangles = result.triangle_count(),
            "edge collapse finished"
        );

        Ok((result, stats))
    }

    /// Simplify a mesh expressed relative to `offset`.
    ///
    /// Positions are shifted by `-offset` while collapsing, which keeps the
    /// QEF solve well conditioned for sections far from the origin.
    pub fn simplify_with_offset(&self, mesh: &TriangleMesh, offset: &Vector3f) -> Result<TriangleMesh> {
        let mut local = mesh.clone();
        local.translate(&-offset);

        let (mut result, stats) = self.simplify_with_stats(&local)?;
        if stats.termination == Termination::TooSmall {
            return Ok(mesh.clone());
        }

        result.translate(offset);
        Ok(result)
    }

    /// Simplify independent mesh sections in parallel.
    ///
    /// Each section is processed exactly as by [`MeshSimplifier::simplify`].
    pub fn simplify_batch(&self, meshes: &[TriangleMesh]) -> Result<Vec<TriangleMesh>> {
        meshes.par_iter().map(|mesh| self.simplify(mesh)).collect()
    }
}

impl MeshSimplifier for QefEdgeCollapseSimplifier {
    fn simplify(&self, mesh: &TriangleMesh) -> Result<TriangleMesh> {
        self.simplify_with_stats(mesh).map(|(result, _)| result)
    }
}
