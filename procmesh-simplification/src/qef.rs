//! Quadric error function solver
//!
//! Given a small cloud of surface samples (position plus normal), finds the
//! point minimizing the summed squared distances to the tangent planes of
//! the samples, together with the residual error at that point.

use nalgebra::Matrix3;
use procmesh_core::{Point3f, Vector3d, Vector3f};

/// Singular values below this are treated as zero by the solve
const SVD_EPSILON: f64 = 1.0e-6;

/// Result of a QEF minimization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QefSolution {
    pub position: Point3f,
    pub error: f32,
}

/// Accumulates plane constraints `n . x = n . p` in normal-equation form.
///
/// The solve is carried out relative to the mass point of the samples with a
/// truncated-SVD pseudo inverse, so under-constrained directions (for example
/// two coplanar samples) resolve to the mass point instead of drifting.
#[derive(Debug, Clone)]
pub struct QefSolver {
    ata: Matrix3<f64>,
    atb: Vector3d,
    mass_point: Vector3d,
    samples: Vec<(Vector3d, Vector3d)>,
}

impl QefSolver {
    pub fn new() -> Self {
        Self {
            ata: Matrix3::zeros(),
            atb: Vector3d::zeros(),
            mass_point: Vector3d::zeros(),
            samples: Vec::new(),
        }
    }

    /// Add a sample on the surface with its normal
    pub fn add(&mut self, position: &Point3f, normal: &Vector3f) {
        let p = position.coords.cast::<f64>();
        let n = normal.cast::<f64>();
        let d = n.dot(&p);

        self.ata += n * n.transpose();
        self.atb += n * d;
        self.mass_point += p;
        self.samples.push((p, n));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Evaluate the summed squared plane distances at `x`
    pub fn error_at(&self, x: &Vector3d) -> f64 {
        self.samples
            .iter()
            .map(|(p, n)| {
                let dist = n.dot(&(x - p));
                dist * dist
            })
            .sum()
    }

    /// Solve for the minimizing point and its residual error
    pub fn solve(&self) -> QefSolution {
        if self.samples.is_empty() {
            return QefSolution {
                position: Point3f::origin(),
                error: 0.0,
            };
        }

        let mass_point = self.mass_point / self.samples.len() as f64;
        let rhs = self.atb - self.ata * mass_point;

        let svd = self.ata.svd(true, true);
        let offset = svd.solve(&rhs, SVD_EPSILON).unwrap_or_else(|_| Vector3d::zeros());

        let x = mass_point + offset;
        let error = self.error_at(&x);

        QefSolution {
            position: Point3f::new(x.x as f32, x.y as f32, x.z as f32),
            error: error as f32,
        }
    }
}

impl Default for QefSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Solve the QEF for index-aligned `positions` and `normals`
pub fn solve_from_points(positions: &[Point3f], normals: &[Vector3f]) -> QefSolution {
    let mut solver = QefSolver::new();
    for (p, n) in positions.iter().zip(normals) {
        solver.add(p, n);
    }
    solver.solve()
}
