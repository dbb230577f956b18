//! Rough island polygon generation
//!
//! An island silhouette starts as a coarse closed loop (a regular polygon or
//! caller supplied points). Every point carries a random balance and maximum
//! offset. Each subdivision pass splits the edges that are still longer than
//! the subdivision limit and pushes the new midpoint sideways by a random
//! amount, which gives the loop its rough coastline look. Finally the loop
//! is fitted into the requested size.

use itertools::Itertools;
use procmesh_core::{BoundingBox, Error, Point2f, RandomStream, Result, Vector2f, KINDA_SMALL_NUMBER};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::fmt;
use tracing::{debug, warn};

/// Parameters of a rough island polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyIslandParams {
    pub random_seed: u32,
    /// Size of the rectangle the polygon is fitted into
    pub size: Vector2f,
    /// Range of the maximum sideways displacement, as (min, max)
    pub displacement_range: Vector2f,
    pub side_count: i32,
    pub subdiv_count: i32,
    /// Edges with a squared length at or below this are not split
    pub subdiv_limit: f32,
    /// Fraction of `size` covered by the fitted polygon
    pub poly_scale: f32,
    /// Rotation of the initial regular polygon, in degrees
    pub poly_angle_offset: f32,
    pub min_area: f32,
}

impl Default for PolyIslandParams {
    fn default() -> Self {
        Self {
            random_seed: 1337,
            size: Vector2f::zeros(),
            displacement_range: Vector2f::zeros(),
            side_count: 3,
            subdiv_count: 3,
            subdiv_limit: 0.1,
            poly_scale: 0.985,
            poly_angle_offset: 0.0,
            min_area: 10000.0,
        }
    }
}

impl PolyIslandParams {
    pub fn new(size: Vector2f) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.side_count >= 3
            && self.subdiv_count >= 0
            && self.subdiv_limit > 0.0
            && self.size.min() > KINDA_SMALL_NUMBER
    }

    pub fn min_area_sq(&self) -> f32 {
        self.min_area * self.min_area
    }

    fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            warn!(params = %self, "invalid poly island parameters");
            Err(Error::InvalidParameters(format!(
                "invalid poly island parameters {}",
                self
            )))
        }
    }
}

impl fmt::Display for PolyIslandParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(random_seed: {}, size: ({}, {}), side_count: {}, subdiv_count: {}, subdiv_limit: {}, \
             poly_scale: {}, poly_angle_offset: {}, displacement_range: ({}, {}), min_area: {})",
            self.random_seed,
            self.size.x,
            self.size.y,
            self.side_count,
            self.subdiv_count,
            self.subdiv_limit,
            self.poly_scale,
            self.poly_angle_offset,
            self.displacement_range.x,
            self.displacement_range.y,
            self.min_area
        )
    }
}

/// Loop point with its subdivision jitter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RoughPoint {
    pub position: Point2f,
    pub balance: f32,
    pub max_offset: f32,
}

impl RoughPoint {
    fn random(position: Point2f, rng: &mut RandomStream, displacement_range: &Vector2f) -> Self {
        let balance = rng.fraction();
        let max_offset =
            rng.fraction().max(0.05) * rng.frand_range(displacement_range.x, displacement_range.y);
        Self {
            position,
            balance,
            max_offset,
        }
    }
}

/// Closed regular polygon loop on the unit circle, head repeated at the tail
pub(crate) fn regular_rough_loop(params: &PolyIslandParams, rng: &mut RandomStream) -> Vec<RoughPoint> {
    let side_count = params.side_count.max(0) as usize;
    let side_angle = TAU / side_count as f32;
    let mut angle = (params.poly_angle_offset / 360.0) * TAU;

    let mut rough = Vec::with_capacity(side_count + 1);
    for _ in 0..side_count {
        let position = Point2f::new(angle.cos(), angle.sin());
        rough.push(RoughPoint::random(position, rng, &params.displacement_range));
        angle += side_angle;
    }
    close_loop(&mut rough);
    rough
}

pub(crate) fn initial_rough_loop(
    params: &PolyIslandParams,
    points: &[Point2f],
    rng: &mut RandomStream,
) -> Vec<RoughPoint> {
    let mut rough: Vec<RoughPoint> = points
        .iter()
        .map(|&p| RoughPoint::random(p, rng, &params.displacement_range))
        .collect();
    close_loop(&mut rough);
    rough
}

fn close_loop(rough: &mut Vec<RoughPoint>) {
    if let Some(&head) = rough.first() {
        rough.push(head);
    }
}

/// Run up to `subdiv_count` subdivision passes over a closed loop.
///
/// A split edge gets a new point just before its end point, inheriting that
/// end point's balance and maximum offset. Points inserted during a pass are
/// not revisited until the next pass.
pub(crate) fn subdivide(
    mut rough: Vec<RoughPoint>,
    params: &PolyIslandParams,
    rng: &mut RandomStream,
) -> Vec<RoughPoint> {
    for pass in 0..params.subdiv_count {
        let mut next = Vec::with_capacity(rough.len() * 2);
        let mut inserted = 0usize;

        if let Some(&head) = rough.first() {
            next.push(head);
        }

        for (r0, r1) in rough.iter().tuple_windows() {
            let v0 = r0.position;
            let v1 = r1.position;

            if nalgebra::distance_squared(&v0, &v1) > params.subdiv_limit {
                let mid = nalgebra::center(&v0, &v1);
                let normal = Vector2f::new(-(v0.y - v1.y), v0.x - v1.x);
                let d = (rng.fraction() - r1.balance) * r1.max_offset;
                next.push(RoughPoint {
                    position: mid + normal * d,
                    balance: r1.balance,
                    max_offset: r1.max_offset,
                });
                inserted += 1;
            }
            next.push(*r1);
        }

        rough = next;
        debug!(pass, inserted, points = rough.len(), "poly subdivision pass");

        if inserted == 0 {
            debug!(pass, "poly subdivision reached a fixed point");
            break;
        }
    }
    rough
}

fn fit_rough_loop(rough: &[RoughPoint], params: &PolyIslandParams) -> Vec<Point2f> {
    let mut points: Vec<Point2f> = rough.iter().map(|r| r.position).collect();
    fit_points_unchecked(&mut points, &params.size, params.poly_scale);
    points
}

/// Generate a rough island polygon from a regular polygon.
///
/// The result is a closed loop: the last point repeats the first. The stream
/// is seeded from `params.random_seed`, so equal parameters always give the
/// same polygon.
///
/// # Example
/// ```rust
/// use procmesh_core::Vector2f;
/// use procmesh_procedural::{generate_poly, PolyIslandParams};
///
/// fn main() -> procmesh_core::Result<()> {
///     let mut params = PolyIslandParams::new(Vector2f::new(512.0, 512.0));
///     params.side_count = 5;
///     params.displacement_range = Vector2f::new(0.1, 0.4);
///
///     let outline = generate_poly(&params)?;
///     assert_eq!(outline.first(), outline.last());
///     Ok(())
/// }
/// ```
pub fn generate_poly(params: &PolyIslandParams) -> Result<Vec<Point2f>> {
    let mut rng = RandomStream::new(params.random_seed);
    generate_poly_with_stream(params, &mut rng)
}

/// Same as [`generate_poly`] but drawing from a caller owned stream
pub fn generate_poly_with_stream(params: &PolyIslandParams, rng: &mut RandomStream) -> Result<Vec<Point2f>> {
    params.validate()?;
    let rough = regular_rough_loop(params, rng);
    let rough = subdivide(rough, params, rng);
    Ok(fit_rough_loop(&rough, params))
}

/// Generate a rough island polygon starting from `points` instead of a
/// regular polygon. `side_count` still has to be valid but is otherwise
/// unused.
pub fn generate_poly_with_initial_points(params: &PolyIslandParams, points: &[Point2f]) -> Result<Vec<Point2f>> {
    let mut rng = RandomStream::new(params.random_seed);
    generate_poly_with_initial_points_and_stream(params, points, &mut rng)
}

pub fn generate_poly_with_initial_points_and_stream(
    params: &PolyIslandParams,
    points: &[Point2f],
    rng: &mut RandomStream,
) -> Result<Vec<Point2f>> {
    params.validate()?;
    if points.is_empty() {
        warn!("poly generation called without initial points");
        return Err(Error::InvalidParameters(
            "initial point list is empty".to_string(),
        ));
    }
    let rough = initial_rough_loop(params, points, rng);
    let rough = subdivide(rough, params, rng);
    Ok(fit_rough_loop(&rough, params))
}

fn fit_points_unchecked(points: &mut [Point2f], dimension: &Vector2f, fit_scale: f32) {
    let bounds = points.bounding_box();
    if !bounds.is_valid {
        return;
    }

    let scaled_offset = dimension * ((1.0 - fit_scale) * 0.5);
    let scale = bounds.fit_scale(dimension, fit_scale);

    for p in points.iter_mut() {
        *p = Point2f::from(scaled_offset + (*p - bounds.min) * scale);
    }
}

/// Rescale `points` in place into a `dimension` sized rectangle.
///
/// The bounding box of the result spans `dimension * fit_scale` on its
/// tighter axis. Does nothing when either side of `dimension` is near zero.
pub fn fit_points(points: &mut [Point2f], dimension: &Vector2f, fit_scale: f32) {
    if dimension.x < KINDA_SMALL_NUMBER || dimension.y < KINDA_SMALL_NUMBER {
        return;
    }
    fit_points_unchecked(points, dimension, fit_scale);
}

/// Non-mutating [`fit_points`]
pub fn fitted_points(points: &[Point2f], dimension: &Vector2f, fit_scale: f32) -> Vec<Point2f> {
    let mut fitted = points.to_vec();
    fit_points(&mut fitted, dimension, fit_scale);
    fitted
}

/// Mirror points through the center of a `dimension` sized rectangle
pub fn flip_points(points: &[Point2f], dimension: &Vector2f) -> Vec<Point2f> {
    if dimension.x < KINDA_SMALL_NUMBER || dimension.y < KINDA_SMALL_NUMBER {
        return points.to_vec();
    }
    points
        .iter()
        .map(|p| Point2f::from(dimension - p.coords))
        .collect()
}

/// Move every point by `radius` in a random direction
pub fn generate_point_offsets(seed: u32, points: &[Point2f], radius: f32) -> Vec<Point2f> {
    let mut rng = RandomStream::new(seed);
    points
        .iter()
        .map(|p| p + rng.unit_vector_2d() * radius)
        .collect()
}
