//! Island height maps from a border flood fill
//!
//! Elevation grows with the walking distance from the island border. The
//! fill starts from every border cell at zero and relaxes solid cells in
//! FIFO order over the eight cell neighbors. Each step adds one, or a random
//! amount in `1..=height_variance` when the variance is above one.
//!
//! Raw distances are then ranked and redistributed with
//! `x = sqrt(1.1) - sqrt(1.1 * (1 - rank / (n - 1)))`, normalized by the
//! largest `x`, so high ground stays rare. The final value of a cell is its
//! redistributed value plus those of its reached neighbors, divided by
//! `NEIGHBOR_COUNT + 1` regardless of how many neighbors were reached.

use crate::grid::{GridData, HeightGrid, MapGenerationInfo, NEIGHBOR_COUNT};
use procmesh_core::{Error, RandomStream, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Raw elevation of border cells
pub const BORDER_ELEVATION: i32 = 0;

/// Raw elevation of solid cells before the fill reaches them
pub const UNREACHED_ELEVATION: i32 = 1000;

const MIN_MAX_ELEVATION: f32 = 1.0e-5;

/// Per-cell island elevation in `[0, 1]`.
///
/// Cells the fill never reached hold `None`: non-solid cells, solid regions
/// cut off from every border, and solid cells whose walking distance from
/// the border reaches [`UNREACHED_ELEVATION`]. With a large
/// `height_variance` that distance can be reached in far fewer steps.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandElevation {
    values: Vec<Option<f32>>,
}

impl IslandElevation {
    fn unreached(cell_count: usize) -> Self {
        Self {
            values: vec![None; cell_count],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<f32> {
        self.values.get(i).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f32>] {
        &self.values
    }

    /// Number of cells with an elevation
    pub fn reached_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Dense height map with zero for unreached cells
    pub fn to_height_map(&self) -> Vec<f32> {
        self.values.iter().map(|v| v.unwrap_or(0.0)).collect()
    }
}

/// Flood fill elevation over `solid_cells` of `grid`.
///
/// Cells of `solid_cells` that are border cells seed the fill; indices
/// outside the grid are ignored. Fewer than two reached cells produce an
/// all-`None` result.
pub fn generate_island_heights<G, I>(
    grid: &G,
    solid_cells: I,
    height_variance: i32,
    rng: &mut RandomStream,
) -> IslandElevation
where
    G: HeightGrid + ?Sized,
    I: IntoIterator<Item = usize>,
{
    let size = grid.cell_count();
    let use_variance = height_variance > 1;

    // Cells outside the solid list stay at zero and are never relaxed
    let mut raw = vec![BORDER_ELEVATION; size];
    let mut queue = VecDeque::new();
    let mut reached = vec![false; size];
    let mut visit_order = Vec::new();
    let mut solid_count = 0usize;

    for i in solid_cells.into_iter().filter(|&i| i < size) {
        solid_count += 1;
        if grid.is_border(i) {
            raw[i] = BORDER_ELEVATION;
            queue.push_back(i);
            if !reached[i] {
                reached[i] = true;
                visit_order.push(i);
            }
        } else {
            raw[i] = UNREACHED_ELEVATION;
        }
    }

    while let Some(i0) = queue.pop_front() {
        for slot in 0..NEIGHBOR_COUNT {
            let Some(i1) = grid.neighbor(i0, slot) else {
                continue;
            };

            let offset = if use_variance {
                rng.rand_range(1, height_variance)
            } else {
                1
            };
            let e = raw[i0] + offset;

            if e < raw[i1] {
                raw[i1] = e;
                queue.push_back(i1);
                if !reached[i1] {
                    reached[i1] = true;
                    visit_order.push(i1);
                }
            }
        }
    }

    if use_variance {
        visit_order.sort_by_key(|&i| raw[i]);
    }

    let n = visit_order.len();
    debug!(
        solid = solid_count,
        reached = n,
        unreached = solid_count.saturating_sub(n),
        "island flood fill done"
    );

    if n < 2 {
        return IslandElevation::unreached(size);
    }

    let redistribute = |rank: usize| {
        let y = rank as f32 / (n - 1) as f32;
        1.1f32.sqrt() - (1.1 * (1.0 - y)).sqrt()
    };

    let max_elevation = redistribute(n - 1);
    if max_elevation <= MIN_MAX_ELEVATION {
        return IslandElevation::unreached(size);
    }

    let mut normalized: Vec<Option<f32>> = vec![None; size];
    for (rank, &i) in visit_order.iter().enumerate() {
        normalized[i] = Some(redistribute(rank) / max_elevation);
    }

    let average = 1.0 / (NEIGHBOR_COUNT + 1) as f32;
    let mut values = vec![None; size];
    for &i0 in &visit_order {
        let mut e = normalized[i0].unwrap_or(0.0);
        for slot in 0..NEIGHBOR_COUNT {
            if let Some(v) = grid.neighbor(i0, slot).and_then(|i1| normalized[i1]) {
                e += v;
            }
        }
        values[i0] = Some(e * average);
    }

    IslandElevation { values }
}

/// Grid step writing an island height map into one of the grid's maps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandHeightMapTask {
    pub seed: u32,
    /// Upper bound of the random step between neighbors; one or less means
    /// every step adds exactly one
    pub height_variance: i32,
    pub map_info: MapGenerationInfo,
}

impl Default for IslandHeightMapTask {
    fn default() -> Self {
        Self {
            seed: 0,
            height_variance: -1,
            map_info: MapGenerationInfo::default(),
        }
    }
}

impl IslandHeightMapTask {
    pub fn new(seed: u32, height_variance: i32, map_info: MapGenerationInfo) -> Self {
        Self {
            seed,
            height_variance,
            map_info,
        }
    }

    /// Check that the task can run on `grid`
    pub fn setup(&self, grid: &GridData) -> Result<()> {
        if !grid.has_valid_point_mask() {
            return Err(Error::InvalidParameters(
                "island height map task needs a non-empty grid".to_string(),
            ));
        }
        if self.map_info.dst_id < 0 {
            return Err(Error::InvalidParameters(format!(
                "invalid target height map id {}",
                self.map_info.dst_id
            )));
        }
        Ok(())
    }

    /// Generate heights over the grid's solid point set and blend them into
    /// the target map
    pub fn execute(&self, grid: &mut GridData) -> Result<IslandElevation> {
        self.setup(grid)?;

        let mut rng = RandomStream::new(self.seed);
        let elevation = generate_island_heights(
            &*grid,
            grid.point_set.iter().copied(),
            self.height_variance,
            &mut rng,
        );

        grid.apply_height_blend(&elevation.to_height_map(), &self.map_info);
        Ok(elevation)
    }
}
