//! Grid data shared by the height map generators
//!
//! A [`GridData`] is a row-major `width x height` cell grid. Cells whose mask
//! byte exceeds [`MASK_THRESHOLD`] are solid; the generators work on the set
//! of solid cells and a set of border cells, and write their results into
//! numbered height maps.

use itertools::Itertools;
use procmesh_core::{up_vector, Error, Point2f, Point3f, Result, TriangleMesh, Vector3f};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Mask bytes above this value mark a solid cell
pub const MASK_THRESHOLD: u8 = 127;

/// Number of neighbor slots around a cell
pub const NEIGHBOR_COUNT: usize = 8;

/// Neighbor offsets in slot order: W, NW, N, NE, E, SE, S, SW
pub const NEIGHBOR_OFFSETS: [(i32, i32); NEIGHBOR_COUNT] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// Read access to a cell grid as needed by the flood fill generators
pub trait HeightGrid {
    /// Total number of cells
    fn cell_count(&self) -> usize;

    fn is_solid(&self, i: usize) -> bool;

    fn is_border(&self, i: usize) -> bool;

    /// Index of the neighbor of `i` in `slot`, or `None` when it falls
    /// outside the grid
    fn neighbor(&self, i: usize, slot: usize) -> Option<usize>;
}

/// How a generated height map is merged into its target map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeightBlendType {
    Replace,
    #[default]
    Max,
    Add,
    Mul,
}

/// Source and target height maps of a generation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapGenerationInfo {
    pub src_id: i32,
    pub dst_id: i32,
    pub blend_type: HeightBlendType,
}

impl Default for MapGenerationInfo {
    fn default() -> Self {
        Self {
            src_id: -1,
            dst_id: -1,
            blend_type: HeightBlendType::Max,
        }
    }
}

impl MapGenerationInfo {
    pub fn with_target(dst_id: i32, blend_type: HeightBlendType) -> Self {
        Self {
            dst_id,
            blend_type,
            ..Self::default()
        }
    }
}

/// Cell grid with a point mask, solid and border sets, and height maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridData {
    width: usize,
    height: usize,
    pub point_mask: Vec<u8>,
    pub point_set: BTreeSet<usize>,
    pub border_set: BTreeSet<usize>,
    pub height_maps: Vec<Vec<f32>>,
}

impl GridData {
    /// Create a grid with an empty mask
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            point_mask: vec![0; width * height],
            ..Self::default()
        }
    }

    /// Create a grid from a mask, deriving the solid set and marking every
    /// solid cell with a non-solid or missing axis neighbor as border.
    pub fn from_mask(width: usize, height: usize, point_mask: Vec<u8>) -> Result<Self> {
        if point_mask.len() != width * height {
            return Err(Error::InvalidData(format!(
                "point mask has {} cells, expected {}x{}",
                point_mask.len(),
                width,
                height
            )));
        }
        let mut grid = Self {
            width,
            height,
            point_mask,
            ..Self::default()
        };
        grid.rebuild_point_sets();
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn has_valid_point_mask(&self) -> bool {
        self.cell_count() > 0 && self.point_mask.len() == self.cell_count()
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    /// Recompute the solid set and the border set from the point mask
    pub fn rebuild_point_sets(&mut self) {
        self.point_set = (0..self.point_mask.len())
            .filter(|&i| self.is_solid(i))
            .collect();

        // Axis slots W, N, E, S
        self.border_set = self
            .point_set
            .iter()
            .copied()
            .filter(|&i| {
                [0, 2, 4, 6].iter().any(|&slot| match self.neighbor(i, slot) {
                    Some(n) => !self.is_solid(n),
                    None => true,
                })
            })
            .collect();
    }

    /// Rasterize a closed outline into the point mask and rebuild the point
    /// sets.
    ///
    /// A cell is solid when its center lies inside the outline (even-odd
    /// rule). Outlines with fewer than three points leave the grid as is.
    pub fn draw_point_mask(&mut self, outline: &[Point2f]) {
        if outline.len() < 3 || self.cell_count() == 0 {
            return;
        }

        let width = self.width;
        self.point_mask = vec![0; self.cell_count()];
        self.point_mask
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let cy = y as f32 + 0.5;

                // Crossings of the scanline with every outline edge
                let mut crossings: Vec<f32> = outline
                    .iter()
                    .circular_tuple_windows()
                    .filter(|(a, b)| (a.y > cy) != (b.y > cy))
                    .map(|(a, b)| a.x + (cy - a.y) / (b.y - a.y) * (b.x - a.x))
                    .collect();
                crossings.sort_by(f32::total_cmp);

                for (x, cell) in row.iter_mut().enumerate() {
                    let cx = x as f32 + 0.5;
                    let inside = crossings.iter().filter(|&&c| c < cx).count() % 2 == 1;
                    if inside {
                        *cell = u8::MAX;
                    }
                }
            });

        self.rebuild_point_sets();
    }

    pub fn height_map(&self, map_id: usize) -> Option<&[f32]> {
        self.height_maps
            .get(map_id)
            .filter(|map| map.len() == self.cell_count())
            .map(Vec::as_slice)
    }

    pub fn has_height_map(&self, map_id: usize) -> bool {
        self.height_map(map_id).is_some()
    }

    /// Create (or reset) a zeroed height map at `map_id`
    pub fn create_height_map(&mut self, map_id: usize) -> Result<usize> {
        let size = self.cell_count();
        if size == 0 {
            return Err(Error::InvalidParameters(
                "cannot create a height map on an empty grid".to_string(),
            ));
        }
        if self.height_maps.len() <= map_id {
            self.height_maps.resize_with(map_id + 1, Vec::new);
        }
        self.height_maps[map_id] = vec![0.0; size];
        Ok(map_id)
    }

    /// Blend a dense height map into map `info.dst_id`, creating it when
    /// missing.
    ///
    /// An invalid target id or a size mismatch leaves the grid untouched.
    pub fn apply_height_blend(&mut self, heights: &[f32], info: &MapGenerationInfo) {
        let size = self.cell_count();
        if info.dst_id < 0 || heights.len() != size {
            warn!(
                dst_id = info.dst_id,
                len = heights.len(),
                size,
                "invalid height map blend target"
            );
            return;
        }

        let map_id = info.dst_id as usize;
        if self.height_maps.len() <= map_id {
            self.height_maps.resize_with(map_id + 1, Vec::new);
        }

        let dst = &mut self.height_maps[map_id];
        if dst.len() != size {
            *dst = vec![0.0; size];
        }

        let pairs = dst.iter_mut().zip(heights);
        match info.blend_type {
            HeightBlendType::Replace => dst.copy_from_slice(heights),
            HeightBlendType::Max => pairs.for_each(|(d, &s)| *d = d.max(s)),
            HeightBlendType::Add => pairs.for_each(|(d, &s)| *d += s),
            HeightBlendType::Mul => pairs.for_each(|(d, &s)| *d *= s),
        }
    }

    /// Build a triangulated section over the grid lattice.
    ///
    /// Vertices sit at integer `(x, y)` with `z` read from `map_id` scaled by
    /// `height_scale`. Normals come from central differences, except on the
    /// two outermost rings of the grid, which stay flat so sections line up.
    /// Without the height map the section is flat. `reverse_winding` flips
    /// the triangle orientation.
    pub fn create_mesh_section(&self, map_id: usize, height_scale: f32, reverse_winding: bool) -> TriangleMesh {
        let (w, h) = (self.width, self.height);
        if w < 2 || h < 2 {
            return TriangleMesh::new();
        }

        let heights = self.height_map(map_id);
        let sample = |x: usize, y: usize| heights.map_or(0.0, |m| m[x + y * w] * height_scale);

        let vertices: Vec<(Point3f, Vector3f)> = (0..w * h)
            .into_par_iter()
            .map(|i| {
                let (x, y) = (i % w, i / w);
                let position = Point3f::new(x as f32, y as f32, sample(x, y));
                let interior = x > 1 && x + 2 < w && y > 1 && y + 2 < h;
                let normal = if heights.is_some() && interior {
                    let dx = sample(x + 1, y) - sample(x - 1, y);
                    let dy = sample(x, y + 1) - sample(x, y - 1);
                    Vector3f::new(-dx, -dy, 1.0).normalize()
                } else {
                    up_vector()
                };
                (position, normal)
            })
            .collect();
        let (positions, normals): (Vec<_>, Vec<_>) = vertices.into_iter().unzip();

        let mut indices = Vec::with_capacity((w - 1) * (h - 1) * 6);
        for qx in 0..(w - 1) {
            for qy in 0..(h - 1) {
                let i0 = (qx + qy * w) as u32;
                let i1 = i0 + 1;
                let i3 = (qx + (qy + 1) * w) as u32;
                let i2 = i3 + 1;
                if reverse_winding {
                    indices.extend_from_slice(&[i0, i3, i1, i3, i2, i1]);
                } else {
                    indices.extend_from_slice(&[i0, i1, i3, i1, i2, i3]);
                }
            }
        }

        TriangleMesh::from_buffers(positions, normals, indices)
    }
}

impl HeightGrid for GridData {
    fn cell_count(&self) -> usize {
        self.width * self.height
    }

    fn is_solid(&self, i: usize) -> bool {
        self.point_mask.get(i).is_some_and(|&m| m > MASK_THRESHOLD)
    }

    fn is_border(&self, i: usize) -> bool {
        self.border_set.contains(&i)
    }

    fn neighbor(&self, i: usize, slot: usize) -> Option<usize> {
        if i >= self.cell_count() {
            return None;
        }
        let (dx, dy) = *NEIGHBOR_OFFSETS.get(slot)?;
        let x = (i % self.width) as i64 + dx as i64;
        let y = (i / self.width) as i64 + dy as i64;
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(x as usize + y as usize * self.width)
    }
}
