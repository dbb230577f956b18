//! Indexed triangle mesh

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh stored as flat position, normal and index buffers.
///
/// `indices` holds vertex ids three per triangle. Normals are optional and,
/// when present, are index-aligned with `positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub positions: Vec<Point3f>,
    pub normals: Option<Vec<Vector3f>>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: None,
            indices: Vec::new(),
        }
    }

    /// Create a mesh from positions and a flat index buffer
    pub fn from_positions_and_indices(positions: Vec<Point3f>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: None,
            indices,
        }
    }

    /// Create a mesh from raw buffers.
    ///
    /// Normals are kept only when their length matches the position count.
    pub fn from_buffers(positions: Vec<Point3f>, normals: Vec<Vector3f>, indices: Vec<u32>) -> Self {
        let mut mesh = Self::from_positions_and_indices(positions, indices);
        mesh.set_normals(normals);
        mesh
    }

    /// Create a mesh from per-triangle index triples
    pub fn from_triangles(positions: Vec<Point3f>, triangles: &[[u32; 3]]) -> Self {
        let indices = triangles.iter().flat_map(|t| t.iter().copied()).collect();
        Self::from_positions_and_indices(positions, indices)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of complete triangles in the index buffer
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangle_count() == 0
    }

    /// Whether the mesh carries per-vertex normals
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Iterate over triangles as index triples, ignoring a trailing partial triple
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.positions.len() {
            self.normals = Some(normals);
        }
    }

    /// Check that every index references an existing vertex
    pub fn validate_indices(&self) -> Result<()> {
        let vertex_count = self.positions.len();
        match self.indices.iter().position(|&i| i as usize >= vertex_count) {
            Some(slot) => Err(Error::InvalidData(format!(
                "index {} at slot {} is out of range for {} vertices",
                self.indices[slot], slot, vertex_count
            ))),
            None => Ok(()),
        }
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.triangles()
            .map(|[a, b, c]| {
                let v0 = self.positions[a as usize];
                let v1 = self.positions[b as usize];
                let v2 = self.positions[c as usize];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1.cross(&edge2).normalize()
            })
            .collect()
    }

    /// Translate every position by `offset`
    pub fn translate(&mut self, offset: &Vector3f) {
        for p in &mut self.positions {
            *p += offset;
        }
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_buffers_drops_mismatched_normals() {
        let positions = vec![Point3f::origin(); 3];
        let mesh = TriangleMesh::from_buffers(positions, vec![up_vector(); 2], vec![0, 1, 2]);
        assert!(!mesh.has_normals());
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_triangles_ignore_partial_tail() {
        let positions = vec![Point3f::origin(); 4];
        let mesh = TriangleMesh::from_positions_and_indices(positions, vec![0, 1, 2, 1, 2]);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_validate_indices() {
        let positions = vec![Point3f::origin(); 3];
        let ok = TriangleMesh::from_positions_and_indices(positions.clone(), vec![0, 1, 2]);
        assert!(ok.validate_indices().is_ok());

        let bad = TriangleMesh::from_positions_and_indices(positions, vec![0, 1, 3]);
        assert!(matches!(bad.validate_indices(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_face_normal_of_ccw_triangle() {
        let mesh = TriangleMesh::from_triangles(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2]],
        );
        let normals = mesh.calculate_face_normals();
        assert_eq!(normals.len(), 1);
        assert!((normals[0].z - 1.0).abs() < 1e-6);
    }
}
