//! Core traits for procmesh

use crate::{bounds::Bounds2, mesh::TriangleMesh, point::*};

/// Objects with an axis-aligned extent
pub trait BoundingBox {
    type Bounds;

    /// Get the bounding box of the object
    fn bounding_box(&self) -> Self::Bounds;
}

impl BoundingBox for TriangleMesh {
    type Bounds = (Point3f, Point3f);

    fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.positions.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.positions[0];
        let mut max = self.positions[0];

        for vertex in &self.positions {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);

            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        (min, max)
    }
}

impl BoundingBox for [Point2f] {
    type Bounds = Bounds2;

    fn bounding_box(&self) -> Bounds2 {
        Bounds2::from_points(self)
    }
}
