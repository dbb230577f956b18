//! Axis-aligned 2D bounds

use crate::point::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned 2D box grown point by point.
///
/// A freshly created box is invalid; the first added point initializes both
/// corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    pub min: Point2f,
    pub max: Point2f,
    pub is_valid: bool,
}

impl Bounds2 {
    /// Create an empty (invalid) box
    pub fn new() -> Self {
        Self {
            min: Point2f::origin(),
            max: Point2f::origin(),
            is_valid: false,
        }
    }

    /// Create the smallest box enclosing `points`
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point2f>,
    {
        let mut bounds = Self::new();
        for p in points {
            bounds.add_point(p);
        }
        bounds
    }

    /// Grow the box to include `p`
    pub fn add_point(&mut self, p: &Point2f) {
        if self.is_valid {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = *p;
            self.max = *p;
            self.is_valid = true;
        }
    }

    /// Width and height of the box
    pub fn size(&self) -> Vector2f {
        self.max - self.min
    }

    pub fn center(&self) -> Point2f {
        nalgebra::center(&self.min, &self.max)
    }

    /// Uniform scale that fits this box into `dimension`, times `scale`.
    ///
    /// Axes with zero extent do not constrain the result; a box with no extent
    /// at all yields `scale` itself.
    pub fn fit_scale(&self, dimension: &Vector2f, scale: f32) -> f32 {
        let size = self.size();
        let mut fit = f32::INFINITY;
        if size.x > 0.0 {
            fit = fit.min(dimension.x / size.x);
        }
        if size.y > 0.0 {
            fit = fit.min(dimension.y / size.y);
        }
        if fit.is_finite() {
            fit * scale
        } else {
            scale
        }
    }
}

impl Default for Bounds2 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grow() {
        let mut b = Bounds2::new();
        assert!(!b.is_valid);
        b.add_point(&Point2f::new(2.0, -1.0));
        assert_eq!(b.min, Point2f::new(2.0, -1.0));
        assert_eq!(b.max, Point2f::new(2.0, -1.0));
        b.add_point(&Point2f::new(-3.0, 4.0));
        assert_eq!(b.size(), Vector2f::new(5.0, 5.0));
        assert_eq!(b.center(), Point2f::new(-0.5, 1.5));
    }

    #[test]
    fn test_fit_scale_uses_limiting_axis() {
        let b = Bounds2::from_points(&[Point2f::new(0.0, 0.0), Point2f::new(2.0, 1.0)]);
        assert_relative_eq!(b.fit_scale(&Vector2f::new(10.0, 10.0), 1.0), 5.0);
        assert_relative_eq!(b.fit_scale(&Vector2f::new(10.0, 2.0), 0.5), 1.0);
    }

    #[test]
    fn test_fit_scale_tiny_box() {
        let b = Bounds2::from_points(&[Point2f::new(0.0, 0.0), Point2f::new(5.0e-5, 2.5e-5)]);
        assert_relative_eq!(b.fit_scale(&Vector2f::new(100.0, 100.0), 1.0), 2.0e6, max_relative = 1e-5);

        // A flat box is fitted along its only extent
        let flat = Bounds2::from_points(&[Point2f::new(1.0, 0.0), Point2f::new(1.0, 1.0e-5)]);
        assert_relative_eq!(flat.fit_scale(&Vector2f::new(10.0, 10.0), 0.5), 5.0e5, max_relative = 1e-5);
    }

    #[test]
    fn test_fit_scale_degenerate_box() {
        let b = Bounds2::from_points(&[Point2f::new(1.0, 1.0)]);
        assert_relative_eq!(b.fit_scale(&Vector2f::new(10.0, 10.0), 0.9), 0.9);
    }
}
