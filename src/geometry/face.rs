use crate::error::{GeometryError, Result};
use crate::math::polygon::{point_in_polygon, polygon_area};
use crate::math::triangulate::triangulate_polygon;
use crate::math::{FrameTransform, Point3};

use super::Plane;

/// A planar polygonal face of a solid.
///
/// The boundary is wound counter-clockwise around the outward normal, so the
/// supporting plane's normal points out of the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarFace {
    boundary: Vec<Point3>,
    plane: Plane,
}

impl PlanarFace {
    /// Creates a face from its boundary polygon.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary is degenerate.
    pub fn new(boundary: Vec<Point3>) -> Result<Self> {
        if boundary.len() < 3 {
            return Err(
                GeometryError::Degenerate("face needs at least 3 boundary points".into()).into(),
            );
        }
        let plane = Plane::from_points(&boundary)?;
        Ok(Self { boundary, plane })
    }

    /// Returns the boundary polygon.
    #[must_use]
    pub fn boundary(&self) -> &[Point3] {
        &self.boundary
    }

    /// Returns the supporting plane.
    #[must_use]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Returns the face area.
    #[must_use]
    pub fn area(&self) -> f64 {
        polygon_area(&self.boundary, self.plane.normal())
    }

    /// Triangulates the face. Triangles share the face's outward winding.
    ///
    /// # Errors
    ///
    /// Returns an error if triangulation fails.
    pub fn triangulate(&self) -> Result<Vec<[Point3; 3]>> {
        triangulate_polygon(&self.boundary, &self.plane)
    }

    /// Distance from a point to its orthogonal projection on the face plane.
    #[must_use]
    pub fn projection_distance(&self, point: &Point3) -> f64 {
        self.plane.signed_distance(point).abs()
    }

    /// Tests whether the orthogonal projection of `point` lands on the face
    /// within `tolerance` of the point itself.
    #[must_use]
    pub fn anchors(&self, point: &Point3, tolerance: f64) -> bool {
        if self.projection_distance(point) > tolerance {
            return false;
        }
        let projected = self.plane.project(point);
        point_in_polygon(&projected, &self.boundary, &self.plane)
    }

    /// Returns this face mapped into another frame.
    ///
    /// All boundary vertices are transformed and the supporting plane is
    /// re-derived from the moved boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformed boundary is degenerate.
    pub fn transformed(&self, transform: &FrameTransform) -> Result<Self> {
        let boundary = self
            .boundary
            .iter()
            .map(|p| transform.of_point(p))
            .collect();
        Self::new(boundary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Vector3, FACE_PROJECTION_TOLERANCE};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square_at(z: f64) -> PlanarFace {
        PlanarFace::new(vec![
            p(0.0, 0.0, z),
            p(1.0, 0.0, z),
            p(1.0, 1.0, z),
            p(0.0, 1.0, z),
        ])
        .unwrap()
    }

    #[test]
    fn area_of_unit_square() {
        assert_relative_eq!(square_at(0.0).area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn anchors_point_near_face() {
        let face = square_at(2.0);
        assert!(face.anchors(&p(0.5, 0.5, 2.0005), FACE_PROJECTION_TOLERANCE));
        // too far off the plane
        assert!(!face.anchors(&p(0.5, 0.5, 2.1), FACE_PROJECTION_TOLERANCE));
        // projection lands outside the boundary
        assert!(!face.anchors(&p(3.0, 0.5, 2.0), FACE_PROJECTION_TOLERANCE));
    }

    #[test]
    fn transformed_moves_boundary_and_plane() {
        let face = square_at(0.0);
        let moved = face
            .transformed(&FrameTransform::from_translation(Vector3::new(0.0, 0.0, 5.0)))
            .unwrap();
        assert_relative_eq!(moved.boundary()[0].z, 5.0, epsilon = 1e-12);
        assert_relative_eq!(moved.plane().signed_distance(&p(0.0, 0.0, 5.0)), 0.0, epsilon = 1e-12);
    }
}
