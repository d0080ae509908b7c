use crate::error::{GeometryError, Result};
use crate::math::{FrameTransform, Outline, Point3};

use super::PlanarFace;

/// A watertight 3D body bounded by planar polygonal faces.
///
/// Faces are wound counter-clockwise around their outward normals.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    faces: Vec<PlanarFace>,
}

impl Solid {
    /// Creates a solid from its boundary faces.
    ///
    /// # Errors
    ///
    /// Returns an error if no faces are given.
    pub fn from_faces(faces: Vec<PlanarFace>) -> Result<Self> {
        if faces.is_empty() {
            return Err(GeometryError::Degenerate("solid has no faces".into()).into());
        }
        Ok(Self { faces })
    }

    /// Returns the face set.
    #[must_use]
    pub fn faces(&self) -> &[PlanarFace] {
        &self.faces
    }

    /// Computes the volume of the solid.
    ///
    /// Uses triangulation and the signed tetrahedron method: each triangle
    /// contributes `v0 · (v1 × v2) / 6`. The face's outward normal corrects
    /// any triangle whose winding disagrees with it, making the sum robust
    /// against mixed winding orders.
    ///
    /// # Errors
    ///
    /// Returns an error if a face cannot be triangulated.
    pub fn volume(&self) -> Result<f64> {
        let mut signed_volume = 0.0;
        for face in &self.faces {
            let outward = *face.plane().normal();
            for tri in face.triangulate()? {
                let winding = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
                let det = tri[0].coords.dot(&tri[1].coords.cross(&tri[2].coords));
                if winding.dot(&outward) >= 0.0 {
                    signed_volume += det;
                } else {
                    signed_volume -= det;
                }
            }
        }
        Ok(signed_volume.abs() / 6.0)
    }

    /// Computes the volumetric centroid as the area-weighted mean of the
    /// triangulated faces' centroids.
    ///
    /// More accurate than a bounding-box midpoint for lopsided bodies.
    ///
    /// # Errors
    ///
    /// Returns an error if a face cannot be triangulated or the total
    /// surface area is degenerate.
    pub fn centroid(&self) -> Result<Point3> {
        let mut weighted = Point3::origin().coords;
        let mut total_area = 0.0;
        for face in &self.faces {
            for tri in face.triangulate()? {
                let area = (tri[1] - tri[0]).cross(&(tri[2] - tri[0])).norm() / 2.0;
                let center = (tri[0].coords + tri[1].coords + tri[2].coords) / 3.0;
                weighted += center * area;
                total_area += area;
            }
        }
        if total_area < crate::math::TOLERANCE {
            return Err(GeometryError::Degenerate("solid has zero surface area".into()).into());
        }
        Ok(Point3::from(weighted / total_area))
    }

    /// Returns the axis-aligned bounding outline of the solid.
    #[must_use]
    pub fn outline(&self) -> Outline {
        let vertices = self
            .faces
            .iter()
            .flat_map(|f| f.boundary().iter().copied());
        // from_faces guarantees at least one face with at least 3 points
        Outline::from_points(vertices)
            .unwrap_or_else(|| Outline::new(Point3::origin(), Point3::origin()))
    }

    /// Returns this solid rebuilt in another frame.
    ///
    /// The whole body is moved consistently: every face boundary is
    /// transformed and its plane re-derived, so downstream face lookups see
    /// the body in the target frame.
    ///
    /// # Errors
    ///
    /// Returns an error if a transformed face becomes degenerate.
    pub fn transformed(&self, transform: &FrameTransform) -> Result<Self> {
        let faces = self
            .faces
            .iter()
            .map(|f| f.transformed(transform))
            .collect::<Result<Vec<_>>>()?;
        Self::from_faces(faces)
    }
}
