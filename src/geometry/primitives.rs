use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{polygon, Point3, Vector3, TOLERANCE};

use super::{PlanarFace, Plane, Solid};

/// Creates a box solid from two corner points.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Builds the box solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the corners coincide on any axis.
    pub fn build(&self) -> Result<Solid> {
        let (min, max) = (self.min_corner, self.max_corner);
        if (max.x - min.x).abs() < TOLERANCE
            || (max.y - min.y).abs() < TOLERANCE
            || (max.z - min.z).abs() < TOLERANCE
        {
            return Err(GeometryError::Degenerate("box has zero extent".into()).into());
        }
        let profile = vec![
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
        ];
        MakeExtrusion::new(profile, Vector3::new(0.0, 0.0, max.z - min.z)).build()
    }
}

/// Creates a prismatic solid by extruding a planar profile along a direction.
pub struct MakeExtrusion {
    profile: Vec<Point3>,
    direction: Vector3,
}

impl MakeExtrusion {
    /// Creates a new `MakeExtrusion` operation.
    ///
    /// The direction's magnitude is the extrusion distance. The profile may
    /// be concave; its winding is normalized internally.
    #[must_use]
    pub fn new(profile: Vec<Point3>, direction: Vector3) -> Self {
        Self { profile, direction }
    }

    /// Builds the prism.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is degenerate, the direction is
    /// zero-length, or the direction lies in the profile plane.
    pub fn build(&self) -> Result<Solid> {
        if self.profile.len() < 3 {
            return Err(
                GeometryError::Degenerate("extrusion profile needs at least 3 points".into())
                    .into(),
            );
        }
        if self.direction.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }

        let normal = polygon::newell_normal(&self.profile);
        let alignment = normal.dot(&self.direction);
        if alignment.abs() < TOLERANCE {
            return Err(
                GeometryError::Degenerate("extrusion direction lies in profile plane".into())
                    .into(),
            );
        }

        // Normalize to counter-clockwise about the extrusion direction
        let mut profile = self.profile.clone();
        if alignment < 0.0 {
            profile.reverse();
        }

        let top: Vec<Point3> = profile.iter().map(|p| p + self.direction).collect();
        let bottom: Vec<Point3> = profile.iter().rev().copied().collect();

        let mut faces = Vec::with_capacity(profile.len() + 2);
        faces.push(PlanarFace::new(bottom)?);
        faces.push(PlanarFace::new(top)?);
        for i in 0..profile.len() {
            let a = profile[i];
            let b = profile[(i + 1) % profile.len()];
            faces.push(PlanarFace::new(vec![
                a,
                b,
                b + self.direction,
                a + self.direction,
            ])?);
        }

        Solid::from_faces(faces)
    }
}

/// Creates a pipe-like solid: a regular prism approximating a circular
/// cylinder between two points.
pub struct MakePipe {
    start: Point3,
    end: Point3,
    diameter: f64,
    segments: usize,
}

impl MakePipe {
    /// Creates a new `MakePipe` operation with 16 cross-section segments.
    #[must_use]
    pub fn new(start: Point3, end: Point3, diameter: f64) -> Self {
        Self {
            start,
            end,
            diameter,
            segments: 16,
        }
    }

    /// Sets the number of cross-section segments (minimum 3).
    #[must_use]
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    /// Builds the pipe solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is zero-length, the diameter is not
    /// positive, or fewer than 3 segments were requested.
    pub fn build(&self) -> Result<Solid> {
        let axis = self.end - self.start;
        if axis.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        if self.diameter < TOLERANCE {
            return Err(GeometryError::Degenerate("pipe diameter must be positive".into()).into());
        }
        if self.segments < 3 {
            return Err(
                GeometryError::Degenerate("pipe needs at least 3 segments".into()).into(),
            );
        }

        let section = Plane::from_normal(self.start, axis)?;
        let radius = self.diameter / 2.0;
        #[allow(clippy::cast_precision_loss)]
        let profile: Vec<Point3> = (0..self.segments)
            .map(|i| {
                let angle = TAU * i as f64 / self.segments as f64;
                section.point_at(radius * angle.cos(), radius * angle.sin())
            })
            .collect();

        MakeExtrusion::new(profile, axis).build()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn box_has_six_faces() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).build().unwrap();
        assert_eq!(solid.faces().len(), 6);
    }

    #[test]
    fn box_faces_point_outward() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0)).build().unwrap();
        let center = p(1.0, 1.0, 1.0);
        for face in solid.faces() {
            assert!(face.plane().signed_distance(&center) < 0.0);
        }
    }

    #[test]
    fn degenerate_box_is_rejected() {
        assert!(MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0)).build().is_err());
    }

    #[test]
    fn concave_extrusion_volume() {
        // L-shaped profile of area 3, extruded 2 units
        let profile = vec![
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(1.0, 2.0, 0.0),
            p(0.0, 2.0, 0.0),
        ];
        let solid = MakeExtrusion::new(profile, Vector3::new(0.0, 0.0, 2.0)).build().unwrap();
        assert_relative_eq!(solid.volume().unwrap(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn clockwise_profile_is_normalized() {
        let profile = vec![
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 0.0, 0.0),
        ];
        let solid = MakeExtrusion::new(profile, Vector3::new(0.0, 0.0, 1.0)).build().unwrap();
        assert_relative_eq!(solid.volume().unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn pipe_volume_matches_prism_area() {
        let segments = 16;
        let diameter = 0.2;
        let radius = diameter / 2.0;
        let solid = MakePipe::new(p(0.0, 0.0, -1.0), p(0.0, 0.0, 1.0), diameter)
            .with_segments(segments)
            .build()
            .unwrap();
        // regular n-gon area: n/2 * r² * sin(τ/n)
        #[allow(clippy::cast_precision_loss)]
        let n = segments as f64;
        let expected = n / 2.0 * radius * radius * (TAU / n).sin() * 2.0;
        assert_relative_eq!(solid.volume().unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn tilted_pipe_builds() {
        let solid = MakePipe::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), 0.1).build().unwrap();
        assert!(solid.volume().unwrap() > 0.0);
    }
}
