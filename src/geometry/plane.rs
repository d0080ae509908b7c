use crate::error::{GeometryError, Result};
use crate::math::{polygon, Point3, Vector3, TOLERANCE};

/// An infinite plane in 3D space.
///
/// Defined by an origin point and two orthogonal unit direction vectors
/// (`u_dir`, `v_dir`). The normal is `u_dir × v_dir`.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // Choose a reference vector not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };

        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Creates the supporting plane of a planar polygon.
    ///
    /// The normal follows the polygon's winding (Newell's method); the first
    /// boundary point becomes the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are degenerate (fewer than 3, collinear,
    /// or zero area).
    pub fn from_points(points: &[Point3]) -> Result<Self> {
        if points.len() < 3 {
            return Err(
                GeometryError::Degenerate("plane needs at least 3 points".into()).into(),
            );
        }
        let normal = polygon::newell_normal(points);
        if normal.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("polygon has zero area".into()).into());
        }
        Self::from_normal(points[0], normal)
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the unit normal vector of the plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Evaluates the plane at UV coordinates.
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.origin + self.u_dir * u + self.v_dir * v
    }

    /// Projects a 3D point into the plane's UV coordinate system.
    #[must_use]
    pub fn uv_of(&self, point: &Point3) -> (f64, f64) {
        let diff = point - self.origin;
        (diff.dot(&self.u_dir), diff.dot(&self.v_dir))
    }

    /// Signed distance from a point to the plane, positive on the normal side.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Orthogonal projection of a point onto the plane.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point3 {
        point - self.normal * self.signed_distance(point)
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
    fn from_points_follows_winding() {
        let ccw = vec![
            p(0.0, 0.0, 2.0),
            p(1.0, 0.0, 2.0),
            p(1.0, 1.0, 2.0),
            p(0.0, 1.0, 2.0),
        ];
        let plane = Plane::from_points(&ccw).unwrap();
        assert_relative_eq!(plane.normal().z, 1.0, epsilon = 1e-12);

        let cw: Vec<_> = ccw.into_iter().rev().collect();
        let plane = Plane::from_points(&cw).unwrap();
        assert_relative_eq!(plane.normal().z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn from_points_rejects_collinear() {
        let line = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(Plane::from_points(&line).is_err());
    }

    #[test]
    fn project_lands_on_plane() {
        let plane = Plane::from_normal(p(0.0, 0.0, 1.0), Vector3::z()).unwrap();
        let projected = plane.project(&p(3.0, 4.0, 7.0));
        assert_relative_eq!(projected.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(plane.signed_distance(&p(3.0, 4.0, 7.0)), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn uv_round_trip() {
        let plane = Plane::from_normal(p(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 1.0)).unwrap();
        let point = plane.point_at(0.7, -1.3);
        let (u, v) = plane.uv_of(&point);
        assert_relative_eq!(u, 0.7, epsilon = 1e-12);
        assert_relative_eq!(v, -1.3, epsilon = 1e-12);
    }
}
