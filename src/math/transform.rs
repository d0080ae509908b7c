use super::{Matrix3, Outline, Point3, Vector3};

/// An affine frame transform: orthonormal rotation plus translation.
///
/// Maps points authored in one model's frame into another frame (typically
/// an externally-referenced model's frame into the host frame).
///
/// The rotation part must be orthonormal; a malformed rotation is a
/// precondition violation of the caller, not an error state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    rotation: Matrix3,
    translation: Vector3,
}

impl FrameTransform {
    /// Creates a transform from an orthonormal rotation and a translation.
    #[must_use]
    pub fn new(rotation: Matrix3, translation: Vector3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// A pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3) -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation,
        }
    }

    /// A rotation about the global Z axis by `angle` radians.
    #[must_use]
    pub fn rotation_about_z(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let rotation = Matrix3::new(
            cos, -sin, 0.0, //
            sin, cos, 0.0, //
            0.0, 0.0, 1.0,
        );
        Self {
            rotation,
            translation: Vector3::zeros(),
        }
    }

    /// Returns the rotation part.
    #[must_use]
    pub fn rotation(&self) -> &Matrix3 {
        &self.rotation
    }

    /// Returns the translation part.
    #[must_use]
    pub fn translation(&self) -> &Vector3 {
        &self.translation
    }

    /// Composes two transforms: the result applies `inner` first, then `self`.
    #[must_use]
    pub fn compose(&self, inner: &FrameTransform) -> FrameTransform {
        FrameTransform {
            rotation: self.rotation * inner.rotation,
            translation: self.rotation * inner.translation + self.translation,
        }
    }

    /// Returns the inverse transform.
    ///
    /// Relies on the rotation being orthonormal, so the inverse rotation is
    /// its transpose. Round trips satisfy
    /// `invert(t).of_point(&t.of_point(&p)) ≈ p` within 1e-6.
    #[must_use]
    pub fn invert(&self) -> FrameTransform {
        let inverse_rotation = self.rotation.transpose();
        FrameTransform {
            rotation: inverse_rotation,
            translation: -(inverse_rotation * self.translation),
        }
    }

    /// Maps a point through the transform.
    #[must_use]
    pub fn of_point(&self, point: &Point3) -> Point3 {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Maps a direction vector through the transform (translation ignored).
    #[must_use]
    pub fn of_vector(&self, vector: &Vector3) -> Vector3 {
        self.rotation * vector
    }

    /// Maps an axis-aligned outline through the transform.
    ///
    /// A rotation does not preserve axis alignment, so all 8 corners are
    /// transformed and a new axis-aligned box is derived from them.
    #[must_use]
    pub fn of_outline(&self, outline: &Outline) -> Outline {
        let corners = outline.corners();
        let mut mapped = corners.iter().map(|c| self.of_point(c));
        // corners() is never empty, so the fold has a seed
        let first = mapped
            .next()
            .unwrap_or_else(|| self.of_point(&outline.min));
        mapped.fold(Outline::new(first, first), |acc, p| acc.expanded_to(&p))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TRANSFORM_TOLERANCE;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn round_trip_recovers_point() {
        let t = FrameTransform::rotation_about_z(0.7)
            .compose(&FrameTransform::from_translation(Vector3::new(3.0, -2.0, 5.5)));
        let point = p(1.25, -4.5, 2.0);

        let back = t.invert().of_point(&t.of_point(&point));

        assert_relative_eq!(back.x, point.x, epsilon = TRANSFORM_TOLERANCE);
        assert_relative_eq!(back.y, point.y, epsilon = TRANSFORM_TOLERANCE);
        assert_relative_eq!(back.z, point.z, epsilon = TRANSFORM_TOLERANCE);
    }

    #[test]
    fn compose_applies_inner_first() {
        let rotate = FrameTransform::rotation_about_z(FRAC_PI_2);
        let translate = FrameTransform::from_translation(Vector3::new(1.0, 0.0, 0.0));

        // rotate ∘ translate: point moves +X first, then rotates onto +Y
        let composed = rotate.compose(&translate);
        let mapped = composed.of_point(&p(0.0, 0.0, 0.0));

        assert_relative_eq!(mapped.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(mapped.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn of_vector_ignores_translation() {
        let t = FrameTransform::from_translation(Vector3::new(10.0, 10.0, 10.0));
        let v = t.of_vector(&Vector3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(v.z, 2.0, epsilon = 1e-12);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn of_outline_reboxes_rotated_corners() {
        // Unit box rotated 90° about Z stays a unit box shifted into -X
        let outline = Outline::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let rotated = FrameTransform::rotation_about_z(FRAC_PI_2).of_outline(&outline);

        assert_relative_eq!(rotated.min.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(rotated.max.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(rotated.min.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(rotated.max.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(rotated.max.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn identity_leaves_points_alone() {
        let point = p(4.0, 5.0, 6.0);
        assert_eq!(FrameTransform::identity().of_point(&point), point);
    }
}
