use super::Point3;

/// An axis-aligned bounding volume: a min/max corner pair in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Outline {
    /// Creates an outline from two corners, normalizing per component.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates the tightest outline around a set of points.
    ///
    /// Returns `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| acc.expanded_to(&p)))
    }

    /// Returns this outline grown to include `point`.
    #[must_use]
    pub fn expanded_to(&self, point: &Point3) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(point.x),
                self.min.y.min(point.y),
                self.min.z.min(point.z),
            ),
            max: Point3::new(
                self.max.x.max(point.x),
                self.max.y.max(point.y),
                self.max.z.max(point.z),
            ),
        }
    }

    /// Returns the smallest outline covering both operands.
    #[must_use]
    pub fn union(&self, other: &Outline) -> Self {
        self.expanded_to(&other.min).expanded_to(&other.max)
    }

    /// Returns the 8 corners of the box.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        let (min, max) = (self.min, self.max);
        [
            Point3::new(min.x, min.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, max.y, max.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(max.x, max.y, max.z),
        ]
    }

    /// Tests whether the overlap with `other` exceeds `epsilon` on every axis.
    ///
    /// Boxes that merely touch (zero-width overlap) do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Outline, epsilon: f64) -> bool {
        self.max.x - other.min.x > epsilon
            && other.max.x - self.min.x > epsilon
            && self.max.y - other.min.y > epsilon
            && other.max.y - self.min.y > epsilon
            && self.max.z - other.min.z > epsilon
            && other.max.z - self.min.z > epsilon
    }

    /// Tests whether `point` lies inside the box expanded by `tolerance`.
    #[must_use]
    pub fn contains(&self, point: &Point3, tolerance: f64) -> bool {
        point.x >= self.min.x - tolerance
            && point.y >= self.min.y - tolerance
            && point.z >= self.min.z - tolerance
            && point.x <= self.max.x + tolerance
            && point.y <= self.max.y + tolerance
            && point.z <= self.max.z + tolerance
    }
}
