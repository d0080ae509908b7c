use tracing::debug;

use crate::math::{Outline, Point3};
use crate::model::{Category, ElementId, LinkData};

/// Spatial prefilter that prunes a linked model's elements against a
/// reference bounding region in the host frame.
///
/// The frame conversion runs once per model, not once per element: the
/// region's 8 corners are mapped through the inverted link transform, an
/// axis-aligned box is re-derived from them in the model's local frame, and
/// that local box prunes the model's element collector.
#[derive(Debug, Clone, Copy)]
pub struct SpatialPrefilter {
    region: Option<Outline>,
}

impl SpatialPrefilter {
    /// Creates a prefilter from a reference region in the host frame,
    /// typically the active 3D view's clip/section region.
    #[must_use]
    pub fn new(region: Outline) -> Self {
        Self {
            region: Some(region),
        }
    }

    /// Creates a prefilter that passes everything through.
    #[must_use]
    pub fn unbounded() -> Self {
        Self { region: None }
    }

    /// Maps the reference region into the linked model's local frame.
    ///
    /// The model's project-base-point offset is removed from each corner
    /// before the inverse link transform is applied.
    #[must_use]
    pub fn local_region(&self, link: &LinkData) -> Option<Outline> {
        let region = self.region?;
        let inverse = link.transform.invert();
        let offset = link.model.base_point_offset;
        let corners = region.corners();
        let local = Outline::from_points(
            corners
                .iter()
                .map(|corner| inverse.of_point(&Point3::from(corner.coords - offset))),
        );
        debug!(role = %link.role, ?local, "prefilter region mapped to link frame");
        local
    }

    /// Collects the linked model's elements of the given categories that fall
    /// inside the reference region.
    #[must_use]
    pub fn collect(&self, link: &LinkData, categories: &[Category]) -> Vec<ElementId> {
        let local = self.local_region(link);
        link.model.collect(categories, local.as_ref())
    }
}
