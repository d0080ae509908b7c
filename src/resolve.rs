use tracing::debug;

use crate::geometry::Solid;
use crate::math::{FrameTransform, MIN_SOLID_VOLUME};
use crate::model::{ElementData, GeometryObject};

/// Extracts a representative solid body from an element's geometry
/// representation, optionally mapping it into a target frame.
///
/// The first body with volume above the degeneracy tolerance wins. A nested
/// instance is descended exactly one level: its children are searched and the
/// found body is rebuilt through the instance placement before the target
/// transform is applied.
///
/// Returning `None` (no usable body) is a normal, silently-skipped outcome.
pub struct ExtractSolid<'a> {
    element: &'a ElementData,
    transform: Option<&'a FrameTransform>,
}

impl<'a> ExtractSolid<'a> {
    /// Creates a new `ExtractSolid` operation.
    #[must_use]
    pub fn new(element: &'a ElementData) -> Self {
        Self {
            element,
            transform: None,
        }
    }

    /// Maps the resolved solid into the frame of the given transform.
    ///
    /// The whole body is rebuilt in the new frame, never individual sample
    /// points, so later face lookups see a consistent body.
    #[must_use]
    pub fn with_transform(mut self, transform: &'a FrameTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Executes the extraction.
    #[must_use]
    pub fn execute(&self) -> Option<Solid> {
        let body = first_body(&self.element.geometry, 0)?;
        match self.transform {
            Some(transform) => body.transformed(transform).ok(),
            None => Some(body),
        }
    }
}

fn first_body(objects: &[GeometryObject], depth: u8) -> Option<Solid> {
    for object in objects {
        match object {
            GeometryObject::Body(solid) => {
                if solid.volume().is_ok_and(|v| v > MIN_SOLID_VOLUME) {
                    return Some(solid.clone());
                }
                debug!("skipping body below volume tolerance");
            }
            GeometryObject::Instance {
                placement,
                children,
            } if depth == 0 => {
                if let Some(found) = first_body(children, depth + 1) {
                    return found.transformed(placement).ok();
                }
            }
            GeometryObject::Instance { .. } => {}
        }
    }
    None
}
