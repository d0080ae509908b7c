use tracing::{debug, info};

use crate::error::Result;
use crate::geometry::IntersectSolids;
use crate::math::{Point3, MIN_SOLID_VOLUME};
use crate::model::{params, Document, ElementData, ElementId, ElementRef, LinkId};
use crate::resolve::ExtractSolid;

/// Diameter assumed for a penetrating element without a diameter parameter.
pub const DEFAULT_PIPE_DIAMETER: f64 = 0.1;

/// Thickness assumed for a host element without a thickness parameter.
pub const DEFAULT_SLAB_THICKNESS: f64 = 0.4;

/// One accepted clash between a penetrating element and a host element.
///
/// Created once per accepted clash, immutable, consumed once by placement.
/// The location is expressed in the host frame.
#[derive(Debug, Clone)]
pub struct ClashRecord {
    /// The penetrating element.
    pub penetrating: ElementRef,
    /// The host element.
    pub host: ElementRef,
    /// Volumetric centroid of the intersection, in the host frame.
    pub location: Point3,
    /// Diameter of the penetrating element.
    pub diameter: f64,
    /// Thickness of the host element.
    pub thickness: f64,
}

impl ClashRecord {
    /// Opening width derived from the penetrating diameter.
    #[must_use]
    pub fn opening_width(&self) -> f64 {
        self.diameter * 1.5
    }

    /// Opening height derived from the host thickness, with 5cm clearance on
    /// each side.
    #[must_use]
    pub fn opening_height(&self) -> f64 {
        self.thickness + 0.10
    }
}

/// Diameter of a penetrating element, trying the pipe parameter first and the
/// conduit parameter second.
#[must_use]
pub fn penetrating_diameter(element: &ElementData) -> f64 {
    element
        .param(params::PIPE_DIAMETER)
        .or_else(|| element.param(params::CONDUIT_DIAMETER))
        .unwrap_or(DEFAULT_PIPE_DIAMETER)
}

/// Core thickness of a host element.
#[must_use]
pub fn host_thickness(element: &ElementData) -> f64 {
    element
        .param(params::CORE_THICKNESS)
        .unwrap_or(DEFAULT_SLAB_THICKNESS)
}

/// Pairwise exact clash detection between classified penetrating and host
/// element sets.
///
/// Both solids are resolved into the host frame before intersecting; frame
/// conversion happens nowhere else. Pairs whose bodies resolve below the
/// volume tolerance are skipped during resolution; an intersection is
/// accepted only when its volume exceeds the same tolerance. Runtime is
/// O(|penetrating| × |host|), acceptable because the prefilter keeps both
/// sets small.
pub struct ClashScan<'a> {
    doc: &'a Document,
    penetrating_link: LinkId,
    host_link: LinkId,
    penetrating: &'a [ElementId],
    host: &'a [ElementId],
}

impl<'a> ClashScan<'a> {
    /// Creates a new `ClashScan` operation.
    #[must_use]
    pub fn new(
        doc: &'a Document,
        penetrating_link: LinkId,
        host_link: LinkId,
        penetrating: &'a [ElementId],
        host: &'a [ElementId],
    ) -> Self {
        Self {
            doc,
            penetrating_link,
            host_link,
            penetrating,
            host,
        }
    }

    /// Executes the scan, returning one record per accepted clash.
    ///
    /// # Errors
    ///
    /// Returns an error if either link is missing from the document.
    pub fn execute(&self) -> Result<Vec<ClashRecord>> {
        let penetrating_link = self.doc.link(self.penetrating_link)?;
        let host_link = self.doc.link(self.host_link)?;

        let mut records = Vec::new();

        for &pipe_id in self.penetrating {
            let pipe = penetrating_link.model.element(pipe_id)?;
            let Some(pipe_solid) = ExtractSolid::new(pipe)
                .with_transform(&penetrating_link.transform)
                .execute()
            else {
                debug!("penetrating element without usable body, skipped");
                continue;
            };

            for &slab_id in self.host {
                let slab = host_link.model.element(slab_id)?;
                let Some(slab_solid) = ExtractSolid::new(slab)
                    .with_transform(&host_link.transform)
                    .execute()
                else {
                    debug!("host element without usable body, skipped");
                    continue;
                };

                let Some(intersection) = IntersectSolids::new(&pipe_solid, &slab_solid).execute()
                else {
                    continue;
                };
                let Ok(volume) = intersection.volume() else {
                    continue;
                };
                if volume <= MIN_SOLID_VOLUME {
                    continue;
                }
                let Ok(location) = intersection.centroid() else {
                    continue;
                };

                records.push(ClashRecord {
                    penetrating: ElementRef {
                        link: self.penetrating_link,
                        element: pipe_id,
                    },
                    host: ElementRef {
                        link: self.host_link,
                        element: slab_id,
                    },
                    location,
                    diameter: penetrating_diameter(pipe),
                    thickness: host_thickness(slab),
                });
            }
        }

        info!(clashes = records.len(), "clash scan finished");
        Ok(records)
    }
}
