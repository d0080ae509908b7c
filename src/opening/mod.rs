pub mod template;

pub use template::{ensure_template, locate_template, TemplateConfig, TemplateSearchPath};

use tracing::{debug, warn};

use crate::clash::ClashRecord;
use crate::error::{PlacementError, Result};
use crate::geometry::Solid;
use crate::math::{Point3, Vector3, FACE_PROJECTION_TOLERANCE};
use crate::model::{Anchor, Category, Document, ElementData, ElementId, Transaction};
use crate::resolve::ExtractSolid;

/// Opening dimensions derived from a clash record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningSize {
    /// In-plane opening width (and length; openings are square).
    pub width: f64,
    /// Through-thickness opening height.
    pub height: f64,
}

impl OpeningSize {
    /// Derives the opening size from a clash record.
    #[must_use]
    pub fn from_record(record: &ClashRecord) -> Self {
        Self {
            width: record.opening_width(),
            height: record.opening_height(),
        }
    }
}

/// Finds the host face that anchors the clash location: the face whose
/// orthogonal projection of the location lies within tolerance of the
/// location itself.
///
/// Returns the face index, or `None` when no face qualifies.
#[must_use]
pub fn resolve_anchor_face(host_solid: &Solid, location: &Point3) -> Option<usize> {
    host_solid
        .faces()
        .iter()
        .position(|face| face.anchors(location, FACE_PROJECTION_TOLERANCE))
}

/// A placement failure recorded for reporting; never aborts the batch.
#[derive(Debug, Clone)]
pub struct PlacementFailure {
    /// Clash location whose opening could not be placed.
    pub location: Point3,
    /// Failure description.
    pub reason: String,
}

/// Terminal state of one clash record's placement.
#[derive(Debug, Clone)]
pub enum PlacementOutcome {
    /// Face-hosted opening placed.
    Placed(ElementId),
    /// Free-standing opening placed at the nearest story.
    FallbackPlaced(ElementId),
    /// Both strategies failed; recorded and skipped.
    Failed(PlacementFailure),
}

/// Aggregate result of one placement batch.
#[derive(Debug, Clone, Default)]
pub struct PlacementSummary {
    /// Face-hosted placements.
    pub placed: usize,
    /// Story-fallback placements.
    pub fallback: usize,
    /// Recorded failures.
    pub failures: Vec<PlacementFailure>,
}

impl PlacementSummary {
    /// Total number of openings created.
    #[must_use]
    pub fn openings(&self) -> usize {
        self.placed + self.fallback
    }
}

/// Places one opening per clash record inside a single atomic mutation scope.
///
/// Each record walks the state machine sized → face-resolved → placed, with
/// the story fallback when face resolution or face-hosted instantiation
/// fails, and a recorded failure when both strategies fail. An unexpected
/// document error escapes the scope and rolls the whole batch back.
pub struct OpeningPlacer<'a> {
    config: &'a TemplateConfig,
}

impl<'a> OpeningPlacer<'a> {
    /// Creates a placer for the given template configuration.
    #[must_use]
    pub fn new(config: &'a TemplateConfig) -> Self {
        Self { config }
    }

    /// Places openings for every record, committing them as one unit.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is inconsistent (missing link or
    /// element); the mutation scope is rolled back and nothing is committed.
    pub fn place_all(
        &self,
        doc: &mut Document,
        records: &[ClashRecord],
    ) -> Result<PlacementSummary> {
        let mut tx = Transaction::start(doc, "Create slab openings");
        let mut summary = PlacementSummary::default();

        for record in records {
            match self.place_one(tx.doc(), record)? {
                PlacementOutcome::Placed(_) => summary.placed += 1,
                PlacementOutcome::FallbackPlaced(_) => summary.fallback += 1,
                PlacementOutcome::Failed(failure) => summary.failures.push(failure),
            }
        }

        tx.commit();
        Ok(summary)
    }

    /// Walks the placement state machine for one record.
    ///
    /// # Errors
    ///
    /// Returns an error only when the record references a link or element
    /// missing from the document.
    pub fn place_one(&self, doc: &mut Document, record: &ClashRecord) -> Result<PlacementOutcome> {
        let size = OpeningSize::from_record(record);

        let link = doc.link(record.host.link)?;
        let host_element = link.model.element(record.host.element)?;
        let host_solid = ExtractSolid::new(host_element)
            .with_transform(&link.transform)
            .execute();

        let anchor_face = host_solid
            .as_ref()
            .and_then(|solid| resolve_anchor_face(solid, &record.location));

        match anchor_face {
            Some(face) => match self.instantiate_on_face(doc, record, face, size) {
                Ok(id) => Ok(PlacementOutcome::Placed(id)),
                Err(err) => {
                    warn!(error = %err, "face-hosted placement failed, trying story fallback");
                    self.place_fallback(doc, record, size)
                }
            },
            None => {
                debug!("no anchor face within tolerance, using story fallback");
                self.place_fallback(doc, record, size)
            }
        }
    }

    fn place_fallback(
        &self,
        doc: &mut Document,
        record: &ClashRecord,
        size: OpeningSize,
    ) -> Result<PlacementOutcome> {
        match self.instantiate_at_story(doc, record, size) {
            Ok(id) => Ok(PlacementOutcome::FallbackPlaced(id)),
            Err(err) => {
                warn!(error = %err, location = ?record.location, "opening placement failed");
                Ok(PlacementOutcome::Failed(PlacementFailure {
                    location: record.location,
                    reason: err.to_string(),
                }))
            }
        }
    }

    fn instantiate_on_face(
        &self,
        doc: &mut Document,
        record: &ClashRecord,
        face: usize,
        size: OpeningSize,
    ) -> std::result::Result<ElementId, PlacementError> {
        self.check_template(doc)?;
        let mut opening = ElementData::new(Category::Opening, self.config.type_label.clone());
        opening.anchor = Some(Anchor::Face {
            host: record.host,
            face,
            location: record.location,
            axis: Vector3::x(),
        });
        let id = doc.add_element(opening);
        self.set_size_params(doc, id, size)?;
        Ok(id)
    }

    fn instantiate_at_story(
        &self,
        doc: &mut Document,
        record: &ClashRecord,
        size: OpeningSize,
    ) -> std::result::Result<ElementId, PlacementError> {
        self.check_template(doc)?;
        let level = doc
            .nearest_level(record.location.z)
            .ok_or(PlacementError::NoLevels)?
            .name
            .clone();
        let mut opening = ElementData::new(Category::Opening, self.config.type_label.clone());
        opening.anchor = Some(Anchor::Story {
            level,
            location: record.location,
        });
        let id = doc.add_element(opening);
        self.set_size_params(doc, id, size)?;
        Ok(id)
    }

    fn check_template(&self, doc: &Document) -> std::result::Result<(), PlacementError> {
        if doc
            .find_template(&self.config.name, &self.config.type_label)
            .is_none()
        {
            return Err(PlacementError::Instantiation(format!(
                "template '{}' with type '{}' is not loaded",
                self.config.name, self.config.type_label
            )));
        }
        Ok(())
    }

    fn set_size_params(
        &self,
        doc: &mut Document,
        id: ElementId,
        size: OpeningSize,
    ) -> std::result::Result<(), PlacementError> {
        for (name, value) in [
            (&self.config.width_param, size.width),
            (&self.config.length_param, size.width),
            (&self.config.height_param, size.height),
        ] {
            doc.set_param(id, name.clone(), value)
                .map_err(|e| PlacementError::Instantiation(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clash::ClashRecord;
    use crate::geometry::MakeBox;
    use crate::math::FrameTransform;
    use crate::model::{ElementRef, LinkData, LinkId, Model, Template};
    use approx::assert_relative_eq;
    use slotmap::Key;
    use std::path::PathBuf;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn config() -> TemplateConfig {
        TemplateConfig::default()
    }

    /// Host document with one linked slab (2×2, z in [0, 0.35]).
    fn doc_with_slab(with_level: bool, with_template: bool) -> (Document, ElementRef) {
        let mut slabs = Model::new();
        let slab = slabs.add_element(
            ElementData::new(Category::Floor, "Slab").with_body(
                MakeBox::new(p(-1.0, -1.0, 0.0), p(1.0, 1.0, 0.35)).build().unwrap(),
            ),
        );

        let mut doc = Document::new();
        let link = doc.add_link(LinkData {
            path: PathBuf::from("/models/structural.rvt"),
            role: "host".into(),
            transform: FrameTransform::identity(),
            model: slabs,
        });
        if with_level {
            doc.add_level("Story 1", 0.0);
        }
        if with_template {
            doc.add_template(Template {
                name: config().name,
                type_label: config().type_label,
            });
        }

        (doc, ElementRef { link, element: slab })
    }

    fn record_at(host: ElementRef, location: Point3) -> ClashRecord {
        ClashRecord {
            penetrating: host, // unused by placement
            host,
            location,
            diameter: 0.2,
            thickness: 0.3,
        }
    }

    #[test]
    fn sizing_is_deterministic() {
        let (_, host) = doc_with_slab(true, true);
        let size = OpeningSize::from_record(&record_at(host, p(0.0, 0.0, 0.0)));
        assert_relative_eq!(size.width, 0.3, epsilon = 1e-12);
        assert_relative_eq!(size.height, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn anchor_face_found_for_point_on_surface() {
        let solid = MakeBox::new(p(-1.0, -1.0, 0.0), p(1.0, 1.0, 0.35)).build().unwrap();
        let face = resolve_anchor_face(&solid, &p(0.2, 0.2, 0.35)).unwrap();
        // the resolved face's plane passes through the point
        assert!(solid.faces()[face].anchors(&p(0.2, 0.2, 0.35), FACE_PROJECTION_TOLERANCE));
        // a point buried mid-thickness anchors nowhere
        assert!(resolve_anchor_face(&solid, &p(0.0, 0.0, 0.175)).is_none());
    }

    #[test]
    fn location_on_face_places_hosted_opening() {
        let (mut doc, host) = doc_with_slab(true, true);
        let cfg = config();
        let placer = OpeningPlacer::new(&cfg);
        let record = record_at(host, p(0.2, 0.2, 0.35));

        let summary = placer.place_all(&mut doc, std::slice::from_ref(&record)).unwrap();

        assert_eq!(summary.placed, 1);
        assert_eq!(summary.fallback, 0);
        let openings = doc.elements_of_category(Category::Opening);
        assert_eq!(openings.len(), 1);

        let opening = doc.element(openings[0]).unwrap();
        assert!(matches!(opening.anchor, Some(Anchor::Face { .. })));
        assert_relative_eq!(opening.param("opening_width").unwrap(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(opening.param("opening_length").unwrap(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(opening.param("opening_depth").unwrap(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn buried_location_falls_back_to_story() {
        let (mut doc, host) = doc_with_slab(true, true);
        let cfg = config();
        let placer = OpeningPlacer::new(&cfg);
        let record = record_at(host, p(0.0, 0.0, 0.175));

        let summary = placer.place_all(&mut doc, std::slice::from_ref(&record)).unwrap();

        assert_eq!(summary.placed, 0);
        assert_eq!(summary.fallback, 1);
        let openings = doc.elements_of_category(Category::Opening);
        let opening = doc.element(openings[0]).unwrap();
        match &opening.anchor {
            Some(Anchor::Story { level, location }) => {
                assert_eq!(level, "Story 1");
                assert_relative_eq!(location.z, 0.175, epsilon = 1e-12);
            }
            other => panic!("expected story anchor, got {other:?}"),
        }
    }

    #[test]
    fn failure_is_recorded_and_batch_continues() {
        // no story in the document: the buried record's fallback has nothing
        // to anchor to, but the face-hosted record must still land
        let (mut doc, host) = doc_with_slab(false, true);
        let records = vec![
            record_at(host, p(0.2, 0.2, 0.35)),  // face-hosted, fine
            record_at(host, p(0.0, 0.0, 0.175)), // needs the missing fallback
        ];

        let cfg = config();
        let placer = OpeningPlacer::new(&cfg);
        let summary = placer.place_all(&mut doc, &records).unwrap();

        assert_eq!(summary.placed, 1);
        assert_eq!(summary.fallback, 0);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(doc.elements_of_category(Category::Opening).len(), 1);
    }

    #[test]
    fn missing_template_fails_both_strategies() {
        let (mut doc, host) = doc_with_slab(true, false);

        let cfg = config();
        let placer = OpeningPlacer::new(&cfg);
        let record = record_at(host, p(0.2, 0.2, 0.35));
        let summary = placer.place_all(&mut doc, std::slice::from_ref(&record)).unwrap();

        assert_eq!(summary.openings(), 0);
        assert_eq!(summary.failures.len(), 1);
        assert!(doc.elements_of_category(Category::Opening).is_empty());
    }

    #[test]
    fn dangling_record_rolls_back_the_whole_batch() {
        let (mut doc, host) = doc_with_slab(true, true);
        let cfg = config();
        let placer = OpeningPlacer::new(&cfg);
        let good = record_at(host, p(0.2, 0.2, 0.35));
        let dangling = ClashRecord {
            penetrating: host,
            host: ElementRef {
                link: LinkId::null(),
                element: host.element,
            },
            location: p(0.0, 0.0, 0.0),
            diameter: 0.1,
            thickness: 0.4,
        };

        let result = placer.place_all(&mut doc, &[good, dangling]);

        assert!(result.is_err());
        // the scope rolled back: the first opening is gone too
        assert!(doc.elements_of_category(Category::Opening).is_empty());
    }
}
