use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Solid;
use crate::math::{FrameTransform, Outline, Point3, Vector3};

slotmap::new_key_type! {
    /// Unique identifier for an element within one document or model.
    pub struct ElementId;

    /// Unique identifier for an external model link in the host document.
    pub struct LinkId;
}

/// Addresses an element inside a linked model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef {
    /// The link the element lives behind.
    pub link: LinkId,
    /// The element within that link's model.
    pub element: ElementId,
}

/// Category tag of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Pipe,
    Conduit,
    Floor,
    Wall,
    Opening,
    GenericModel,
}

impl Category {
    /// Human-readable category name, matched against role keywords.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Pipe => "Pipes",
            Category::Conduit => "Conduits",
            Category::Floor => "Floors",
            Category::Wall => "Walls",
            Category::Opening => "Openings",
            Category::GenericModel => "Generic Models",
        }
    }
}

/// Well-known element parameter names.
pub mod params {
    /// Outside diameter of a piping segment.
    pub const PIPE_DIAMETER: &str = "pipe_diameter";
    /// Outside diameter of an electrical conduit.
    pub const CONDUIT_DIAMETER: &str = "conduit_diameter";
    /// Structural core thickness of a floor slab.
    pub const CORE_THICKNESS: &str = "core_thickness";
}

/// One object in an element's geometry representation.
#[derive(Debug, Clone)]
pub enum GeometryObject {
    /// A directly-owned body.
    Body(Solid),
    /// A nested placement of shared geometry in instance-local coordinates.
    Instance {
        placement: FrameTransform,
        children: Vec<GeometryObject>,
    },
}

/// How a placed element is anchored in the host document.
#[derive(Debug, Clone)]
pub enum Anchor {
    /// Hosted on a face of a linked element.
    Face {
        host: ElementRef,
        face: usize,
        location: Point3,
        axis: Vector3,
    },
    /// Free-standing at a building story.
    Story { level: String, location: Point3 },
}

/// Data associated with an element.
///
/// Elements are opaque to the engine apart from their category tag, type
/// label, named numeric parameters and geometry representation.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Category tag.
    pub category: Category,
    /// Human-readable type label authored in the producing model.
    pub type_label: String,
    /// Named numeric parameters.
    pub params: BTreeMap<String, f64>,
    /// Geometry representation.
    pub geometry: Vec<GeometryObject>,
    /// Anchor, present only on placed host-document elements.
    pub anchor: Option<Anchor>,
}

impl ElementData {
    /// Creates an element with no parameters or geometry.
    #[must_use]
    pub fn new(category: Category, type_label: impl Into<String>) -> Self {
        Self {
            category,
            type_label: type_label.into(),
            params: BTreeMap::new(),
            geometry: Vec::new(),
            anchor: None,
        }
    }

    /// Adds a named numeric parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Adds a directly-owned body.
    #[must_use]
    pub fn with_body(mut self, solid: Solid) -> Self {
        self.geometry.push(GeometryObject::Body(solid));
        self
    }

    /// Adds a nested instance of the given children.
    #[must_use]
    pub fn with_instance(mut self, placement: FrameTransform, children: Vec<GeometryObject>) -> Self {
        self.geometry.push(GeometryObject::Instance {
            placement,
            children,
        });
        self
    }

    /// Looks up a named numeric parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<f64> {
        self.params.get(name).copied()
    }

    /// Bounding outline of the whole geometry representation, folded across
    /// nested instances in the element's own frame.
    ///
    /// Returns `None` for elements without geometry.
    #[must_use]
    pub fn bounding_outline(&self) -> Option<Outline> {
        outline_of(&self.geometry)
    }
}

fn outline_of(objects: &[GeometryObject]) -> Option<Outline> {
    let mut acc: Option<Outline> = None;
    for obj in objects {
        let piece = match obj {
            GeometryObject::Body(solid) => Some(solid.outline()),
            GeometryObject::Instance {
                placement,
                children,
            } => outline_of(children).map(|o| placement.of_outline(&o)),
        };
        if let Some(piece) = piece {
            acc = Some(acc.map_or(piece, |a| a.union(&piece)));
        }
    }
    acc
}
