use std::path::{Path, PathBuf};

use slotmap::SlotMap;

use crate::error::DocumentError;
use crate::math::{FrameTransform, Outline, Vector3, OUTLINE_EPSILON};

use super::element::{Category, ElementData, ElementId, LinkId};

/// A building story.
#[derive(Debug, Clone)]
pub struct Level {
    /// Story name.
    pub name: String,
    /// Story elevation in document units.
    pub elevation: f64,
}

/// An interactive 3D view of the host document.
#[derive(Debug, Clone)]
pub struct View3d {
    /// View name.
    pub name: String,
    /// Active clip/section region in the host frame, if any.
    pub section_region: Option<Outline>,
    /// Whether the external-links category is hidden in this view.
    pub links_hidden: bool,
}

/// A loaded opening template: a named reusable definition that placement
/// instantiates and parameterizes. The template file format itself is a
/// collaborator concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Template (family) name.
    pub name: String,
    /// Type label within the template.
    pub type_label: String,
}

/// An externally-authored element set, read-only to the engine.
#[derive(Debug, Clone, Default)]
pub struct Model {
    elements: SlotMap<ElementId, ElementData>,
    /// Offset of the model's project base point from its internal origin.
    pub base_point_offset: Vector3,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an element and returns its ID.
    pub fn add_element(&mut self, data: ElementData) -> ElementId {
        self.elements.insert(data)
    }

    /// Returns a reference to the element data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn element(&self, id: ElementId) -> Result<&ElementData, DocumentError> {
        self.elements
            .get(id)
            .ok_or(DocumentError::EntityNotFound("element"))
    }

    /// Iterates over all elements.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &ElementData)> {
        self.elements.iter()
    }

    /// Collects elements of the given categories, optionally pruned by a
    /// bounding region in this model's local frame.
    ///
    /// Elements without geometry cannot be located and are dropped whenever
    /// a region is given.
    #[must_use]
    pub fn collect(&self, categories: &[Category], region: Option<&Outline>) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, data)| categories.contains(&data.category))
            .filter(|(_, data)| match region {
                None => true,
                Some(region) => data
                    .bounding_outline()
                    .is_some_and(|outline| outline.intersects(region, OUTLINE_EPSILON)),
            })
            .map(|(id, _)| id)
            .collect()
    }
}

/// An attached external model reference.
#[derive(Debug, Clone)]
pub struct LinkData {
    /// Path of the external file this link points at.
    pub path: PathBuf,
    /// Role label the operator assigned ("penetrating", "host", ...).
    pub role: String,
    /// Frame transform mapping the model's frame into the host frame.
    pub transform: FrameTransform,
    /// The linked model's element set.
    pub model: Model,
}

/// The host document being edited.
///
/// Owns the element, link, level, view and template state. All mutation
/// happens through [`Transaction`](super::Transaction) scopes; reads are
/// direct.
#[derive(Debug, Clone, Default)]
pub struct Document {
    path: Option<PathBuf>,
    elements: SlotMap<ElementId, ElementData>,
    links: SlotMap<LinkId, LinkData>,
    levels: Vec<Level>,
    views: Vec<View3d>,
    templates: Vec<Template>,
}

/// Full interior state of a document, captured by a transaction.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    elements: SlotMap<ElementId, ElementData>,
    links: SlotMap<LinkId, LinkData>,
    levels: Vec<Level>,
    views: Vec<View3d>,
    templates: Vec<Template>,
}

impl Document {
    /// Creates a new, empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the saved file path.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Returns the saved file path, if the document has been saved.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // --- Element operations ---

    /// Inserts an element and returns its ID.
    pub fn add_element(&mut self, data: ElementData) -> ElementId {
        self.elements.insert(data)
    }

    /// Returns a reference to the element data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn element(&self, id: ElementId) -> Result<&ElementData, DocumentError> {
        self.elements
            .get(id)
            .ok_or(DocumentError::EntityNotFound("element"))
    }

    /// Sets a named numeric parameter on an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn set_param(
        &mut self,
        id: ElementId,
        name: impl Into<String>,
        value: f64,
    ) -> Result<(), DocumentError> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or(DocumentError::EntityNotFound("element"))?;
        element.params.insert(name.into(), value);
        Ok(())
    }

    /// Collects the IDs of all elements with the given category.
    #[must_use]
    pub fn elements_of_category(&self, category: Category) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, data)| data.category == category)
            .map(|(id, _)| id)
            .collect()
    }

    // --- Link operations ---

    /// Inserts a link and returns its ID.
    pub fn add_link(&mut self, data: LinkData) -> LinkId {
        self.links.insert(data)
    }

    /// Returns a reference to the link data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the document.
    pub fn link(&self, id: LinkId) -> Result<&LinkData, DocumentError> {
        self.links
            .get(id)
            .ok_or(DocumentError::EntityNotFound("link"))
    }

    /// Iterates over all links.
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &LinkData)> {
        self.links.iter()
    }

    /// Removes a link if it is still present.
    ///
    /// Returns whether a link was removed.
    pub fn remove_link(&mut self, id: LinkId) -> bool {
        self.links.remove(id).is_some()
    }

    /// Finds a link by file path, compared case-insensitively.
    #[must_use]
    pub fn find_link_by_path(&self, path: &Path) -> Option<LinkId> {
        let wanted = normalized_path(path);
        self.links
            .iter()
            .find(|(_, data)| normalized_path(&data.path) == wanted)
            .map(|(id, _)| id)
    }

    // --- Level operations ---

    /// Adds a building story.
    pub fn add_level(&mut self, name: impl Into<String>, elevation: f64) {
        self.levels.push(Level {
            name: name.into(),
            elevation,
        });
    }

    /// Returns the story whose elevation is nearest to `elevation`.
    #[must_use]
    pub fn nearest_level(&self, elevation: f64) -> Option<&Level> {
        self.levels.iter().min_by(|a, b| {
            let da = (a.elevation - elevation).abs();
            let db = (b.elevation - elevation).abs();
            da.total_cmp(&db)
        })
    }

    // --- View operations ---

    /// Adds a 3D view.
    pub fn add_view(&mut self, view: View3d) {
        self.views.push(view);
    }

    /// Finds a view by name.
    #[must_use]
    pub fn view(&self, name: &str) -> Option<&View3d> {
        self.views.iter().find(|v| v.name == name)
    }

    /// Finds a view by name, mutably.
    pub fn view_mut(&mut self, name: &str) -> Option<&mut View3d> {
        self.views.iter_mut().find(|v| v.name == name)
    }

    // --- Template operations ---

    /// Registers a template as loaded.
    pub fn add_template(&mut self, template: Template) {
        self.templates.push(template);
    }

    /// Finds a loaded template by name and type label.
    #[must_use]
    pub fn find_template(&self, name: &str, type_label: &str) -> Option<&Template> {
        self.templates
            .iter()
            .find(|t| t.name == name && t.type_label == type_label)
    }

    // --- Transaction support ---

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            elements: self.elements.clone(),
            links: self.links.clone(),
            levels: self.levels.clone(),
            views: self.views.clone(),
            templates: self.templates.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.elements = snapshot.elements;
        self.links = snapshot.links;
        self.levels = snapshot.levels;
        self.views = snapshot.views;
        self.templates = snapshot.templates;
    }
}

fn normalized_path(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}
