use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{DocumentError, Result};
use crate::math::FrameTransform;
use crate::model::{Document, LinkData, LinkId, Model, Transaction};

/// Supplies the content and host-frame placement of an external model file.
///
/// Loading the actual file format is a collaborator concern; the engine only
/// consumes the resulting element set and frame transform.
pub trait ModelProvider {
    /// Loads the model behind `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded.
    fn load(&self, path: &Path) -> std::result::Result<(Model, FrameTransform), DocumentError>;
}

/// A provider backed by preloaded models, keyed by path. Useful for tests and
/// embedders that manage model content themselves.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    models: HashMap<PathBuf, (Model, FrameTransform)>,
}

impl InMemoryProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model under a path.
    pub fn insert(&mut self, path: impl Into<PathBuf>, model: Model, transform: FrameTransform) {
        self.models.insert(path.into(), (model, transform));
    }
}

impl ModelProvider for InMemoryProvider {
    fn load(&self, path: &Path) -> std::result::Result<(Model, FrameTransform), DocumentError> {
        self.models
            .get(path)
            .cloned()
            .ok_or_else(|| DocumentError::ModelLoadFailed {
                path: path.to_path_buf(),
                reason: "no model registered for path".into(),
            })
    }
}

/// One external model attached during this session.
#[derive(Debug, Clone)]
pub struct LinkedModelRecord {
    /// The link created in the host document.
    pub link: LinkId,
    /// The external file the link points at.
    pub path: PathBuf,
    /// Role label the operator assigned.
    pub role: String,
}

/// Session-scoped attach/detach of external model references.
///
/// At most one record exists per distinct file path; records are removable
/// as a unit on cancel.
#[derive(Debug, Default)]
pub struct LinkManager {
    created: Vec<LinkedModelRecord>,
}

impl LinkManager {
    /// Creates a manager with no session records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records created during this session.
    #[must_use]
    pub fn records(&self) -> &[LinkedModelRecord] {
        &self.created
    }

    /// Attaches an external model, idempotently.
    ///
    /// When the document already holds a link for the same path (compared
    /// case-insensitively), whether created this session or pre-existing,
    /// the existing link is returned and nothing is mutated. Otherwise the
    /// model is loaded and linked inside its own mutation scope; a load
    /// failure commits nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot load the file.
    pub fn attach(
        &mut self,
        doc: &mut Document,
        path: &Path,
        role: &str,
        provider: &dyn ModelProvider,
    ) -> Result<LinkId> {
        if let Some(existing) = doc.find_link_by_path(path) {
            debug!(path = %path.display(), "model already linked, attach is a no-op");
            return Ok(existing);
        }

        let (model, transform) = provider.load(path)?;

        let mut tx = Transaction::start(doc, format!("Link {role} model"));
        let link = tx.doc().add_link(LinkData {
            path: path.to_path_buf(),
            role: role.into(),
            transform,
            model,
        });
        tx.commit();

        info!(path = %path.display(), role, "model linked");
        self.created.push(LinkedModelRecord {
            link,
            path: path.to_path_buf(),
            role: role.into(),
        });
        Ok(link)
    }

    /// Detaches every link created during this session, in one mutation
    /// scope. Links that already disappeared are skipped.
    ///
    /// Returns the number of links removed. Openings placed by a run are
    /// left in place; only links are retracted.
    pub fn detach_all(&mut self, doc: &mut Document) -> usize {
        if self.created.is_empty() {
            return 0;
        }

        let mut tx = Transaction::start(doc, "Remove session links");
        let mut removed = 0;
        for record in self.created.drain(..) {
            if tx.doc().remove_link(record.link) {
                removed += 1;
            }
        }
        tx.commit();

        info!(removed, "session links removed");
        removed
    }
}

/// Makes sure the given view is not hiding the external-links category.
///
/// Runs in its own mutation scope, and only when the category is currently
/// hidden. Unknown views are ignored.
pub fn ensure_link_visibility(doc: &mut Document, view_name: &str) {
    let needs_unhide = doc.view(view_name).is_some_and(|v| v.links_hidden);
    if !needs_unhide {
        return;
    }

    let mut tx = Transaction::start(doc, "Show links category");
    if let Some(view) = tx.doc().view_mut(view_name) {
        view.links_hidden = false;
    }
    tx.commit();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::View3d;

    fn provider_with(path: &str) -> InMemoryProvider {
        let mut provider = InMemoryProvider::new();
        provider.insert(path, Model::new(), FrameTransform::identity());
        provider
    }

    #[test]
    fn attach_twice_creates_one_link() {
        let mut doc = Document::new();
        let mut links = LinkManager::new();
        let provider = provider_with("/models/mep.rvt");

        let first = links
            .attach(&mut doc, Path::new("/models/mep.rvt"), "penetrating", &provider)
            .unwrap();
        let second = links
            .attach(&mut doc, Path::new("/models/mep.rvt"), "penetrating", &provider)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(links.records().len(), 1);
        assert_eq!(doc.links().count(), 1);
    }

    #[test]
    fn attach_matches_paths_case_insensitively() {
        let mut doc = Document::new();
        let mut links = LinkManager::new();
        let provider = provider_with("/models/mep.rvt");

        links
            .attach(&mut doc, Path::new("/models/mep.rvt"), "penetrating", &provider)
            .unwrap();
        links
            .attach(&mut doc, Path::new("/models/MEP.RVT"), "penetrating", &provider)
            .unwrap();

        assert_eq!(doc.links().count(), 1);
    }

    #[test]
    fn attach_reuses_pre_existing_document_link() {
        let mut doc = Document::new();
        let mut links = LinkManager::new();
        let provider = provider_with("/models/mep.rvt");

        // the document already carries a link for this path from an earlier session
        let pre_existing = doc.add_link(LinkData {
            path: PathBuf::from("/models/mep.rvt"),
            role: "penetrating".into(),
            transform: FrameTransform::identity(),
            model: Model::new(),
        });

        let attached = links
            .attach(&mut doc, Path::new("/models/mep.rvt"), "penetrating", &provider)
            .unwrap();

        assert_eq!(attached, pre_existing);
        // not created this session, so cancel must not touch it
        assert!(links.records().is_empty());
    }

    #[test]
    fn failed_load_commits_nothing() {
        let mut doc = Document::new();
        let mut links = LinkManager::new();
        let provider = InMemoryProvider::new();

        let result = links.attach(&mut doc, Path::new("/models/gone.rvt"), "host", &provider);

        assert!(result.is_err());
        assert_eq!(doc.links().count(), 0);
        assert!(links.records().is_empty());
    }

    #[test]
    fn detach_all_removes_created_links_once() {
        let mut doc = Document::new();
        let mut links = LinkManager::new();
        let mut provider = provider_with("/models/mep.rvt");
        provider.insert("/models/str.rvt", Model::new(), FrameTransform::identity());

        links
            .attach(&mut doc, Path::new("/models/mep.rvt"), "penetrating", &provider)
            .unwrap();
        links
            .attach(&mut doc, Path::new("/models/str.rvt"), "host", &provider)
            .unwrap();

        assert_eq!(links.detach_all(&mut doc), 2);
        assert_eq!(doc.links().count(), 0);
        // second cancel has nothing left to do
        assert_eq!(links.detach_all(&mut doc), 0);
    }

    #[test]
    fn link_visibility_is_restored_only_when_hidden() {
        let mut doc = Document::new();
        doc.add_view(View3d {
            name: "Clash check".into(),
            section_region: None,
            links_hidden: true,
        });

        ensure_link_visibility(&mut doc, "Clash check");
        assert!(!doc.view("Clash check").unwrap().links_hidden);

        // idempotent on a visible view, and silent on unknown views
        ensure_link_visibility(&mut doc, "Clash check");
        ensure_link_visibility(&mut doc, "Nonexistent");
    }
}
