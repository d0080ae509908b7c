use tracing::{debug, warn};

use super::document::{Document, Snapshot};

/// An atomic mutation scope over the host document.
///
/// Captures the document state on start. Calling [`commit`](Self::commit)
/// keeps the edits; dropping the transaction without committing restores the
/// captured state, including when the stack unwinds through an error path.
/// Partial mutations are never left visible.
pub struct Transaction<'a> {
    doc: &'a mut Document,
    snapshot: Option<Snapshot>,
    label: String,
    committed: bool,
}

impl<'a> Transaction<'a> {
    /// Starts a transaction on the document.
    pub fn start(doc: &'a mut Document, label: impl Into<String>) -> Self {
        let label = label.into();
        debug!(transaction = %label, "transaction started");
        let snapshot = Some(doc.snapshot());
        Self {
            doc,
            snapshot,
            label,
            committed: false,
        }
    }

    /// The document under mutation.
    pub fn doc(&mut self) -> &mut Document {
        self.doc
    }

    /// Read-only view of the document under mutation.
    #[must_use]
    pub fn doc_ref(&self) -> &Document {
        self.doc
    }

    /// Commits the transaction, keeping all edits.
    pub fn commit(mut self) {
        self.committed = true;
        self.snapshot = None;
        debug!(transaction = %self.label, "transaction committed");
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Some(snapshot) = self.snapshot.take() {
            self.doc.restore(snapshot);
            warn!(transaction = %self.label, "transaction rolled back");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Category, ElementData};

    #[test]
    fn commit_keeps_edits() {
        let mut doc = Document::new();
        let id = {
            let mut tx = Transaction::start(&mut doc, "add element");
            let id = tx.doc().add_element(ElementData::new(Category::Opening, "Opening"));
            tx.commit();
            id
        };
        assert!(doc.element(id).is_ok());
    }

    #[test]
    fn drop_without_commit_rolls_back() {
        let mut doc = Document::new();
        let id = {
            let mut tx = Transaction::start(&mut doc, "add element");
            tx.doc().add_element(ElementData::new(Category::Opening, "Opening"))
            // dropped uncommitted
        };
        assert!(doc.element(id).is_err());
    }

    #[test]
    fn rollback_restores_prior_state_exactly() {
        let mut doc = Document::new();
        let kept = doc.add_element(ElementData::new(Category::Opening, "Kept"));
        doc.add_level("Story 1", 0.0);

        {
            let mut tx = Transaction::start(&mut doc, "mutate everything");
            tx.doc().add_element(ElementData::new(Category::Opening, "Discarded"));
            tx.doc().add_level("Story 2", 3.0);
        }

        assert!(doc.element(kept).is_ok());
        assert_eq!(doc.elements_of_category(Category::Opening).len(), 1);
        assert_eq!(doc.nearest_level(100.0).unwrap().name, "Story 1");
    }

    #[test]
    fn rollback_happens_on_error_paths_too() {
        fn failing_edit(doc: &mut Document) -> crate::error::Result<()> {
            let mut tx = Transaction::start(doc, "failing edit");
            tx.doc().add_element(ElementData::new(Category::Opening, "Orphan"));
            // the error path drops the transaction before commit
            Err(crate::error::PlacementError::Instantiation("boom".into()).into())
        }

        let mut doc = Document::new();
        assert!(failing_edit(&mut doc).is_err());
        assert!(doc.elements_of_category(Category::Opening).is_empty());
    }
}
