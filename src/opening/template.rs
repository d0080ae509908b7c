use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ConfigError, Result};
use crate::model::{Document, Template, Transaction};

/// Describes the opening template and the parameter names placement sets on
/// each instance. Parameter names are configuration, not protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Template (family) name, also the stem of the template file.
    pub name: String,
    /// Type label within the template.
    pub type_label: String,
    /// Parameter receiving the opening width.
    pub width_param: String,
    /// Parameter receiving the opening length.
    pub length_param: String,
    /// Parameter receiving the opening height.
    pub height_param: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            name: "SLAB-OPENING-SQUARE".into(),
            type_label: "Slab opening".into(),
            width_param: "opening_width".into(),
            length_param: "opening_length".into(),
            height_param: "opening_depth".into(),
        }
    }
}

/// Directories searched for template files, in priority order ahead of the
/// current document's directory.
#[derive(Debug, Clone)]
pub struct TemplateSearchPath {
    /// Vendor-standard template library.
    pub vendor_dir: PathBuf,
    /// The user's documents template folder.
    pub documents_dir: PathBuf,
}

/// File name of the template on disk.
#[must_use]
pub fn template_file_name(config: &TemplateConfig) -> String {
    format!("{}.rfa", config.name)
}

/// Locates the template file: vendor library, then user documents, then the
/// directory containing the current document. First existing path wins.
///
/// `exists` abstracts the file probe so callers can resolve against fake
/// file systems.
pub fn locate_template(
    config: &TemplateConfig,
    search: &TemplateSearchPath,
    doc_dir: Option<&Path>,
    exists: &dyn Fn(&Path) -> bool,
) -> Option<PathBuf> {
    let file_name = template_file_name(config);
    let mut candidates = vec![
        search.vendor_dir.join(&file_name),
        search.documents_dir.join(&file_name),
    ];
    if let Some(dir) = doc_dir {
        candidates.push(dir.join(&file_name));
    }
    candidates.into_iter().find(|path| exists(path))
}

/// Makes sure the configured template is loaded in the document.
///
/// A template already loaded is a no-op. Otherwise the file is located on the
/// search path and registered inside its own mutation scope.
///
/// # Errors
///
/// Returns a configuration error when the template exists nowhere on the
/// search path; the document is left untouched in that case.
pub fn ensure_template(
    doc: &mut Document,
    config: &TemplateConfig,
    search: &TemplateSearchPath,
    exists: &dyn Fn(&Path) -> bool,
) -> Result<()> {
    if doc.find_template(&config.name, &config.type_label).is_some() {
        return Ok(());
    }

    let doc_dir = doc.path().and_then(Path::parent).map(Path::to_path_buf);
    let located = locate_template(config, search, doc_dir.as_deref(), exists).ok_or_else(|| {
        ConfigError::TemplateNotFound {
            name: config.name.clone(),
            type_label: config.type_label.clone(),
        }
    })?;
    info!(path = %located.display(), "loading opening template");

    let mut tx = Transaction::start(doc, "Load opening template");
    tx.doc().add_template(Template {
        name: config.name.clone(),
        type_label: config.type_label.clone(),
    });
    tx.commit();
    Ok(())
}
