use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clash::ClashScan;
use crate::error::{ConfigError, DocumentError, Result};
use crate::filter::{classify, KeywordRule, MatchStatus, RolePredicate, SpatialPrefilter};
use crate::link::{ensure_link_visibility, LinkManager, ModelProvider};
use crate::model::{Category, Document};
use crate::opening::{ensure_template, OpeningPlacer, PlacementFailure, TemplateConfig, TemplateSearchPath};

/// File extension of linkable model files.
pub const MODEL_FILE_EXTENSION: &str = "rvt";

/// Receives user-facing outcome reports. Presentation is a collaborator
/// concern; the engine only pushes messages through this interface.
pub trait MessageSink {
    /// Reports a normal outcome.
    fn info(&mut self, message: &str);
    /// Reports a failure.
    fn error(&mut self, message: &str);
}

/// A sink that collects messages, for tests and headless embedders.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    /// Normal outcome messages, in order.
    pub messages: Vec<String>,
    /// Failure messages, in order.
    pub errors: Vec<String>,
}

impl MessageSink for CollectingSink {
    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// Operator configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// The 3D view whose clip/section region bounds the search.
    pub view_name: String,
    /// Role rules for penetrating elements; an element matching any rule
    /// counts.
    pub penetrating: Vec<KeywordRule>,
    /// Role rule for host elements.
    pub host: KeywordRule,
    /// Opening template description.
    pub template: TemplateConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            view_name: "Clash check".into(),
            penetrating: vec![
                KeywordRule {
                    category: Category::Pipe,
                    keyword: "Sanitary".into(),
                },
                KeywordRule {
                    category: Category::Conduit,
                    keyword: "Conduit".into(),
                },
            ],
            host: KeywordRule {
                category: Category::Floor,
                keyword: "Floor".into(),
            },
            template: TemplateConfig::default(),
        }
    }
}

/// The two external model files selected by the operator.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    /// File holding the penetrating-domain model.
    pub penetrating: PathBuf,
    /// File holding the host-domain model.
    pub host: PathBuf,
}

/// Outcome counts of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Links attached during this session so far.
    pub models_linked: usize,
    /// Whether any penetrating element matched its rules.
    pub penetrating_status: MatchStatus,
    /// Whether any host element matched its rule.
    pub host_status: MatchStatus,
    /// Accepted clashes.
    pub clashes: usize,
    /// Face-hosted openings placed.
    pub placed: usize,
    /// Story-fallback openings placed.
    pub fallback: usize,
    /// Recorded per-clash placement failures.
    pub failures: Vec<PlacementFailure>,
}

impl RunSummary {
    /// Total number of openings created.
    #[must_use]
    pub fn openings(&self) -> usize {
        self.placed + self.fallback
    }
}

/// Lists candidate model files next to the saved host document, excluding
/// the host file itself. Comparison is case-insensitive.
///
/// # Errors
///
/// Returns a configuration error when the document was never saved, or an
/// I/O error when the directory cannot be read.
pub fn candidate_model_files(doc: &Document) -> Result<Vec<PathBuf>> {
    let current = doc.path().ok_or(ConfigError::DocumentNotSaved)?;
    let dir = current.parent().ok_or(ConfigError::DocumentNotSaved)?;

    let current_normalized = current.to_string_lossy().to_lowercase();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(DocumentError::Io)? {
        let entry = entry.map_err(DocumentError::Io)?;
        let path = entry.path();
        let is_model = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(MODEL_FILE_EXTENSION));
        if !is_model {
            continue;
        }
        if path.to_string_lossy().to_lowercase() == current_normalized {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Runs the full clash-to-opening pipeline.
///
/// Control flow: configuration checks (abort before any mutation) → idempotent
/// link attach → spatial prefilter + classification → exact clash scan →
/// opening placement in one atomic scope → reporting.
///
/// # Errors
///
/// Returns configuration errors for a missing view, inactive section region
/// or unresolvable template; document errors for unloadable model files; and
/// propagates any unexpected error out of the placement scope after it has
/// been rolled back.
pub fn run(
    doc: &mut Document,
    links: &mut LinkManager,
    selection: &ModelSelection,
    config: &RunConfig,
    search: &TemplateSearchPath,
    provider: &dyn ModelProvider,
    sink: &mut dyn MessageSink,
) -> Result<RunSummary> {
    // Configuration checks; nothing below mutates until these pass
    config.host.validate()?;
    for rule in &config.penetrating {
        rule.validate()?;
    }
    let view = doc
        .view(&config.view_name)
        .ok_or_else(|| ConfigError::ViewNotFound(config.view_name.clone()))?;
    let region = view
        .section_region
        .ok_or_else(|| ConfigError::SectionRegionInactive(config.view_name.clone()))?;
    ensure_template(doc, &config.template, search, &|path: &Path| path.exists())?;

    // Link lifecycle
    let penetrating_link = links.attach(doc, &selection.penetrating, "penetrating", provider)?;
    let host_link = links.attach(doc, &selection.host, "host", provider)?;
    ensure_link_visibility(doc, &config.view_name);
    sink.info(&format!("{} models linked", links.records().len()));

    // Prefilter + classify
    let prefilter = SpatialPrefilter::new(region);
    let penetrating_categories: Vec<Category> = {
        let mut categories: Vec<Category> =
            config.penetrating.iter().map(|r| r.category).collect();
        categories.dedup();
        categories
    };
    let penetrating_rules: Vec<&dyn RolePredicate> = config
        .penetrating
        .iter()
        .map(|r| r as &dyn RolePredicate)
        .collect();

    let penetrating_class = {
        let link = doc.link(penetrating_link)?;
        let candidates = prefilter.collect(link, &penetrating_categories);
        classify(&link.model, &candidates, &penetrating_rules)
    };
    let host_class = {
        let link = doc.link(host_link)?;
        let candidates = prefilter.collect(link, &[config.host.category]);
        classify(&link.model, &candidates, &[&config.host])
    };
    info!(
        penetrating = penetrating_class.elements.len(),
        host = host_class.elements.len(),
        "candidates classified"
    );

    let mut summary = RunSummary {
        models_linked: links.records().len(),
        penetrating_status: penetrating_class.status,
        host_status: host_class.status,
        clashes: 0,
        placed: 0,
        fallback: 0,
        failures: Vec::new(),
    };

    if penetrating_class.status == MatchStatus::NoMatches
        || host_class.status == MatchStatus::NoMatches
    {
        sink.info("no elements matched the configured roles");
        return Ok(summary);
    }

    // Exact clash scan
    let records = ClashScan::new(
        doc,
        penetrating_link,
        host_link,
        &penetrating_class.elements,
        &host_class.elements,
    )
    .execute()?;
    summary.clashes = records.len();
    sink.info(&format!("{} clashes found", records.len()));

    if records.is_empty() {
        return Ok(summary);
    }

    // Placement runs as one atomic scope for the whole batch
    let placement = OpeningPlacer::new(&config.template).place_all(doc, &records)?;
    for failure in &placement.failures {
        sink.error(&format!(
            "failed to place opening at ({:.3}, {:.3}, {:.3}): {}",
            failure.location.x, failure.location.y, failure.location.z, failure.reason
        ));
    }
    sink.info(&format!("{} openings placed", placement.openings()));

    summary.placed = placement.placed;
    summary.fallback = placement.fallback;
    summary.failures = placement.failures;
    Ok(summary)
}

/// Cancels the session: detaches every link attached during it.
///
/// Openings placed by [`run`] are left in place; only links are retracted.
pub fn cancel(doc: &mut Document, links: &mut LinkManager, sink: &mut dyn MessageSink) -> usize {
    let removed = links.detach_all(doc);
    sink.info(&format!("{removed} linked models removed"));
    removed
}
