pub mod prefilter;

pub use prefilter::SpatialPrefilter;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Category, ElementData, ElementId, Model};

/// A pluggable element-matching strategy for one role (penetrating or host).
pub trait RolePredicate {
    /// Tests whether the element plays the predicate's role.
    fn matches(&self, element: &ElementData) -> bool;
}

/// Keyword-based role rule: category must match, and the keyword must occur
/// in the element's type label or in the category's display name.
///
/// The loose label match is deliberate: authored type names vary across
/// projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Expected category tag.
    pub category: Category,
    /// Case-sensitive keyword to look for.
    pub keyword: String,
}

impl KeywordRule {
    /// Creates a validated rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyword is empty.
    pub fn new(category: Category, keyword: impl Into<String>) -> Result<Self, ConfigError> {
        let rule = Self {
            category,
            keyword: keyword.into(),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Validates the rule, for instances built by deserialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyword is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keyword.trim().is_empty() {
            return Err(ConfigError::EmptyKeyword);
        }
        Ok(())
    }
}

impl RolePredicate for KeywordRule {
    fn matches(&self, element: &ElementData) -> bool {
        element.category == self.category
            && (element.type_label.contains(&self.keyword)
                || element.category.display_name().contains(&self.keyword))
    }
}

/// Whether a classification produced any elements.
///
/// An empty matched set is a normal outcome, distinguishable from a filter
/// configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Matched,
    NoMatches,
}

/// Result of classifying one model's candidates for one role.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Elements that matched at least one predicate.
    pub elements: Vec<ElementId>,
    /// Whether anything matched.
    pub status: MatchStatus,
}

/// Classifies candidate elements of a model against a set of role predicates.
///
/// An element matches when any predicate accepts it.
#[must_use]
pub fn classify(
    model: &Model,
    candidates: &[ElementId],
    predicates: &[&dyn RolePredicate],
) -> Classification {
    let elements: Vec<ElementId> = candidates
        .iter()
        .copied()
        .filter(|&id| {
            model
                .element(id)
                .map(|data| predicates.iter().any(|p| p.matches(data)))
                .unwrap_or(false)
        })
        .collect();

    let status = if elements.is_empty() {
        MatchStatus::NoMatches
    } else {
        MatchStatus::Matched
    };

    Classification { elements, status }
}
