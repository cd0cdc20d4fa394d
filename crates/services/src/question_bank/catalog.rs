use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use quiz_core::model::{CategoryInfo, QuestionDraft, QuestionSet};

use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../../data/questions.json");

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    default_category: String,
    #[serde(default)]
    categories: Vec<CategoryInfo>,
    questions: BTreeMap<String, Vec<QuestionDraft>>,
}

/// Validated question content plus the category menu shown to players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCatalog {
    categories: Vec<CategoryInfo>,
    set: QuestionSet,
}

impl QuestionCatalog {
    /// Catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded catalog is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or any parse and
    /// validation error from [`QuestionCatalog::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON catalog.
    ///
    /// Categories listed in the menu but missing from `questions` are kept;
    /// sessions for them draw from the default category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for malformed JSON, invalid questions, or an
    /// empty/missing default category.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;

        let mut templates = BTreeMap::new();
        for (category, drafts) in file.questions {
            let mut validated = Vec::with_capacity(drafts.len());
            for (index, draft) in drafts.into_iter().enumerate() {
                let template = draft.validate().map_err(|source| CatalogError::Question {
                    category: category.clone(),
                    index,
                    source,
                })?;
                validated.push(template);
            }
            debug!(category = %category, templates = validated.len(), "loaded category");
            templates.insert(category, validated);
        }

        let set = QuestionSet::new(file.default_category, templates)?;
        Ok(Self {
            categories: file.categories,
            set,
        })
    }

    #[must_use]
    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    #[must_use]
    pub fn question_set(&self) -> &QuestionSet {
        &self.set
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<CategoryInfo>, QuestionSet) {
        (self.categories, self.set)
    }
}
