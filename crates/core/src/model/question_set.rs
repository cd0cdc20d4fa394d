use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::question::QuestionTemplate;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("default category `{0}` has no question templates")]
    MissingDefault(String),

    #[error("category `{0}` has no question templates")]
    EmptyCategory(String),
}

/// Display metadata for a category offered to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Immutable per-category template collections.
///
/// Every category holds at least one template and the default category is
/// always present, so a resolved lookup never yields an empty slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    default_category: String,
    categories: BTreeMap<String, Vec<QuestionTemplate>>,
}

impl QuestionSet {
    /// Build a set from validated templates.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError::MissingDefault` if the default category is
    /// absent or empty, and `QuestionSetError::EmptyCategory` for any other
    /// category without templates.
    pub fn new(
        default_category: impl Into<String>,
        categories: BTreeMap<String, Vec<QuestionTemplate>>,
    ) -> Result<Self, QuestionSetError> {
        let default_category = default_category.into();
        if categories
            .get(&default_category)
            .is_none_or(|templates| templates.is_empty())
        {
            return Err(QuestionSetError::MissingDefault(default_category));
        }
        if let Some((key, _)) = categories.iter().find(|(_, templates)| templates.is_empty()) {
            return Err(QuestionSetError::EmptyCategory(key.clone()));
        }

        Ok(Self {
            default_category,
            categories,
        })
    }

    #[must_use]
    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Category keys that carry their own templates.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Returns the key actually served for `category`, remapping unknown keys
    /// to the default category.
    #[must_use]
    pub fn resolve_key<'a>(&'a self, category: &'a str) -> &'a str {
        if self.contains(category) {
            category
        } else {
            &self.default_category
        }
    }

    /// Templates for `category`, or the default category's templates when the
    /// key is unknown.
    #[must_use]
    pub fn resolve(&self, category: &str) -> &[QuestionTemplate] {
        self.categories
            .get(self.resolve_key(category))
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionDraft;

    fn template(prompt: &str) -> QuestionTemplate {
        QuestionDraft {
            prompt: prompt.into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: "a".into(),
            explanation: None,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn unknown_category_resolves_to_default() {
        let mut map = BTreeMap::new();
        map.insert("science".to_string(), vec![template("s1"), template("s2")]);
        map.insert("math".to_string(), vec![template("m1")]);
        let set = QuestionSet::new("science", map).unwrap();

        assert_eq!(set.resolve_key("history"), "science");
        assert_eq!(set.resolve("history").len(), 2);
        assert_eq!(set.resolve("math")[0].prompt(), "m1");
        assert_eq!(set.categories().collect::<Vec<_>>(), vec!["math", "science"]);
    }

    #[test]
    fn rejects_missing_default() {
        let mut map = BTreeMap::new();
        map.insert("math".to_string(), vec![template("m1")]);
        let err = QuestionSet::new("science", map).unwrap_err();
        assert_eq!(err, QuestionSetError::MissingDefault("science".into()));
    }

    #[test]
    fn rejects_empty_category() {
        let mut map = BTreeMap::new();
        map.insert("science".to_string(), vec![template("s1")]);
        map.insert("music".to_string(), Vec::new());
        let err = QuestionSet::new("science", map).unwrap_err();
        assert_eq!(err, QuestionSetError::EmptyCategory("music".into()));
    }
}
