use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Every question offers exactly this many choices.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("expected {OPTION_COUNT} options, found {found}")]
    WrongOptionCount { found: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("option `{option}` appears more than once")]
    DuplicateOption { option: String },

    #[error("correct answer `{answer}` is not one of the options")]
    AnswerNotInOptions { answer: String },
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Authored question as it appears in a catalog, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(alias = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft into a reusable template.
    ///
    /// Prompt and options are trimmed; a blank explanation is dropped.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, the option list is not
    /// exactly [`OPTION_COUNT`] unique non-blank entries, or the correct answer
    /// is not among the options.
    pub fn validate(self) -> Result<QuestionTemplate, QuestionError> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        if self.options.len() != OPTION_COUNT {
            return Err(QuestionError::WrongOptionCount {
                found: self.options.len(),
            });
        }

        let mut options: Vec<String> = Vec::with_capacity(OPTION_COUNT);
        for (index, raw) in self.options.into_iter().enumerate() {
            let option = raw.trim().to_string();
            if option.is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            if options.contains(&option) {
                return Err(QuestionError::DuplicateOption { option });
            }
            options.push(option);
        }

        let correct_answer = self.correct_answer.trim().to_string();
        if !options.contains(&correct_answer) {
            return Err(QuestionError::AnswerNotInOptions {
                answer: correct_answer,
            });
        }

        let explanation = self
            .explanation
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(QuestionTemplate {
            prompt,
            options,
            correct_answer,
            explanation,
        })
    }
}

/// Validated question content without a session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTemplate {
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: Option<String>,
}

impl QuestionTemplate {
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Bind the template to a session-scoped id.
    #[must_use]
    pub fn assign_id(&self, id: QuestionId) -> Question {
        Question {
            id,
            template: self.clone(),
        }
    }
}

/// A question drawn into a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    template: QuestionTemplate,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        self.template.prompt()
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        self.template.options()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        self.template.correct_answer()
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.template.explanation()
    }

    /// Exact string comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.template.correct_answer == answer
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            prompt: "What is the chemical symbol for gold?".into(),
            options: vec!["Au".into(), "Ag".into(), "Fe".into(), "Cu".into()],
            correct_answer: "Au".into(),
            explanation: Some("From the Latin 'aurum'.".into()),
        }
    }

    #[test]
    fn valid_draft_becomes_question() {
        let template = draft().validate().unwrap();
        let question = template.assign_id(QuestionId::new(3));

        assert_eq!(question.id(), QuestionId::new(3));
        assert_eq!(question.options().len(), OPTION_COUNT);
        assert!(question.is_correct("Au"));
        assert!(!question.is_correct("au"));
        assert_eq!(question.explanation(), Some("From the Latin 'aurum'."));
    }

    #[test]
    fn rejects_blank_prompt() {
        let mut d = draft();
        d.prompt = "  ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyPrompt);
    }

    #[test]
    fn rejects_wrong_option_count() {
        let mut d = draft();
        d.options.pop();
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::WrongOptionCount { found: 3 }
        );
    }

    #[test]
    fn rejects_duplicate_and_empty_options() {
        let mut d = draft();
        d.options[2] = "Au".into();
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionError::DuplicateOption { .. }
        ));

        let mut d = draft();
        d.options[1] = " ".into();
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::EmptyOption { index: 1 }
        );
    }

    #[test]
    fn rejects_answer_outside_options() {
        let mut d = draft();
        d.correct_answer = "Pb".into();
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionError::AnswerNotInOptions { .. }
        ));
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let mut d = draft();
        d.explanation = Some("   ".into());
        assert_eq!(d.validate().unwrap().explanation(), None);
    }
}
