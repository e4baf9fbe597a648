//! Learning domain types: educational content, progress and quizzes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::types::finite_number;

/// Difficulty level of a content item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(format!("Invalid difficulty: {}", s)),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Presentation kind of a content item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Article,
    Video,
    Quiz,
    Course,
}

/// An educational content item. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EducationalContent {
    #[validate(length(min = 1, message = "Content id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "Content title is required"))]
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub content_type: ContentType,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Optional filters for listing content; absent fields are not sent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ContentFilter {
    #[must_use]
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Progress of the current user through one learning module.
///
/// The backend keeps one record per (user, module).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LearningProgress {
    #[validate(length(min = 1, message = "Progress id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "Module id is required"))]
    pub module_id: String,
    #[validate(range(min = 0.0, max = 100.0, message = "Progress must be between 0 and 100"))]
    pub progress: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be between 0 and 100"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Seconds spent in the module
    #[serde(default, skip_serializing_if = "is_zero")]
    pub time_spent: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl LearningProgress {
    #[must_use]
    pub fn new(id: impl Into<String>, module_id: impl Into<String>, progress: f64) -> Self {
        Self {
            id: id.into(),
            module_id: module_id.into(),
            progress,
            score: None,
            time_spent: 0,
            completed_at: None,
            updated_at: None,
        }
    }

    /// Placeholder for a module the user has not started yet
    #[must_use]
    pub fn not_started(module_id: impl Into<String>) -> Self {
        Self::new(String::new(), module_id, 0.0)
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        !self.id.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0 || self.completed_at.is_some()
    }
}

/// Body of a progress update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[validate(
        custom(function = "finite_number"),
        range(min = 0.0, max = 100.0, message = "Progress must be between 0 and 100")
    )]
    pub progress: f64,
    pub time_spent: u64,
}

/// Body of a module completion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct CompletionRequest {
    #[validate(
        custom(function = "finite_number"),
        range(min = 0.0, max = 100.0, message = "Score must be between 0 and 100")
    )]
    pub score: f64,
}

/// One answer in a quiz submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: String,
    pub answer: String,
}

impl QuizAnswer {
    #[must_use]
    pub fn new(question_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct QuizSubmission {
    #[validate(length(min = 1, message = "At least one answer is required"))]
    pub answers: Vec<QuizAnswer>,
}

/// Graded quiz outcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    #[validate(length(min = 1, message = "Quiz id is required"))]
    pub quiz_id: String,
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be between 0 and 100"))]
    pub score: f64,
    pub passed: bool,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub total_questions: u32,
}

/// Favorite flag for a content item after a toggle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStatus {
    pub content_id: String,
    pub is_favorite: bool,
}

/// Envelope payload for progress-returning mutations
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgressPayload {
    pub progress: Option<LearningProgress>,
}

/// Envelope payload for quiz submission
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QuizPayload {
    pub result: Option<QuizResult>,
}

/// Envelope payload for favorite toggles; `false` on failure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePayload {
    pub is_favorite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_difficulty_display_and_parsing() {
        for (level, text) in [
            (Difficulty::Beginner, "beginner"),
            (Difficulty::Intermediate, "intermediate"),
            (Difficulty::Advanced, "advanced"),
        ] {
            assert_eq!(level.to_string(), text);
            assert_eq!(Difficulty::from_str(text).unwrap(), level);
        }
        assert!(Difficulty::from_str("expert").is_err());
    }

    #[test]
    fn test_progress_decodes_minimal_body() {
        let progress: LearningProgress =
            serde_json::from_value(json!({ "id": "p1", "moduleId": "mod-1", "progress": 100 }))
                .unwrap();
        assert_eq!(progress, LearningProgress::new("p1", "mod-1", 100.0));
        assert!(progress.is_complete());
        assert!(progress.validate().is_ok());
    }

    #[test]
    fn test_progress_out_of_range_fails_validation() {
        let progress = LearningProgress::new("p1", "mod-1", 140.0);
        assert!(progress.validate().is_err());
    }

    #[test]
    fn test_not_started_placeholder() {
        let progress = LearningProgress::not_started("mod-9");
        assert!(!progress.is_started());
        assert!(!progress.is_complete());
        assert_eq!(progress.module_id, "mod-9");
    }

    #[test]
    fn test_filter_skips_absent_fields() {
        let filter = ContentFilter::category("savings");
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value, json!({ "category": "savings" }));
    }

    #[test]
    fn test_filter_limit_validation() {
        assert!(ContentFilter::default().with_limit(20).validate().is_ok());
        assert!(ContentFilter::default().with_limit(0).validate().is_err());
        assert!(ContentFilter::default().with_limit(101).validate().is_err());
    }

    #[test]
    fn test_quiz_submission_requires_answers() {
        let empty = QuizSubmission { answers: vec![] };
        assert!(empty.validate().is_err());

        let one = QuizSubmission {
            answers: vec![QuizAnswer::new("q1", "b")],
        };
        assert!(one.validate().is_ok());
    }
}
