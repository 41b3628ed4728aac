use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Identity and contact facts for one applicant, written once at submission.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub candidate_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hr_name: Option<String>,
    pub job_position: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The evolving analysis document for one candidate, keyed 1:1 by
/// candidate id. Fields arrive from different pipeline stages at different
/// times and are merged in, never replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssessmentRow {
    pub candidate_id: Uuid,
    pub resume_text: Option<String>,
    pub job_description: Option<String>,
    pub resume_analysis: Option<Value>,
    pub communication: Option<Value>,
    pub technical: Option<Value>,
    pub overall_score: Option<f64>,
    pub fit: Option<String>,
    pub questions_generated: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One generated question plus its eventual answer and score.
/// `submitted_answer` and `score` stay null until the scorer fills them in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    /// Append order within the candidate's collection.
    pub seq: i64,
    pub candidate_id: Uuid,
    pub category: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
    pub submitted_answer: Option<String>,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Question category. The tag is set by the generation call that produced
/// the item, never inferred from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    MultipleChoice,
    OpenCoding,
    OpenText,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::MultipleChoice => "multiple_choice",
            QuestionCategory::OpenCoding => "open_coding",
            QuestionCategory::OpenText => "open_text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "multiple_choice" => Some(QuestionCategory::MultipleChoice),
            "open_coding" => Some(QuestionCategory::OpenCoding),
            "open_text" => Some(QuestionCategory::OpenText),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in [
            QuestionCategory::MultipleChoice,
            QuestionCategory::OpenCoding,
            QuestionCategory::OpenText,
        ] {
            assert_eq!(QuestionCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_category_parse_rejects_unknown_tag() {
        assert_eq!(QuestionCategory::parse("essay"), None);
    }

    #[test]
    fn test_category_serde_uses_snake_case() {
        let json = serde_json::to_string(&QuestionCategory::MultipleChoice).unwrap();
        assert_eq!(json, r#""multiple_choice""#);
    }
}
