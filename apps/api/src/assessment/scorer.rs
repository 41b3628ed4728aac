//! Answer Scorer - scores one submitted answer against its stored question.
//!
//! Multiple-choice answers are exact-match against the canonical answer,
//! case-sensitive, no partial credit. Open-form answers go through the
//! rubric generation call; a generation failure fails the scoring call
//! instead of silently defaulting.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::assessment::capability::ContentGenerator;
use crate::assessment::store;
use crate::errors::AppError;
use crate::models::assessment::{QuestionCategory, QuestionRow};

/// Scores a submitted answer against its question. Returns a value in
/// [0, 100].
pub async fn score_answer(
    generator: &dyn ContentGenerator,
    question: &QuestionRow,
    submitted: &str,
) -> Result<f64, AppError> {
    let category = QuestionCategory::parse(&question.category).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "question {} has unknown category '{}'",
            question.id,
            question.category
        ))
    })?;

    match category {
        QuestionCategory::MultipleChoice => Ok(score_multiple_choice(
            question.correct_answer.as_deref(),
            submitted,
        )),
        QuestionCategory::OpenCoding | QuestionCategory::OpenText => {
            let score = generator
                .score_open_answer(&question.question, submitted)
                .await?;
            Ok(score.clamp(0.0, 100.0))
        }
    }
}

/// Full scoring flow: look the question up, score, persist answer + score
/// in place. Fails with NotFound when the question id is unknown.
pub async fn score_submission(
    pool: &PgPool,
    generator: &dyn ContentGenerator,
    candidate_id: Uuid,
    question_id: Uuid,
    submitted: &str,
) -> Result<f64, AppError> {
    let question = store::fetch_question(pool, candidate_id, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {question_id} not found")))?;

    let score = score_answer(generator, &question, submitted).await?;

    let matched =
        store::update_question_score(pool, candidate_id, question_id, submitted, score).await?;
    if matched == 0 {
        return Err(AppError::NotFound(format!(
            "Question {question_id} not found"
        )));
    }

    info!("Scored question {question_id} for candidate {candidate_id}: {score}");
    Ok(score)
}

fn score_multiple_choice(correct_answer: Option<&str>, submitted: &str) -> f64 {
    if correct_answer == Some(submitted) {
        100.0
    } else {
        0.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::capability::{
        CommunicationAnalysis, OpenQa, QuizItem, RecordedAnswer, ResumeAnalysis,
    };
    use crate::llm_client::GenError;
    use async_trait::async_trait;
    use chrono::Utc;

    struct RubricMock {
        score: Result<f64, ()>,
    }

    #[async_trait]
    impl ContentGenerator for RubricMock {
        async fn analyze_resume(&self, _: &str, _: &str) -> Result<ResumeAnalysis, GenError> {
            unimplemented!()
        }
        async fn analyze_communication(
            &self,
            _: &[RecordedAnswer],
        ) -> Result<CommunicationAnalysis, GenError> {
            unimplemented!()
        }
        async fn generate_quiz(&self, _: &str, _: &str) -> Result<Vec<QuizItem>, GenError> {
            unimplemented!()
        }
        async fn generate_coding_questions(&self, _: &str, _: &str) -> Result<Vec<OpenQa>, GenError> {
            unimplemented!()
        }
        async fn generate_text_questions(&self, _: &str, _: &str) -> Result<Vec<OpenQa>, GenError> {
            unimplemented!()
        }
        async fn score_open_answer(&self, _: &str, _: &str) -> Result<f64, GenError> {
            self.score
                .map_err(|_| GenError::Unavailable("rubric down".to_string()))
        }
    }

    fn make_question(category: QuestionCategory, correct: Option<&str>) -> QuestionRow {
        QuestionRow {
            id: Uuid::new_v4(),
            seq: 1,
            candidate_id: Uuid::new_v4(),
            category: category.as_str().to_string(),
            question: "What does ownership guarantee?".to_string(),
            options: Vec::new(),
            correct_answer: correct.map(str::to_string),
            submitted_answer: None,
            score: None,
            created_at: Utc::now(),
        }
    }

    // Never called for multiple-choice; panics if the scorer delegates.
    fn unreachable_generator() -> RubricMock {
        RubricMock { score: Err(()) }
    }

    #[tokio::test]
    async fn test_mcq_exact_match_scores_100() {
        let question = make_question(QuestionCategory::MultipleChoice, Some("B"));
        let score = score_answer(&unreachable_generator(), &question, "B")
            .await
            .unwrap();
        assert_eq!(score, 100.0);
    }

    #[tokio::test]
    async fn test_mcq_is_case_sensitive() {
        let question = make_question(QuestionCategory::MultipleChoice, Some("B"));
        let score = score_answer(&unreachable_generator(), &question, "b")
            .await
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn test_mcq_wrong_option_scores_0() {
        let question = make_question(QuestionCategory::MultipleChoice, Some("B"));
        let score = score_answer(&unreachable_generator(), &question, "C")
            .await
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn test_mcq_without_canonical_answer_scores_0() {
        let question = make_question(QuestionCategory::MultipleChoice, None);
        let score = score_answer(&unreachable_generator(), &question, "B")
            .await
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn test_open_answer_delegates_to_rubric() {
        let generator = RubricMock { score: Ok(85.3) };
        let question = make_question(QuestionCategory::OpenCoding, Some("use an index"));
        let score = score_answer(&generator, &question, "I would add an index")
            .await
            .unwrap();
        assert_eq!(score, 85.3);
    }

    #[tokio::test]
    async fn test_open_answer_rubric_failure_fails_scoring() {
        let generator = RubricMock { score: Err(()) };
        let question = make_question(QuestionCategory::OpenText, Some("x"));
        let result = score_answer(&generator, &question, "anything").await;
        assert!(matches!(result, Err(AppError::Generation(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_rubric_score_is_clamped() {
        let generator = RubricMock { score: Ok(140.0) };
        let question = make_question(QuestionCategory::OpenText, Some("x"));
        let score = score_answer(&generator, &question, "anything").await.unwrap();
        assert_eq!(score, 100.0);
    }

    #[tokio::test]
    async fn test_unknown_category_is_internal_error() {
        let mut question = make_question(QuestionCategory::OpenText, Some("x"));
        question.category = "essay".to_string();
        let result = score_answer(&unreachable_generator(), &question, "anything").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
