//! Question Synthesizer - fans out to the three generation calls
//! concurrently and normalizes whatever subset succeeded into one ordered
//! batch of uniquely-identified question items.
//!
//! Best-effort semantics: a failed call drops its category with a warn log;
//! only a fully empty union is reported as an error, and even that never
//! aborts the surrounding background job loop.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::capability::{ContentGenerator, OpenQa, QuizItem};
use crate::assessment::store;
use crate::models::assessment::QuestionCategory;

/// A normalized question ready for a single batch append.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub id: Uuid,
    pub category: QuestionCategory,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
}

/// Runs the three generation calls concurrently and returns the union of
/// whichever succeeded, in quiz / coding / text order.
pub async fn synthesize(
    generator: &dyn ContentGenerator,
    job_description: &str,
    resume_text: &str,
) -> Vec<NewQuestion> {
    let (quiz, coding, text) = tokio::join!(
        generator.generate_quiz(job_description, resume_text),
        generator.generate_coding_questions(job_description, resume_text),
        generator.generate_text_questions(job_description, resume_text),
    );

    let mut items = Vec::new();

    match quiz {
        Ok(quiz_items) => items.extend(quiz_items.into_iter().map(normalize_quiz_item)),
        Err(e) => warn!("Quiz generation failed, dropping category: {e}"),
    }
    match coding {
        Ok(qas) => items.extend(
            qas.into_iter()
                .map(|qa| normalize_open_qa(qa, QuestionCategory::OpenCoding)),
        ),
        Err(e) => warn!("Coding Q&A generation failed, dropping category: {e}"),
    }
    match text {
        Ok(qas) => items.extend(
            qas.into_iter()
                .map(|qa| normalize_open_qa(qa, QuestionCategory::OpenText)),
        ),
        Err(e) => warn!("Text Q&A generation failed, dropping category: {e}"),
    }

    items
}

/// Full synthesis job for one candidate: claim the at-most-once guard,
/// generate, and append the batch exactly once.
pub async fn run_synthesis(
    pool: &PgPool,
    generator: &dyn ContentGenerator,
    candidate_id: Uuid,
    job_description: &str,
    resume_text: &str,
) -> anyhow::Result<usize> {
    if !store::claim_question_generation(pool, candidate_id).await? {
        info!("Questions already generated for candidate {candidate_id}, skipping synthesis");
        return Ok(0);
    }

    let items = synthesize(generator, job_description, resume_text).await;

    if items.is_empty() {
        anyhow::bail!("all generation calls failed for candidate {candidate_id}");
    }

    store::append_questions(pool, candidate_id, &items).await?;

    info!(
        "Appended {} questions for candidate {candidate_id}",
        items.len()
    );
    Ok(items.len())
}

fn normalize_quiz_item(item: QuizItem) -> NewQuestion {
    NewQuestion {
        id: Uuid::new_v4(),
        category: QuestionCategory::MultipleChoice,
        question: item.question,
        options: item.options,
        correct_answer: Some(item.correct_answer),
    }
}

fn normalize_open_qa(qa: OpenQa, category: QuestionCategory) -> NewQuestion {
    NewQuestion {
        id: Uuid::new_v4(),
        category,
        question: qa.question,
        options: Vec::new(),
        correct_answer: Some(qa.answer),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::capability::{CommunicationAnalysis, RecordedAnswer, ResumeAnalysis};
    use crate::llm_client::GenError;
    use async_trait::async_trait;
    use std::collections::HashSet;

    /// Mock generator with independently failable calls.
    struct MockGenerator {
        fail_quiz: bool,
        fail_coding: bool,
        fail_text: bool,
    }

    impl MockGenerator {
        fn healthy() -> Self {
            Self {
                fail_quiz: false,
                fail_coding: false,
                fail_text: false,
            }
        }
    }

    #[async_trait]
    impl ContentGenerator for MockGenerator {
        async fn analyze_resume(&self, _: &str, _: &str) -> Result<ResumeAnalysis, GenError> {
            unimplemented!("not exercised by synthesizer tests")
        }

        async fn analyze_communication(
            &self,
            _: &[RecordedAnswer],
        ) -> Result<CommunicationAnalysis, GenError> {
            unimplemented!("not exercised by synthesizer tests")
        }

        async fn generate_quiz(&self, _: &str, _: &str) -> Result<Vec<QuizItem>, GenError> {
            if self.fail_quiz {
                return Err(GenError::Unavailable("quiz down".to_string()));
            }
            Ok((0..10)
                .map(|i| QuizItem {
                    question: format!("mcq {i}"),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    correct_answer: "B".to_string(),
                })
                .collect())
        }

        async fn generate_coding_questions(&self, _: &str, _: &str) -> Result<Vec<OpenQa>, GenError> {
            if self.fail_coding {
                return Err(GenError::QuotaExceeded { retries: 3 });
            }
            Ok((0..5)
                .map(|i| OpenQa {
                    question: format!("coding {i}"),
                    answer: "use an index".to_string(),
                })
                .collect())
        }

        async fn generate_text_questions(&self, _: &str, _: &str) -> Result<Vec<OpenQa>, GenError> {
            if self.fail_text {
                return Err(GenError::InvalidResponse("not json".to_string()));
            }
            Ok((0..5)
                .map(|i| OpenQa {
                    question: format!("text {i}"),
                    answer: "communicate early".to_string(),
                })
                .collect())
        }

        async fn score_open_answer(&self, _: &str, _: &str) -> Result<f64, GenError> {
            unimplemented!("not exercised by synthesizer tests")
        }
    }

    #[tokio::test]
    async fn test_synthesize_unions_all_three_sources() {
        let items = synthesize(&MockGenerator::healthy(), "jd", "resume").await;
        assert_eq!(items.len(), 20);

        let mcq = items
            .iter()
            .filter(|q| q.category == QuestionCategory::MultipleChoice)
            .count();
        let coding = items
            .iter()
            .filter(|q| q.category == QuestionCategory::OpenCoding)
            .count();
        let text = items
            .iter()
            .filter(|q| q.category == QuestionCategory::OpenText)
            .count();
        assert_eq!((mcq, coding, text), (10, 5, 5));
    }

    #[tokio::test]
    async fn test_synthesize_ids_are_pairwise_unique() {
        let items = synthesize(&MockGenerator::healthy(), "jd", "resume").await;
        let ids: HashSet<Uuid> = items.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), items.len());
    }

    #[tokio::test]
    async fn test_failed_call_drops_only_its_category() {
        let generator = MockGenerator {
            fail_quiz: true,
            fail_coding: false,
            fail_text: false,
        };
        let items = synthesize(&generator, "jd", "resume").await;
        assert_eq!(items.len(), 10);
        assert!(items
            .iter()
            .all(|q| q.category != QuestionCategory::MultipleChoice));
    }

    #[tokio::test]
    async fn test_all_calls_failing_yields_empty_union() {
        let generator = MockGenerator {
            fail_quiz: true,
            fail_coding: true,
            fail_text: true,
        };
        let items = synthesize(&generator, "jd", "resume").await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_multiple_choice_items_carry_options_and_answer() {
        let items = synthesize(&MockGenerator::healthy(), "jd", "resume").await;
        for item in items {
            match item.category {
                QuestionCategory::MultipleChoice => {
                    assert_eq!(item.options.len(), 4);
                    assert_eq!(item.correct_answer.as_deref(), Some("B"));
                }
                QuestionCategory::OpenCoding | QuestionCategory::OpenText => {
                    assert!(item.options.is_empty());
                    assert!(item.correct_answer.is_some());
                }
            }
        }
    }
}
