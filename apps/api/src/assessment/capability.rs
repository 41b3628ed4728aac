//! Content generation capability - the trait boundary between the pipeline
//! and the external reasoning service.
//!
//! Carried in `AppState` as `Arc<dyn ContentGenerator>` so handlers, the
//! synthesizer, and the scorer never depend on a concrete provider, and
//! tests can substitute a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assessment::prompts::{
    ANSWER_RUBRIC_PROMPT, CODING_QA_PROMPT, COMMUNICATION_PROMPT, QUIZ_PROMPT,
    RESUME_ANALYSIS_PROMPT, TEXT_QA_PROMPT,
};
use crate::llm_client::{GeminiClient, GenError};

// ────────────────────────────────────────────────────────────────────────────
// Structured generation outputs
// ────────────────────────────────────────────────────────────────────────────

/// Resume-to-JD match analysis, written once on the synchronous submit path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub key_highlights: Vec<String>,
    pub questions: Vec<String>,
}

/// Communication analysis over a batch of recorded answers.
/// `key_metrics` is kept schemaless: the model reports qualitative metrics
/// (response time, filler words, speech rate, confidence) in loose shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationAnalysis {
    pub communication_score: f64,
    pub fluency: f64,
    pub clarity: f64,
    pub professionalism: f64,
    pub key_metrics: Value,
    pub feedback: Vec<String>,
}

/// One multiple-choice quiz item as returned by the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// One open-form question/answer pair (coding or text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenQa {
    pub question: String,
    pub answer: String,
}

/// A question/answer pair submitted for communication analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct QuizEnvelope {
    quiz: Vec<QuizItem>,
}

#[derive(Debug, Deserialize)]
struct QaEnvelope {
    questions: Vec<OpenQa>,
}

#[derive(Debug, Deserialize)]
struct RubricScore {
    overall_score: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The generation capability consumed by every pipeline stage.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn analyze_resume(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<ResumeAnalysis, GenError>;

    async fn analyze_communication(
        &self,
        answers: &[RecordedAnswer],
    ) -> Result<CommunicationAnalysis, GenError>;

    /// 10-item multiple-choice quiz.
    async fn generate_quiz(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<Vec<QuizItem>, GenError>;

    /// 5-item open coding/design Q&A set.
    async fn generate_coding_questions(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<Vec<OpenQa>, GenError>;

    /// 5-item open text Q&A set.
    async fn generate_text_questions(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<Vec<OpenQa>, GenError>;

    /// Rubric-based score of a single open-form answer, in [0, 100].
    async fn score_open_answer(&self, question: &str, answer: &str) -> Result<f64, GenError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini-backed implementation
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn analyze_resume(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<ResumeAnalysis, GenError> {
        let prompt = fill(RESUME_ANALYSIS_PROMPT, job_description, resume_text);
        self.call_json::<ResumeAnalysis>(&prompt).await
    }

    async fn analyze_communication(
        &self,
        answers: &[RecordedAnswer],
    ) -> Result<CommunicationAnalysis, GenError> {
        let answers_json =
            serde_json::to_string(answers).map_err(|e| GenError::InvalidResponse(e.to_string()))?;
        let prompt = COMMUNICATION_PROMPT.replace("{answers_json}", &answers_json);
        self.call_json::<CommunicationAnalysis>(&prompt).await
    }

    async fn generate_quiz(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<Vec<QuizItem>, GenError> {
        let prompt = fill(QUIZ_PROMPT, job_description, resume_text);
        let envelope: QuizEnvelope = self.call_json(&prompt).await?;
        Ok(envelope.quiz)
    }

    async fn generate_coding_questions(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<Vec<OpenQa>, GenError> {
        let prompt = fill(CODING_QA_PROMPT, job_description, resume_text);
        let envelope: QaEnvelope = self.call_json(&prompt).await?;
        Ok(envelope.questions)
    }

    async fn generate_text_questions(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<Vec<OpenQa>, GenError> {
        let prompt = fill(TEXT_QA_PROMPT, job_description, resume_text);
        let envelope: QaEnvelope = self.call_json(&prompt).await?;
        Ok(envelope.questions)
    }

    async fn score_open_answer(&self, question: &str, answer: &str) -> Result<f64, GenError> {
        let prompt = ANSWER_RUBRIC_PROMPT
            .replace("{question}", question)
            .replace("{answer}", answer);
        let score: RubricScore = self.call_json(&prompt).await?;
        Ok(score.overall_score)
    }
}

fn fill(template: &str, job_description: &str, resume_text: &str) -> String {
    template
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text)
}
