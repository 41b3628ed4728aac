//! Assessment Store - the persistence boundary of the pipeline.
//!
//! Every write is scoped to the owning candidate id (and question id for
//! in-place score updates), so concurrent writers touching the same
//! candidate never clobber each other's fields. Merges use
//! `ON CONFLICT ... COALESCE(EXCLUDED.col, old.col)`: only the fields a
//! stage actually provides are written, everything else is preserved.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::assessment::synthesizer::NewQuestion;
use crate::models::assessment::{AssessmentRow, CandidateRow, QuestionRow};

// ────────────────────────────────────────────────────────────────────────────
// Candidates
// ────────────────────────────────────────────────────────────────────────────

/// Candidate facts captured at submission.
#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub user_id: Uuid,
    pub candidate_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hr_name: Option<String>,
    pub job_position: Option<String>,
}

/// Always inserts a new candidate; the identifier is assigned here.
pub async fn insert_candidate(pool: &PgPool, candidate: NewCandidate) -> sqlx::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO candidates (id, user_id, candidate_name, email, phone, hr_name, job_position)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(candidate.user_id)
    .bind(&candidate.candidate_name)
    .bind(&candidate.email)
    .bind(&candidate.phone)
    .bind(&candidate.hr_name)
    .bind(&candidate.job_position)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn find_candidate_by_email(
    pool: &PgPool,
    email: &str,
) -> sqlx::Result<Option<CandidateRow>> {
    sqlx::query_as::<_, CandidateRow>(
        "SELECT * FROM candidates WHERE email = $1 AND NOT is_deleted",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_candidate(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<CandidateRow>> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1 AND NOT is_deleted")
        .bind(id)
        .fetch_optional(pool)
        .await
}

// ────────────────────────────────────────────────────────────────────────────
// Assessment merge-upsert
// ────────────────────────────────────────────────────────────────────────────

/// A partial assessment write. Only `Some` fields are set; `None` fields are
/// left untouched in the stored row.
#[derive(Debug, Clone, Default)]
pub struct AssessmentPatch {
    pub resume_text: Option<String>,
    pub job_description: Option<String>,
    pub resume_analysis: Option<Value>,
    pub communication: Option<Value>,
    pub technical: Option<Value>,
    pub overall_score: Option<f64>,
    pub fit: Option<String>,
}

impl AssessmentPatch {
    /// Applies the patch to an in-memory row with the same field rules the
    /// merge-upsert uses: `Some` overwrites, `None` preserves. Kept in
    /// lockstep with the COALESCE list in `merge_assessment`.
    pub fn apply_to(&self, row: &mut AssessmentRow) {
        fn set<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
            if source.is_some() {
                *target = source.clone();
            }
        }
        set(&mut row.resume_text, &self.resume_text);
        set(&mut row.job_description, &self.job_description);
        set(&mut row.resume_analysis, &self.resume_analysis);
        set(&mut row.communication, &self.communication);
        set(&mut row.technical, &self.technical);
        set(&mut row.overall_score, &self.overall_score);
        set(&mut row.fit, &self.fit);
    }
}

/// Merge-upsert: creates the record with defaults if absent, otherwise sets
/// only the named fields, preserving concurrently-written siblings.
/// Overlapping fields are last-write-wins.
pub async fn merge_assessment(
    pool: &PgPool,
    candidate_id: Uuid,
    patch: AssessmentPatch,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO assessments
            (candidate_id, resume_text, job_description, resume_analysis,
             communication, technical, overall_score, fit)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (candidate_id) DO UPDATE SET
            resume_text     = COALESCE(EXCLUDED.resume_text, assessments.resume_text),
            job_description = COALESCE(EXCLUDED.job_description, assessments.job_description),
            resume_analysis = COALESCE(EXCLUDED.resume_analysis, assessments.resume_analysis),
            communication   = COALESCE(EXCLUDED.communication, assessments.communication),
            technical       = COALESCE(EXCLUDED.technical, assessments.technical),
            overall_score   = COALESCE(EXCLUDED.overall_score, assessments.overall_score),
            fit             = COALESCE(EXCLUDED.fit, assessments.fit),
            updated_at      = now()
        "#,
    )
    .bind(candidate_id)
    .bind(&patch.resume_text)
    .bind(&patch.job_description)
    .bind(&patch.resume_analysis)
    .bind(&patch.communication)
    .bind(&patch.technical)
    .bind(patch.overall_score)
    .bind(&patch.fit)
    .execute(pool)
    .await?;
    Ok(())
}

/// Write-once communication analysis: the merge only lands if no
/// communication analysis is present yet. Returns whether the write happened.
pub async fn merge_communication_if_absent(
    pool: &PgPool,
    candidate_id: Uuid,
    communication: &Value,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE assessments
        SET communication = $2, updated_at = now()
        WHERE candidate_id = $1 AND communication IS NULL
        "#,
    )
    .bind(candidate_id)
    .bind(communication)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_assessment(
    pool: &PgPool,
    candidate_id: Uuid,
) -> sqlx::Result<Option<AssessmentRow>> {
    sqlx::query_as::<_, AssessmentRow>(
        "SELECT * FROM assessments WHERE candidate_id = $1 AND NOT is_deleted",
    )
    .bind(candidate_id)
    .fetch_optional(pool)
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Question collection
// ────────────────────────────────────────────────────────────────────────────

/// Atomic at-most-once guard for question synthesis. The first caller flips
/// the flag (creating the assessment row if needed) and gets `true`; every
/// later caller gets `false`.
pub async fn claim_question_generation(pool: &PgPool, candidate_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO assessments (candidate_id, questions_generated)
        VALUES ($1, TRUE)
        ON CONFLICT (candidate_id) DO UPDATE SET
            questions_generated = TRUE,
            updated_at = now()
        WHERE NOT assessments.questions_generated
        "#,
    )
    .bind(candidate_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Appends a batch to the candidate's question collection. Append, never
/// replace: repeated calls accumulate, which is why callers go through
/// `claim_question_generation` first.
pub async fn append_questions(
    pool: &PgPool,
    candidate_id: Uuid,
    items: &[NewQuestion],
) -> sqlx::Result<()> {
    // Parent row may not exist yet if synthesis raced ahead of the submit path.
    merge_assessment(pool, candidate_id, AssessmentPatch::default()).await?;

    for item in items {
        sqlx::query(
            r#"
            INSERT INTO assessment_questions
                (id, candidate_id, category, question, options, correct_answer)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id)
        .bind(candidate_id)
        .bind(item.category.as_str())
        .bind(&item.question)
        .bind(&item.options)
        .bind(&item.correct_answer)
        .execute(pool)
        .await?;
    }
    Ok(())
}

pub async fn fetch_questions(pool: &PgPool, candidate_id: Uuid) -> sqlx::Result<Vec<QuestionRow>> {
    sqlx::query_as::<_, QuestionRow>(
        "SELECT * FROM assessment_questions WHERE candidate_id = $1 ORDER BY seq ASC",
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_question(
    pool: &PgPool,
    candidate_id: Uuid,
    question_id: Uuid,
) -> sqlx::Result<Option<QuestionRow>> {
    sqlx::query_as::<_, QuestionRow>(
        "SELECT * FROM assessment_questions WHERE candidate_id = $1 AND id = $2",
    )
    .bind(candidate_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await
}

/// Targeted in-place update of exactly one question's answer and score.
/// Returns the matched-row count; 0 means "nothing to update", which the
/// caller distinguishes from a hard failure.
pub async fn update_question_score(
    pool: &PgPool,
    candidate_id: Uuid,
    question_id: Uuid,
    submitted_answer: &str,
    score: f64,
) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE assessment_questions
        SET submitted_answer = $3, score = $4
        WHERE candidate_id = $1 AND id = $2
        "#,
    )
    .bind(candidate_id)
    .bind(question_id)
    .bind(submitted_answer)
    .bind(score)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// In-memory statement of `update_question_score`'s contract: only the row
/// matching both ids is written, and the matched count is reported so an
/// unknown id is distinguishable from a successful write. Kept in lockstep
/// with the UPDATE above.
pub fn apply_score_update(
    questions: &mut [QuestionRow],
    candidate_id: Uuid,
    question_id: Uuid,
    submitted_answer: &str,
    score: f64,
) -> u64 {
    let mut matched = 0;
    for question in questions.iter_mut() {
        if question.candidate_id == candidate_id && question.id == question_id {
            question.submitted_answer = Some(submitted_answer.to_string());
            question.score = Some(score);
            matched += 1;
        }
    }
    matched
}

// ────────────────────────────────────────────────────────────────────────────
// Paginated dashboard listing
// ────────────────────────────────────────────────────────────────────────────

/// One dashboard line: candidate facts joined with the headline scores
/// pulled out of the analysis document.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummary {
    pub candidate_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hr_name: Option<String>,
    pub job_position: Option<String>,
    pub communication_score: Option<f64>,
    pub resume_score: Option<f64>,
    pub overall_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub status: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    candidate_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    hr_name: Option<String>,
    job_position: Option<String>,
    resume_analysis: Option<Value>,
    communication: Option<Value>,
    technical: Option<Value>,
    overall_score: Option<f64>,
    fit: Option<String>,
    created_at: DateTime<Utc>,
}

const SUMMARY_COLUMNS: &str = r#"
    c.candidate_name, c.email, c.phone, c.hr_name, c.job_position,
    a.resume_analysis, a.communication, a.technical, a.overall_score, a.fit,
    c.created_at
"#;

const LIST_FILTER: &str = r#"
    NOT c.is_deleted
    AND c.user_id = $1
    AND ($2::text IS NULL
         OR c.candidate_name ILIKE $2
         OR c.email ILIKE $2
         OR c.job_position ILIKE $2
         OR c.hr_name ILIKE $2)
"#;

/// Candidate-assessment join for one owning user: optional case-insensitive
/// substring filter, newest first, offset/limit pagination. The total count
/// applies the same filter, independently of the page window.
pub async fn list_assessments(
    pool: &PgPool,
    user_id: Uuid,
    offset: i64,
    limit: i64,
    search: Option<&str>,
) -> sqlx::Result<(Vec<AssessmentSummary>, i64)> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    let rows = sqlx::query_as::<_, SummaryRow>(&format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM candidates c
        JOIN assessments a ON a.candidate_id = c.id
        WHERE {LIST_FILTER}
        ORDER BY c.created_at DESC
        OFFSET $3 LIMIT $4
        "#
    ))
    .bind(user_id)
    .bind(&pattern)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*)
        FROM candidates c
        JOIN assessments a ON a.candidate_id = c.id
        WHERE {LIST_FILTER}
        "#
    ))
    .bind(user_id)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((rows.into_iter().map(summarize).collect(), total))
}

fn summarize(row: SummaryRow) -> AssessmentSummary {
    let score_of = |value: &Option<Value>, key: &str| {
        value.as_ref().and_then(|v| v.get(key)).and_then(Value::as_f64)
    };

    AssessmentSummary {
        communication_score: score_of(&row.communication, "communication_score"),
        resume_score: score_of(&row.resume_analysis, "match_score"),
        technical_score: score_of(&row.technical, "technical_score"),
        overall_score: row.overall_score,
        status: row.fit,
        date: row.created_at.date_naive(),
        candidate_name: row.candidate_name,
        email: row.email,
        phone: row.phone,
        hr_name: row.hr_name,
        job_position: row.job_position,
    }
}
