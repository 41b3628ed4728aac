use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sqlx::error::DatabaseError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::aggregator::{self, AggregateReport};
use crate::assessment::capability::{CommunicationAnalysis, RecordedAnswer, ResumeAnalysis};
use crate::assessment::extract::extract_resume_text;
use crate::assessment::poller::poll_questions;
use crate::assessment::scorer::score_submission;
use crate::assessment::store::{self, AssessmentPatch, AssessmentSummary, NewCandidate};
use crate::errors::AppError;
use crate::jobs::QuestionJob;
use crate::models::assessment::QuestionRow;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Submission
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SubmitFields {
    user_id: Option<Uuid>,
    candidate_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    hr_name: Option<String>,
    job_position: Option<String>,
    job_description: Option<String>,
    resume: Option<(String, Bytes)>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub candidate_id: Uuid,
    /// `None` when the synchronous analysis call failed; the candidate is
    /// created either way and the analysis field stays unset in the store.
    pub resume_analysis: Option<ResumeAnalysis>,
}

/// POST /api/v1/assessments (multipart)
///
/// Creates the candidate, extracts the resume text, runs the synchronous
/// best-effort resume analysis, then enqueues question synthesis and returns
/// without waiting for it.
pub async fn handle_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let fields = read_submit_fields(multipart).await?;

    let user_id = require(fields.user_id, "user_id")?;
    let email = require(fields.email, "email")?;
    let job_description = require(fields.job_description, "job_description")?;
    let (filename, resume_bytes) = require(fields.resume, "resume")?;

    if store::find_candidate_by_email(&state.db, &email)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(format!(
            "A candidate with email {email} already exists"
        )));
    }

    let resume_text = extract_resume_text(&filename, &resume_bytes)?;

    // Concurrent submits can race past the pre-check; the partial unique
    // index on active emails catches the loser, which must still be a 400.
    let candidate_id = store::insert_candidate(
        &state.db,
        NewCandidate {
            user_id,
            candidate_name: fields.candidate_name,
            email: Some(email.clone()),
            phone: fields.phone,
            hr_name: fields.hr_name,
            job_position: fields.job_position,
        },
    )
    .await
    .map_err(|e| map_candidate_insert_error(e, &email))?;

    // Best-effort: a generation failure must not lose the submission.
    let resume_analysis = match state
        .generator
        .analyze_resume(&job_description, &resume_text)
        .await
    {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            warn!("Resume analysis failed for candidate {candidate_id}: {e}");
            None
        }
    };

    let analysis_value = resume_analysis
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize analysis: {e}")))?;

    store::merge_assessment(
        &state.db,
        candidate_id,
        AssessmentPatch {
            resume_text: Some(resume_text.clone()),
            job_description: Some(job_description.clone()),
            resume_analysis: analysis_value,
            ..Default::default()
        },
    )
    .await?;

    state
        .queue
        .enqueue(&QuestionJob {
            candidate_id,
            job_description,
            resume_text,
        })
        .await
        .map_err(AppError::Internal)?;

    info!("Accepted submission for candidate {candidate_id}");

    Ok(Json(SubmitResponse {
        candidate_id,
        resume_analysis,
    }))
}

async fn read_submit_fields(mut multipart: Multipart) -> Result<SubmitFields, AppError> {
    let mut fields = SubmitFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "resume" {
            let filename = field.file_name().unwrap_or("resume").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read resume upload: {e}")))?;
            fields.resume = Some((filename, bytes));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field {name}: {e}")))?;

        match name.as_str() {
            "user_id" => {
                let parsed = value
                    .parse::<Uuid>()
                    .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?;
                fields.user_id = Some(parsed);
            }
            "candidate_name" => fields.candidate_name = Some(value),
            "email" => fields.email = Some(value),
            "phone" => fields.phone = Some(value),
            "hr_name" => fields.hr_name = Some(value),
            "job_position" => fields.job_position = Some(value),
            "job_description" => fields.job_description = Some(value),
            _ => {} // unknown parts are ignored
        }
    }

    Ok(fields)
}

fn require<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn map_candidate_insert_error(e: sqlx::Error, email: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::Validation(format!(
                "A candidate with email {email} already exists"
            ));
        }
    }
    AppError::Database(e)
}

// ────────────────────────────────────────────────────────────────────────────
// Questions and answers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/assessments/:candidate_id/questions
///
/// Waits (bounded) for the background synthesis to land questions. A poll
/// timeout surfaces as 408 so the client can retry later.
pub async fn handle_get_questions(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<Vec<QuestionRow>>, AppError> {
    store::fetch_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let questions = poll_questions(&state.db, candidate_id, &state.poll_config).await?;
    Ok(Json(questions))
}

#[derive(Deserialize)]
pub struct SingleAnswerRequest {
    pub answer: String,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub question_id: Uuid,
    pub score: f64,
}

/// POST /api/v1/assessments/:candidate_id/answers/:question_id
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path((candidate_id, question_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SingleAnswerRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    if req.answer.trim().is_empty() {
        return Err(AppError::Validation("answer must not be empty".to_string()));
    }

    let score = score_submission(
        &state.db,
        state.generator.as_ref(),
        candidate_id,
        question_id,
        &req.answer,
    )
    .await?;

    Ok(Json(ScoreResponse { question_id, score }))
}

#[derive(Deserialize)]
pub struct BatchAnswersRequest {
    pub answers: Vec<RecordedAnswer>,
}

/// POST /api/v1/assessments/:candidate_id/answers
///
/// Runs communication analysis over the full answer batch. Write-once: a
/// second batch for the same candidate is rejected without calling the
/// generator's persistence path twice.
pub async fn handle_submit_all_answers(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Json(req): Json<BatchAnswersRequest>,
) -> Result<Json<CommunicationAnalysis>, AppError> {
    if req.answers.is_empty() {
        return Err(AppError::Validation(
            "answers must not be empty".to_string(),
        ));
    }

    store::fetch_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let analysis = state.generator.analyze_communication(&req.answers).await?;

    let value = serde_json::to_value(&analysis)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize analysis: {e}")))?;

    let written = store::merge_communication_if_absent(&state.db, candidate_id, &value).await?;
    if !written {
        return Err(AppError::Validation(format!(
            "Communication analysis already recorded for candidate {candidate_id}"
        )));
    }

    Ok(Json(analysis))
}

// ────────────────────────────────────────────────────────────────────────────
// Results and dashboard
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/assessments/:candidate_id/results
pub async fn handle_get_results(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<AggregateReport>, AppError> {
    let report = aggregator::aggregate(&state.db, candidate_id).await?;
    Ok(Json(report))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub user_id: Uuid,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub items: Vec<AssessmentSummary>,
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

/// GET /api/v1/assessments?user_id=&page=&page_size=&search=
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation("page must be >= 1".to_string()));
    }

    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(AppError::Validation(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let (items, total_count) = store::list_assessments(
        &state.db,
        params.user_id,
        page_offset(page, page_size),
        page_size,
        params.search.as_deref(),
    )
    .await?;

    Ok(Json(ListResponse {
        items,
        page,
        page_size,
        total_count,
        total_pages: total_pages(total_count, page_size),
    }))
}

fn page_offset(page: i64, page_size: i64) -> i64 {
    (page - 1) * page_size
}

fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if total_count == 0 {
        0
    } else {
        (total_count + page_size - 1) / page_size
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
