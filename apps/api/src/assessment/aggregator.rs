//! Aggregator - combines per-category score buckets, the resume match
//! score, and the stored communication analysis into one weighted overall
//! score and a discrete fit classification.
//!
//! Weighting: resume 40, technical 60. The communication score is computed
//! and stored but carries no weight in the final formula.
//!
//! Empty-bucket policy: a category with zero scored answers fails the
//! aggregation with `Incomplete` until at least one answer in that category
//! has been scored.

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::assessment::store::{self, AssessmentPatch};
use crate::errors::AppError;
use crate::models::assessment::{CandidateRow, QuestionCategory, QuestionRow};

/// Weight of the resume match score in the final formula.
const WEIGHT_RESUME: f64 = 40.0;
/// Weight of the technical overall in the final formula.
const WEIGHT_TECHNICAL: f64 = 60.0;

/// Per-category means plus their combined technical overall.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalBreakdown {
    /// Mean of the multiple-choice (experience-based) bucket.
    pub experience_based: f64,
    /// Mean of the open coding bucket.
    pub coding: f64,
    /// Mean of the open text bucket.
    pub text: f64,
    /// Mean of the three bucket means.
    pub technical_score: f64,
}

/// Discrete fit band derived from the final overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fit {
    #[serde(rename = "Strong Fit")]
    Strong,
    #[serde(rename = "Potential Fit")]
    Potential,
    #[serde(rename = "Not a Fit")]
    NotAFit,
}

impl Fit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fit::Strong => "Strong Fit",
            Fit::Potential => "Potential Fit",
            Fit::NotAFit => "Not a Fit",
        }
    }
}

impl std::fmt::Display for Fit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The combined report returned by the results endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub candidate: CandidateRow,
    pub resume_analysis: Option<Value>,
    pub communication: Option<Value>,
    pub technical: TechnicalBreakdown,
    pub overall_score: f64,
    pub fit: Fit,
}

/// Buckets scored questions by category and computes the per-bucket means.
pub fn technical_breakdown(items: &[QuestionRow]) -> Result<TechnicalBreakdown, AppError> {
    let mut experience = Vec::new();
    let mut coding = Vec::new();
    let mut text = Vec::new();

    for item in items {
        let Some(score) = item.score else { continue };
        match QuestionCategory::parse(&item.category) {
            Some(QuestionCategory::MultipleChoice) => experience.push(score),
            Some(QuestionCategory::OpenCoding) => coding.push(score),
            Some(QuestionCategory::OpenText) => text.push(score),
            None => {}
        }
    }

    let experience_based = bucket_mean(&experience, "multiple-choice")?;
    let coding = bucket_mean(&coding, "coding")?;
    let text = bucket_mean(&text, "text")?;

    Ok(TechnicalBreakdown {
        experience_based,
        coding,
        text,
        technical_score: (experience_based + coding + text) / 3.0,
    })
}

fn bucket_mean(scores: &[f64], label: &str) -> Result<f64, AppError> {
    if scores.is_empty() {
        return Err(AppError::Incomplete(format!(
            "No scored {label} answers yet"
        )));
    }
    Ok(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Weighted final score, rounded to 2 decimal places.
pub fn final_score(resume_match: f64, technical: f64) -> f64 {
    let score =
        (resume_match * WEIGHT_RESUME + technical * WEIGHT_TECHNICAL) / (WEIGHT_RESUME + WEIGHT_TECHNICAL);
    (score * 100.0).round() / 100.0
}

/// Band boundaries are inclusive on the lower bound.
pub fn classify_fit(score: f64) -> Fit {
    if score >= 85.0 {
        Fit::Strong
    } else if score >= 70.0 {
        Fit::Potential
    } else {
        Fit::NotAFit
    }
}

/// Aggregates all score sources for one candidate and persists the result.
///
/// Two merge-upserts land on the assessment row: first the technical
/// breakdown, then the final `{overall_score, fit}`. Both are scoped merges,
/// so neither clobbers fields written by other stages.
pub async fn aggregate(pool: &PgPool, candidate_id: Uuid) -> Result<AggregateReport, AppError> {
    let candidate = store::fetch_candidate(pool, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;

    let assessment = store::fetch_assessment(pool, candidate_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No assessment for candidate {candidate_id}"))
        })?;

    let questions = store::fetch_questions(pool, candidate_id).await?;
    let technical = technical_breakdown(&questions)?;

    let technical_value = serde_json::to_value(&technical)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize breakdown: {e}")))?;
    store::merge_assessment(
        pool,
        candidate_id,
        AssessmentPatch {
            technical: Some(technical_value),
            ..Default::default()
        },
    )
    .await?;

    // Missing resume analysis contributes 0, not an error; the resume stage
    // is best-effort on the submit path.
    let resume_match = assessment
        .resume_analysis
        .as_ref()
        .and_then(|v| v.get("match_score"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let overall_score = final_score(resume_match, technical.technical_score);
    let fit = classify_fit(overall_score);

    store::merge_assessment(
        pool,
        candidate_id,
        AssessmentPatch {
            overall_score: Some(overall_score),
            fit: Some(fit.as_str().to_string()),
            ..Default::default()
        },
    )
    .await?;

    Ok(AggregateReport {
        candidate,
        resume_analysis: assessment.resume_analysis,
        communication: assessment.communication,
        technical,
        overall_score,
        fit,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scored(category: QuestionCategory, score: f64) -> QuestionRow {
        QuestionRow {
            id: Uuid::new_v4(),
            seq: 0,
            candidate_id: Uuid::new_v4(),
            category: category.as_str().to_string(),
            question: "q".to_string(),
            options: Vec::new(),
            correct_answer: None,
            submitted_answer: Some("a".to_string()),
            score: Some(score),
            created_at: Utc::now(),
        }
    }

    fn unscored(category: QuestionCategory) -> QuestionRow {
        QuestionRow {
            score: None,
            submitted_answer: None,
            ..scored(category, 0.0)
        }
    }

    #[test]
    fn test_breakdown_means_per_bucket() {
        let items = vec![
            scored(QuestionCategory::MultipleChoice, 100.0),
            scored(QuestionCategory::MultipleChoice, 60.0),
            scored(QuestionCategory::OpenCoding, 60.0),
            scored(QuestionCategory::OpenText, 70.0),
        ];
        let breakdown = technical_breakdown(&items).unwrap();
        assert_eq!(breakdown.experience_based, 80.0);
        assert_eq!(breakdown.coding, 60.0);
        assert_eq!(breakdown.text, 70.0);
        assert_eq!(breakdown.technical_score, 70.0);
    }

    #[test]
    fn test_unscored_items_are_excluded_from_buckets() {
        let items = vec![
            scored(QuestionCategory::MultipleChoice, 100.0),
            unscored(QuestionCategory::MultipleChoice),
            scored(QuestionCategory::OpenCoding, 50.0),
            scored(QuestionCategory::OpenText, 50.0),
        ];
        let breakdown = technical_breakdown(&items).unwrap();
        assert_eq!(breakdown.experience_based, 100.0);
    }

    #[test]
    fn test_empty_bucket_is_incomplete() {
        // No scored coding answers: aggregation must not divide by zero.
        let items = vec![
            scored(QuestionCategory::MultipleChoice, 80.0),
            unscored(QuestionCategory::OpenCoding),
            scored(QuestionCategory::OpenText, 70.0),
        ];
        let result = technical_breakdown(&items);
        assert!(matches!(result, Err(AppError::Incomplete(_))));
    }

    #[test]
    fn test_no_questions_at_all_is_incomplete() {
        assert!(matches!(
            technical_breakdown(&[]),
            Err(AppError::Incomplete(_))
        ));
    }

    #[test]
    fn test_final_score_weighted_40_60() {
        // buckets {80, 60, 70} -> technical 70; resume 50 -> 62.0
        assert_eq!(final_score(50.0, 70.0), 62.0);
        assert_eq!(final_score(90.0, 90.0), 90.0);
    }

    #[test]
    fn test_final_score_rounds_to_2_decimals() {
        // (33.333*40 + 66.667*60) / 100 = 53.3334 -> 53.33
        assert_eq!(final_score(33.333, 66.667), 53.33);
    }

    #[test]
    fn test_fit_band_boundaries_inclusive_lower() {
        assert_eq!(classify_fit(85.0), Fit::Strong);
        assert_eq!(classify_fit(84.99), Fit::Potential);
        assert_eq!(classify_fit(70.0), Fit::Potential);
        assert_eq!(classify_fit(69.99), Fit::NotAFit);
    }

    #[test]
    fn test_fit_of_weighted_scores() {
        assert_eq!(classify_fit(final_score(50.0, 70.0)), Fit::NotAFit);
        assert_eq!(classify_fit(final_score(90.0, 90.0)), Fit::Strong);
    }

    #[test]
    fn test_fit_serializes_as_display_band() {
        let json = serde_json::to_string(&Fit::Strong).unwrap();
        assert_eq!(json, r#""Strong Fit""#);
        assert_eq!(Fit::NotAFit.to_string(), "Not a Fit");
    }
}
