//! Axum route handlers for the Interview and ATS APIs.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::answers::{submit_answer, AnswerOutcome, AnswerSubmission};
use crate::interview::ats::{match_resume, match_resumes};
use crate::interview::evaluation::evaluate_answer;
use crate::interview::mcq::{score_mcq, McqOutcome};
use crate::interview::models::{
    BatchMatchRequest, BatchMatchResult, EvaluationRequest, EvaluationResult, GeneratedQuestions,
    GenerationRequest, MatchRequest, MatchResult, McqOption,
};
use crate::interview::question_gen::generate_questions;
use crate::interview::report::{build_report, InterviewReport, ReportRequest};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct McqCheckRequest {
    pub selected_option: String,
    pub correct_answer: String,
}

#[derive(Debug, Serialize)]
pub struct McqCheckResponse {
    #[serde(flatten)]
    pub outcome: McqOutcome,
    pub correct_answer: McqOption,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews/questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GeneratedQuestions>, AppError> {
    let Json(request) = payload?;
    let generated = generate_questions(&state.llm, &request).await?;
    Ok(Json(generated))
}

/// POST /api/v1/interviews/answers/evaluate
pub async fn handle_evaluate_answer(
    State(state): State<AppState>,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Result<Json<EvaluationResult>, AppError> {
    let Json(request) = payload?;
    let evaluation = evaluate_answer(&state.llm, &request).await?;
    Ok(Json(evaluation))
}

/// POST /api/v1/interviews/answers/submit
///
/// MCQ answers are scored by letter; open answers are transcribed if audio is
/// attached and then evaluated.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    payload: Result<Json<AnswerSubmission>, JsonRejection>,
) -> Result<Json<AnswerOutcome>, AppError> {
    let Json(submission) = payload?;
    let outcome = submit_answer(&state.llm, state.transcriber.as_ref(), submission).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/interviews/report
pub async fn handle_interview_report(
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<InterviewReport>, AppError> {
    let Json(request) = payload?;
    Ok(Json(build_report(&request)))
}

/// POST /api/v1/ats/match
pub async fn handle_ats_match(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchResult>, AppError> {
    let Json(request) = payload?;
    let matched = match_resume(&state.llm, &request).await?;
    Ok(Json(matched))
}

/// POST /api/v1/ats/match-batch
///
/// Ranks several résumés against one job description, best match first.
pub async fn handle_ats_match_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchMatchRequest>, JsonRejection>,
) -> Result<Json<BatchMatchResult>, AppError> {
    let Json(request) = payload?;
    let ranked = match_resumes(&state.llm, &request).await?;
    Ok(Json(ranked))
}

/// POST /api/v1/mcq/check
pub async fn handle_mcq_check(
    payload: Result<Json<McqCheckRequest>, JsonRejection>,
) -> Result<Json<McqCheckResponse>, AppError> {
    let Json(request) = payload?;
    let correct_answer = McqOption::from_letter(&request.correct_answer).ok_or_else(|| {
        AppError::Validation(format!(
            "correct_answer must be one of A, B, C, D; got {:?}",
            request.correct_answer
        ))
    })?;
    if McqOption::from_letter(&request.selected_option).is_none() {
        return Err(AppError::Validation(format!(
            "selected_option must be one of A, B, C, D; got {:?}",
            request.selected_option
        )));
    }

    let outcome = score_mcq(&request.selected_option, correct_answer.as_str());
    Ok(Json(McqCheckResponse {
        outcome,
        correct_answer,
    }))
}
