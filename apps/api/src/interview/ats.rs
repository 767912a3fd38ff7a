//! ATS matching: how well a résumé fits a job description, on four 0–100 scores.
//!
//! Falls back to keyword coverage (`fallback::basic_ats_match`) whenever the
//! model is unavailable. `match_resumes` ranks several candidates against one
//! job description.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::fallback::{basic_ats_match, FallbackReason};
use crate::interview::models::{
    BatchMatchRequest, BatchMatchResult, MatchRequest, MatchResult, RankedMatch,
};
use crate::interview::parser::resolve_match;
use crate::interview::prompts::build_match_prompt;
use crate::llm_client::{LlmCallResult, LlmClient, LlmTask};

pub async fn match_resume(
    llm: &LlmClient,
    request: &MatchRequest,
) -> Result<MatchResult, AppError> {
    request.validate()?;

    info!(
        "Running ATS match (job_title={:?}, resume={} chars, jd={} chars)",
        request.job_title,
        request.resume_text.chars().count(),
        request.job_description_text.chars().count()
    );

    let prompt = build_match_prompt(request);
    let result = llm.call(LlmTask::AtsMatching, &prompt).await;
    let matched = match_from_call(result, request);

    info!(
        "ATS overall score {:.2} (source={:?})",
        matched.overall_score, matched.source
    );
    Ok(matched)
}

pub fn match_from_call(result: LlmCallResult, request: &MatchRequest) -> MatchResult {
    match result {
        LlmCallResult::Success(raw) => resolve_match(&raw),
        LlmCallResult::NoCredentials => basic_ats_match(request, FallbackReason::NoCredentials),
        LlmCallResult::ProviderFailure(reason) => {
            warn!("ATS matching failed ({reason}); using keyword matching");
            basic_ats_match(request, FallbackReason::ProviderFailure)
        }
    }
}

/// Matches every candidate with résumé text, one model call at a time, and
/// ranks them by overall score. Ties keep submission order.
pub async fn match_resumes(
    llm: &LlmClient,
    request: &BatchMatchRequest,
) -> Result<BatchMatchResult, AppError> {
    request.validate()?;

    let mut matches = Vec::with_capacity(request.resumes.len());
    let mut skipped = Vec::new();
    for candidate in &request.resumes {
        if candidate.resume_text.trim().is_empty() {
            warn!("Skipping résumé {} with no extracted text", candidate.resume_id);
            skipped.push(candidate.resume_id.clone());
            continue;
        }
        let result = match_resume(llm, &request.for_candidate(candidate)).await?;
        matches.push(RankedMatch {
            resume_id: candidate.resume_id.clone(),
            result,
        });
    }

    matches.sort_by(|a, b| b.result.overall_score.total_cmp(&a.result.overall_score));
    info!(
        "Batch ATS match ranked {} résumés ({} skipped)",
        matches.len(),
        skipped.len()
    );
    Ok(BatchMatchResult { matches, skipped })
}
