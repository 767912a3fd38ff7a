use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::fallback::{basic_evaluation, FallbackReason};
use crate::interview::models::{EvaluationRequest, EvaluationResult};
use crate::interview::parser::resolve_evaluation;
use crate::interview::prompts::build_evaluation_prompt;
use crate::llm_client::{LlmCallResult, LlmClient, LlmTask};

/// Scores one free-text answer on a 0–10 scale.
pub async fn evaluate_answer(
    llm: &LlmClient,
    request: &EvaluationRequest,
) -> Result<EvaluationResult, AppError> {
    request.validate()?;

    info!(
        "Evaluating {} answer ({} chars)",
        request.question_type.as_str(),
        request.answer_text.chars().count()
    );

    let prompt = build_evaluation_prompt(request);
    let result = llm.call(LlmTask::AnswerEvaluation, &prompt).await;
    let evaluation = evaluation_from_call(result);

    info!(
        "Answer scored {:.1}/10 (source={:?})",
        evaluation.score, evaluation.source
    );
    Ok(evaluation)
}

pub fn evaluation_from_call(result: LlmCallResult) -> EvaluationResult {
    match result {
        LlmCallResult::Success(raw) => resolve_evaluation(&raw),
        LlmCallResult::NoCredentials => basic_evaluation(FallbackReason::NoCredentials),
        LlmCallResult::ProviderFailure(reason) => {
            warn!("Answer evaluation failed ({reason}); using the basic evaluation");
            basic_evaluation(FallbackReason::ProviderFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::interview::models::{QuestionType, ResultSource};

    fn request(answer: &str) -> EvaluationRequest {
        EvaluationRequest {
            question_text: "How do you handle a production outage?".to_string(),
            answer_text: answer.to_string(),
            question_type: QuestionType::Situational,
            resume_text: None,
            job_description: None,
        }
    }

    #[tokio::test]
    async fn test_no_credentials_scores_exactly_seven() {
        let llm = LlmClient::new(LlmConfig::without_credentials()).unwrap();
        let result = evaluate_answer(&llm, &request("I page the on-call and roll back."))
            .await
            .unwrap();
        assert_eq!(result.score, 7.0);
        assert_eq!(result.source, ResultSource::Default);
        assert!(!result.evaluation.is_empty());
    }

    #[tokio::test]
    async fn test_empty_answer_is_rejected() {
        let llm = LlmClient::new(LlmConfig::without_credentials()).unwrap();
        assert!(matches!(
            evaluate_answer(&llm, &request("")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_provider_failure_uses_basic_evaluation() {
        let result = evaluation_from_call(LlmCallResult::ProviderFailure("HTTP 502".into()));
        assert_eq!(result, basic_evaluation(FallbackReason::ProviderFailure));
        assert!(!result.evaluation.contains("API key"));
    }

    #[test]
    fn test_success_is_parsed_and_clamped() {
        let raw = r#"{"score": 11.5, "evaluation": "Thorough", "strengths": "Structure", "improvements": "Metrics"}"#;
        let result = evaluation_from_call(LlmCallResult::Success(raw.to_string()));
        assert_eq!(result.score, 10.0);
        assert_eq!(result.evaluation, "Thorough");
        assert_eq!(result.source, ResultSource::Llm);
    }

    #[test]
    fn test_unparseable_success_still_scores() {
        let result = evaluation_from_call(LlmCallResult::Success("Looks fine to me.".into()));
        assert_eq!(result.source, ResultSource::Salvaged);
        assert!((0.0..=10.0).contains(&result.score));
    }
}
