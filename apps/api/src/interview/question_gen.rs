//! Question generation: prompt → model → tolerant parse → bank fallback.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::fallback::default_questions;
use crate::interview::models::{
    GeneratedQuestion, GeneratedQuestions, GenerationRequest, ResultSource,
};
use crate::interview::parser::resolve_questions;
use crate::interview::prompts::build_question_prompt;
use crate::llm_client::{LlmCallResult, LlmClient, LlmTask};

/// Produces exactly `request.question_count` questions.
///
/// Only an out-of-range count is an error; every model or parse failure
/// degrades to salvaged or default questions.
pub async fn generate_questions(
    llm: &LlmClient,
    request: &GenerationRequest,
) -> Result<GeneratedQuestions, AppError> {
    request.validate()?;
    let count = request.count();

    info!(
        "Generating {count} interview questions (job_title={:?}, experience_level={:?})",
        request.job_title, request.experience_level
    );

    let prompt = build_question_prompt(request);
    let result = llm.call(LlmTask::QuestionGeneration, &prompt).await;

    let mut generated = questions_from_call(result, count, llm.model());
    apply_default_skill_tags(&mut generated.questions, &request.skill_list());

    info!(
        "Generated {} questions (source={:?}, recycled_from_bank={})",
        generated.questions.len(),
        generated.source,
        generated.recycled_from_bank
    );
    Ok(generated)
}

/// Maps one call result onto a question set of exactly `count` entries.
pub fn questions_from_call(
    result: LlmCallResult,
    count: usize,
    model: String,
) -> GeneratedQuestions {
    match result {
        LlmCallResult::Success(raw) => {
            let parsed = resolve_questions(&raw, count);
            GeneratedQuestions {
                questions: parsed.questions,
                source: parsed.source,
                model: Some(model),
                recycled_from_bank: parsed.recycled_from_bank,
            }
        }
        LlmCallResult::NoCredentials => {
            info!("No LLM configured; using the default question bank");
            bank_questions(count)
        }
        LlmCallResult::ProviderFailure(reason) => {
            warn!("Question generation failed ({reason}); using the default question bank");
            bank_questions(count)
        }
    }
}

fn bank_questions(count: usize) -> GeneratedQuestions {
    let (questions, recycled_from_bank) = default_questions(count);
    GeneratedQuestions {
        questions,
        source: ResultSource::Default,
        model: None,
        recycled_from_bank,
    }
}

/// Questions without their own tags inherit the request's required skills.
pub fn apply_default_skill_tags(questions: &mut [GeneratedQuestion], skills: &[String]) {
    if skills.is_empty() {
        return;
    }
    for question in questions.iter_mut().filter(|q| q.skill_tags.is_empty()) {
        question.skill_tags = skills.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::interview::fallback::DEFAULT_QUESTION_BANK;
    use crate::interview::models::{Difficulty, QuestionType};

    fn offline_client() -> LlmClient {
        LlmClient::new(LlmConfig::without_credentials()).unwrap()
    }

    fn request(count: u8) -> GenerationRequest {
        GenerationRequest {
            question_count: i64::from(count),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_credentials_returns_bank_prefix() {
        let llm = offline_client();
        let generated = generate_questions(&llm, &request(3)).await.unwrap();

        assert_eq!(generated.source, ResultSource::Default);
        assert!(generated.model.is_none());
        assert_eq!(generated.questions.len(), 3);
        let bank = DEFAULT_QUESTION_BANK.iter();
        for (q, (text, qt, d)) in generated.questions.iter().zip(bank) {
            assert_eq!(q.text, *text);
            assert_eq!(q.question_type, *qt);
            assert_eq!(q.difficulty, *d);
        }
    }

    #[tokio::test]
    async fn test_fallback_is_idempotent() {
        let llm = offline_client();
        let first = generate_questions(&llm, &request(5)).await.unwrap();
        let second = generate_questions(&llm, &request(5)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_every_valid_count_is_honoured() {
        let llm = offline_client();
        for count in 1..=20u8 {
            let generated = generate_questions(&llm, &request(count)).await.unwrap();
            assert_eq!(generated.questions.len(), usize::from(count));
            assert!(generated.questions.iter().all(|q| !q.text.trim().is_empty()));
        }
    }

    #[tokio::test]
    async fn test_count_past_bank_reports_recycling() {
        let llm = offline_client();
        let generated = generate_questions(&llm, &request(12)).await.unwrap();
        assert_eq!(generated.recycled_from_bank, 4);
    }

    #[tokio::test]
    async fn test_invalid_count_is_rejected() {
        let llm = offline_client();
        assert!(matches!(
            generate_questions(&llm, &request(0)).await,
            Err(AppError::Validation(_))
        ));
        assert!(generate_questions(&llm, &request(21)).await.is_err());
    }

    #[tokio::test]
    async fn test_required_skills_become_tags() {
        let llm = offline_client();
        let req = GenerationRequest {
            required_skills: Some("Rust, Tokio\nSQL".to_string()),
            ..request(2)
        };
        let generated = generate_questions(&llm, &req).await.unwrap();
        for q in &generated.questions {
            assert_eq!(q.skill_tags, vec!["Rust", "Tokio", "SQL"]);
        }
    }

    #[test]
    fn test_provider_failure_uses_bank() {
        let generated =
            questions_from_call(LlmCallResult::ProviderFailure("timeout".into()), 2, "m".into());
        assert_eq!(generated.source, ResultSource::Default);
        assert_eq!(generated.questions[0].text, DEFAULT_QUESTION_BANK[0].0);
    }

    #[test]
    fn test_success_records_model() {
        let raw = r#"[{"question_text": "How does borrowing work?", "question_type": "technical", "difficulty": "hard"}]"#;
        let generated = questions_from_call(
            LlmCallResult::Success(raw.to_string()),
            1,
            "openrouter/gpt-4o".to_string(),
        );
        assert_eq!(generated.source, ResultSource::Llm);
        assert_eq!(generated.model.as_deref(), Some("openrouter/gpt-4o"));
        assert_eq!(generated.questions[0].question_type, QuestionType::Technical);
        assert_eq!(generated.questions[0].difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_own_tags_are_kept() {
        let mut questions = vec![GeneratedQuestion {
            skill_tags: vec!["Kafka".to_string()],
            ..GeneratedQuestion::open(
                "Explain consumer groups?",
                QuestionType::Technical,
                Difficulty::Medium,
            )
        }];
        apply_default_skill_tags(&mut questions, &["Rust".to_string()]);
        assert_eq!(questions[0].skill_tags, vec!["Kafka"]);
    }
}
