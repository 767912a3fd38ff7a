//! Answer submission.
//!
//! 1. MCQ question with a selected letter → letter comparison, no model call
//! 2. otherwise transcribe the audio if any (failure is logged and ignored)
//! 3. open-ended question with non-empty text → answer evaluation

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::evaluation::evaluate_answer;
use crate::interview::mcq::check_answer;
use crate::interview::models::{EvaluationRequest, EvaluationResult, GeneratedQuestion, McqOption};
use crate::interview::transcription::Transcriber;
use crate::llm_client::LlmClient;

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerSubmission {
    pub question: GeneratedQuestion,
    #[serde(default)]
    pub answer_text: Option<String>,
    #[serde(default)]
    pub selected_option: Option<String>,
    #[serde(default)]
    pub audio_locator: Option<String>,
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub answer_text: String,
    pub transcribed: bool,
    pub selected_option: Option<McqOption>,
    /// Only set for MCQ answers.
    pub is_correct: Option<bool>,
    pub score: f64,
    pub evaluation: Option<EvaluationResult>,
    pub evaluated: bool,
}

pub async fn submit_answer(
    llm: &LlmClient,
    transcriber: &dyn Transcriber,
    submission: AnswerSubmission,
) -> Result<AnswerOutcome, AppError> {
    let AnswerSubmission {
        question,
        answer_text,
        selected_option,
        audio_locator,
        resume_text,
        job_description,
    } = submission;
    let mut answer_text = answer_text.unwrap_or_default();

    let selected = selected_option
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if let (true, Some(selected)) = (question.is_mcq, selected) {
        let outcome = check_answer(&question, selected)?;
        info!("MCQ answer checked: correct={}", outcome.is_correct);
        return Ok(AnswerOutcome {
            answer_text,
            transcribed: false,
            selected_option: McqOption::from_letter(selected),
            is_correct: Some(outcome.is_correct),
            score: outcome.score,
            evaluation: None,
            evaluated: true,
        });
    }

    let mut transcribed = false;
    if let Some(locator) = audio_locator.as_deref().filter(|l| !l.trim().is_empty()) {
        match transcriber.transcribe(locator).await {
            Ok(text) => {
                answer_text = text;
                transcribed = true;
            }
            Err(e) => warn!("Transcription of {locator} failed: {e}; keeping submitted text"),
        }
    }

    if question.is_mcq || answer_text.trim().is_empty() {
        return Ok(AnswerOutcome {
            answer_text,
            transcribed,
            selected_option: None,
            is_correct: None,
            score: 0.0,
            evaluation: None,
            evaluated: false,
        });
    }

    let request = EvaluationRequest {
        question_text: question.text,
        answer_text,
        question_type: question.question_type,
        resume_text,
        job_description,
    };
    let evaluation = evaluate_answer(llm, &request).await?;

    Ok(AnswerOutcome {
        answer_text: request.answer_text,
        transcribed,
        selected_option: None,
        is_correct: None,
        score: evaluation.score,
        evaluation: Some(evaluation),
        evaluated: true,
    })
}
