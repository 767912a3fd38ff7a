//! Interview report: aggregate scores and feedback over a session's answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interview::models::QuestionType;
use crate::interview::prompts::truncate_chars;

const FEEDBACK_ITEM_CHARS: usize = 100;
const FEEDBACK_ITEM_LIMIT: usize = 5;
const RECOMMENDATION_FOCUS_CHARS: usize = 200;
const COMMUNICATION_SCORE_MAX: f64 = 10.0;

/// One answered question as stored by the persistence layer.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportAnswer {
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub answer_text: String,
    #[serde(default)]
    pub evaluated: bool,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub strengths: String,
    #[serde(default)]
    pub improvements: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub answers: Vec<ReportAnswer>,
    /// Questions in the session; defaults to the number of answers.
    #[serde(default)]
    pub total_questions: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewReport {
    pub overall_score: f64,
    pub technical_score: f64,
    pub behavioral_score: f64,
    pub communication_score: f64,
    pub summary: String,
    pub strengths: String,
    pub areas_for_improvement: String,
    pub recommendations: String,
    pub total_questions: usize,
    pub questions_answered: usize,
    pub average_answer_length: f64,
    pub generated_at: DateTime<Utc>,
}

/// Builds the report. Only evaluated answers are used when any exist;
/// otherwise every answer counts with a score of 0.
pub fn build_report(request: &ReportRequest) -> InterviewReport {
    let total_questions = request.total_questions.unwrap_or(request.answers.len());

    if request.answers.is_empty() {
        return InterviewReport {
            overall_score: 0.0,
            technical_score: 0.0,
            behavioral_score: 0.0,
            communication_score: 0.0,
            summary: "No answers submitted for this interview.".to_string(),
            strengths: String::new(),
            areas_for_improvement: String::new(),
            recommendations: "Please answer at least one question to receive a report.".to_string(),
            total_questions,
            questions_answered: 0,
            average_answer_length: 0.0,
            generated_at: Utc::now(),
        };
    }

    let any_evaluated = request.answers.iter().any(|a| a.evaluated);
    let answers: Vec<&ReportAnswer> = request
        .answers
        .iter()
        .filter(|a| a.evaluated || !any_evaluated)
        .collect();

    let overall_score = average_score(answers.iter().copied());
    let technical_score = average_score(
        answers
            .iter()
            .copied()
            .filter(|a| a.question_type == QuestionType::Technical),
    );
    let behavioral_score = average_score(
        answers
            .iter()
            .copied()
            .filter(|a| a.question_type == QuestionType::Behavioral),
    );

    let average_answer_length = answers
        .iter()
        .map(|a| a.answer_text.chars().count() as f64)
        .sum::<f64>()
        / answers.len() as f64;
    let communication_score = (average_answer_length / 100.0 * 2.0).min(COMMUNICATION_SCORE_MAX);

    let strengths = join_feedback(answers.iter().map(|a| a.strengths.as_str()), any_evaluated)
        .unwrap_or_else(|| "Interview session completed successfully.".to_string());
    let areas_for_improvement =
        join_feedback(answers.iter().map(|a| a.improvements.as_str()), any_evaluated)
            .unwrap_or_else(|| {
                "Complete the interview by answering all questions to get detailed feedback."
                    .to_string()
            });

    let (summary, recommendations) = if any_evaluated {
        (
            format!(
                "Interview completed with {} questions answered. Average score: {overall_score:.1}/10.",
                answers.len()
            ),
            format!(
                "Based on the interview, focus on: {}",
                truncate_chars(&areas_for_improvement, RECOMMENDATION_FOCUS_CHARS)
            ),
        )
    } else {
        (
            format!(
                "Interview completed with {} questions answered. Answers are pending evaluation.",
                answers.len()
            ),
            "Please answer all questions to receive detailed feedback and recommendations."
                .to_string(),
        )
    };

    InterviewReport {
        overall_score,
        technical_score,
        behavioral_score,
        communication_score,
        summary,
        strengths,
        areas_for_improvement,
        recommendations,
        total_questions,
        questions_answered: answers.len(),
        average_answer_length,
        generated_at: Utc::now(),
    }
}

/// Mean score; unevaluated answers count as 0. Empty input is 0.
fn average_score<'a>(answers: impl Iterator<Item = &'a ReportAnswer>) -> f64 {
    let (total, count) = answers.fold((0.0, 0usize), |(total, count), a| {
        (total + if a.evaluated { a.score } else { 0.0 }, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// First five distinct non-empty items, each cut to 100 chars, joined with ". ".
fn join_feedback<'a>(items: impl Iterator<Item = &'a str>, evaluated: bool) -> Option<String> {
    if !evaluated {
        return None;
    }
    let mut picked: Vec<&str> = Vec::new();
    for item in items.map(str::trim).filter(|s| !s.is_empty()) {
        let item = truncate_chars(item, FEEDBACK_ITEM_CHARS);
        if !picked.contains(&item) {
            picked.push(item);
        }
        if picked.len() == FEEDBACK_ITEM_LIMIT {
            break;
        }
    }
    (!picked.is_empty()).then(|| picked.join(". "))
}
