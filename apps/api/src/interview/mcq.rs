//! Multiple-choice handling. MCQ answers are scored by letter comparison and
//! never go through the model.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::models::{GeneratedQuestion, McqOption};

pub const MCQ_OPTION_COUNT: usize = 4;
pub const MCQ_CORRECT_SCORE: f64 = 10.0;
pub const MCQ_WRONG_SCORE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McqOutcome {
    pub is_correct: bool,
    pub score: f64,
}

/// Case-insensitive exact comparison of the selected letter with the stored one.
pub fn score_mcq(selected: &str, correct: &str) -> McqOutcome {
    let is_correct = selected.trim().eq_ignore_ascii_case(correct.trim());
    McqOutcome {
        is_correct,
        score: if is_correct {
            MCQ_CORRECT_SCORE
        } else {
            MCQ_WRONG_SCORE
        },
    }
}

/// Scores a selection against a stored question. Fails when the question is not
/// multiple-choice or the selection is not one of A–D.
pub fn check_answer(question: &GeneratedQuestion, selected: &str) -> Result<McqOutcome, AppError> {
    let correct = match (question.is_mcq, question.correct_answer) {
        (true, Some(correct)) => correct,
        _ => {
            return Err(AppError::Validation(
                "question is not a multiple-choice question".to_string(),
            ))
        }
    };
    if McqOption::from_letter(selected).is_none() {
        return Err(AppError::Validation(format!(
            "selected_option must be one of A, B, C, D; got {selected:?}"
        )));
    }
    Ok(score_mcq(selected, correct.as_str()))
}

/// MCQ fields of a stored question, normalised.
///
/// A question stays multiple-choice only with at least 4 usable options; extra
/// options are dropped and an unreadable correct letter becomes `A`.
#[derive(Debug, Clone, PartialEq)]
pub struct McqFields {
    pub is_mcq: bool,
    pub options: Vec<String>,
    pub correct_answer: Option<McqOption>,
}

impl McqFields {
    pub fn normalize(is_mcq: bool, options: Vec<String>, correct_answer: Option<&str>) -> Self {
        let options: Vec<String> = options
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if !is_mcq || options.len() < MCQ_OPTION_COUNT {
            return Self::open();
        }

        Self {
            is_mcq: true,
            options: options.into_iter().take(MCQ_OPTION_COUNT).collect(),
            correct_answer: Some(
                correct_answer
                    .and_then(McqOption::from_letter)
                    .unwrap_or(McqOption::A),
            ),
        }
    }

    pub fn open() -> Self {
        Self {
            is_mcq: false,
            options: Vec::new(),
            correct_answer: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::{Difficulty, QuestionType};

    fn options(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Option {i}")).collect()
    }

    fn mcq_question(correct: McqOption) -> GeneratedQuestion {
        GeneratedQuestion {
            is_mcq: true,
            options: options(4),
            correct_answer: Some(correct),
            ..GeneratedQuestion::open(
                "Which is a Rust smart pointer?",
                QuestionType::Technical,
                Difficulty::Easy,
            )
        }
    }

    #[test]
    fn test_lowercase_selection_matches() {
        let outcome = score_mcq("b", "B");
        assert!(outcome.is_correct);
        assert_eq!(outcome.score, 10.0);
    }

    #[test]
    fn test_wrong_selection_scores_zero() {
        let outcome = score_mcq("C", "B");
        assert!(!outcome.is_correct);
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn test_check_answer_against_stored_question() {
        let question = mcq_question(McqOption::B);
        assert!(check_answer(&question, "b").unwrap().is_correct);
        assert!(!check_answer(&question, "D").unwrap().is_correct);
    }

    #[test]
    fn test_check_answer_rejects_open_question() {
        let question = GeneratedQuestion::open(
            "Tell me about yourself.",
            QuestionType::General,
            Difficulty::Easy,
        );
        assert!(matches!(
            check_answer(&question, "A"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_check_answer_rejects_unknown_letter() {
        let question = mcq_question(McqOption::A);
        assert!(check_answer(&question, "E").is_err());
    }

    #[test]
    fn test_normalize_keeps_first_four_options() {
        let fields = McqFields::normalize(true, options(5), Some("c"));
        assert!(fields.is_mcq);
        assert_eq!(fields.options.len(), 4);
        assert_eq!(fields.correct_answer, Some(McqOption::C));
    }

    #[test]
    fn test_normalize_invalid_letter_defaults_to_a() {
        let fields = McqFields::normalize(true, options(4), Some("Z"));
        assert_eq!(fields.correct_answer, Some(McqOption::A));
        let fields = McqFields::normalize(true, options(4), None);
        assert_eq!(fields.correct_answer, Some(McqOption::A));
    }

    #[test]
    fn test_normalize_too_few_options_demotes_to_open() {
        let fields = McqFields::normalize(true, options(3), Some("B"));
        assert_eq!(fields, McqFields::open());
    }

    #[test]
    fn test_normalize_blank_options_do_not_count() {
        let mut opts = options(3);
        opts.push("   ".to_string());
        let fields = McqFields::normalize(true, opts, Some("B"));
        assert!(!fields.is_mcq);
    }

    #[test]
    fn test_normalize_non_mcq_drops_options() {
        let fields = McqFields::normalize(false, options(4), Some("B"));
        assert!(!fields.is_mcq);
        assert!(fields.options.is_empty());
        assert!(fields.correct_answer.is_none());
    }
}
