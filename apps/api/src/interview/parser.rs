//! Tolerant parsing of raw model output.
//!
//! Models wrap JSON in markdown fences, return objects where arrays were asked
//! for, or answer in prose. Every parse reports a `ParseOutcome` so callers
//! decide explicitly how to degrade:
//!
//! 1. ```` ```json ```` fence → its content; else the first ```` ``` ```` fence;
//!    else the whole text
//! 2. strict JSON parse
//! 3. shape check and field coercion for the task
//! 4. on failure: line-based salvage (questions) or a generic result (evaluation, matching)

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use crate::interview::fallback::{self, pad_from_bank, round2, weighted_overall};
use crate::interview::mcq::McqFields;
use crate::interview::models::{
    Difficulty, EvaluationResult, GeneratedQuestion, MatchResult, QuestionType, ResultSource,
};

const EVALUATION_SCORE_MAX: f64 = 10.0;
const MATCH_SCORE_MAX: f64 = 100.0;
const DEFAULT_EVALUATION_SCORE: f64 = 7.0;
/// Salvaged lines must be longer than this to count as a question.
const MIN_SALVAGED_QUESTION_CHARS: usize = 20;
/// How much of a bad response is kept in the logs.
const LOG_EXCERPT_CHARS: usize = 200;

const TEXT_KEYS: &[&str] = &["question_text", "question", "text"];
const TYPE_KEYS: &[&str] = &["question_type", "type"];
const DIFFICULTY_KEYS: &[&str] = &["difficulty", "level"];

const MATCH_SCORE_KEYS: [&str; 4] = [
    "overall_score",
    "skills_score",
    "experience_score",
    "education_score",
];

/// Result of parsing one model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Ok(T),
    /// The extracted text was not valid JSON. Carries the raw reply.
    MalformedJson(String),
    /// Valid JSON, but not the shape the task expects. Carries the raw reply.
    WrongShape(String),
}

impl<T> ParseOutcome<T> {
    fn and_then<U>(
        self,
        f: impl FnOnce(T, String) -> ParseOutcome<U>,
        raw: &str,
    ) -> ParseOutcome<U> {
        match self {
            ParseOutcome::Ok(value) => f(value, raw.to_string()),
            ParseOutcome::MalformedJson(raw) => ParseOutcome::MalformedJson(raw),
            ParseOutcome::WrongShape(raw) => ParseOutcome::WrongShape(raw),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fence extraction and JSON
// ────────────────────────────────────────────────────────────────────────────

/// Returns the JSON candidate inside a reply: the first ```` ```json ```` block,
/// else the first fenced block of any kind, else the whole trimmed text.
/// An unterminated fence runs to the end of the text.
pub fn extract_json_block(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        return fenced_body(&text[start + "```json".len()..]);
    }
    if let Some(start) = text.find("```") {
        let body = fenced_body(&text[start + 3..]);
        return strip_language_tag(body);
    }
    text.trim()
}

fn fenced_body(after_open: &str) -> &str {
    match after_open.find("```") {
        Some(end) => after_open[..end].trim(),
        None => after_open.trim(),
    }
}

/// Drops a leading info-string line such as `javascript` from an untagged fence.
fn strip_language_tag(body: &str) -> &str {
    match body.split_once('\n') {
        Some((first, rest))
            if !first.is_empty() && first.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            rest.trim()
        }
        _ => body,
    }
}

pub fn parse_json(raw: &str) -> ParseOutcome<Value> {
    match serde_json::from_str::<Value>(extract_json_block(raw)) {
        Ok(value) => ParseOutcome::Ok(value),
        Err(_) => ParseOutcome::MalformedJson(raw.to_string()),
    }
}

fn excerpt(raw: &str) -> &str {
    crate::interview::prompts::truncate_chars(raw, LOG_EXCERPT_CHARS)
}

// ────────────────────────────────────────────────────────────────────────────
// Questions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuestions {
    pub questions: Vec<GeneratedQuestion>,
    pub source: ResultSource,
    pub recycled_from_bank: usize,
}

/// Parses a question-generation reply into exactly `count` questions.
///
/// A well-formed reply is truncated or padded from the default bank; anything
/// else goes through line salvage, also padded from the bank.
pub fn resolve_questions(raw: &str, count: usize) -> ParsedQuestions {
    match parse_question_list(raw, count) {
        ParseOutcome::Ok(mut questions) => {
            let recycled_from_bank = pad_from_bank(&mut questions, count);
            ParsedQuestions {
                questions,
                source: ResultSource::Llm,
                recycled_from_bank,
            }
        }
        ParseOutcome::MalformedJson(raw) | ParseOutcome::WrongShape(raw) => {
            warn!(
                "Question reply was not a usable JSON list; salvaging from text: {:?}",
                excerpt(&raw)
            );
            let mut questions = salvage_questions_from_text(&raw, count);
            let recycled_from_bank = pad_from_bank(&mut questions, count);
            ParsedQuestions {
                questions,
                source: ResultSource::Salvaged,
                recycled_from_bank,
            }
        }
    }
}

/// Strict step: JSON list (or `{"questions": [...]}`) whose first `count`
/// items all coerce into questions.
pub fn parse_question_list(raw: &str, count: usize) -> ParseOutcome<Vec<GeneratedQuestion>> {
    parse_json(raw).and_then(
        |value, raw| {
            let items = match value {
                Value::Array(items) => items,
                Value::Object(mut map) => match map.remove("questions") {
                    Some(Value::Array(items)) => items,
                    _ => return ParseOutcome::WrongShape(raw),
                },
                _ => return ParseOutcome::WrongShape(raw),
            };
            if items.is_empty() {
                return ParseOutcome::WrongShape(raw);
            }
            let coerced: Option<Vec<GeneratedQuestion>> =
                items.iter().take(count).map(coerce_question).collect();
            match coerced {
                Some(questions) => ParseOutcome::Ok(questions),
                None => ParseOutcome::WrongShape(raw),
            }
        },
        raw,
    )
}

/// Coerces one list item. Plain strings become general/medium questions;
/// objects need a non-empty text under one of the accepted keys.
pub fn coerce_question(item: &Value) -> Option<GeneratedQuestion> {
    match item {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| {
                GeneratedQuestion::open(text, QuestionType::General, Difficulty::Medium)
            })
        }
        Value::Object(map) => {
            let text = first_string(map, TEXT_KEYS)?;
            let question_type = first_string(map, TYPE_KEYS)
                .map(QuestionType::parse_lenient)
                .unwrap_or_default();
            let difficulty = first_string(map, DIFFICULTY_KEYS)
                .map(Difficulty::parse_lenient)
                .unwrap_or_default();

            let mcq = McqFields::normalize(
                map.get("is_mcq").and_then(Value::as_bool).unwrap_or(false),
                string_list(map.get("options")),
                map.get("correct_answer").and_then(Value::as_str),
            );

            Some(GeneratedQuestion {
                text: text.to_string(),
                question_type,
                difficulty,
                is_mcq: mcq.is_mcq,
                options: mcq.options,
                correct_answer: mcq.correct_answer,
                skill_tags: string_list(map.get("skill_tags")),
            })
        }
        _ => None,
    }
}

fn first_string<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| map.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn list_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        // Bullets, then optional "Q"/"Question" with a number, then "1." / "2)" / "3:" / "4 -".
        Regex::new(r"^(?:[-*•]+\s*)*(?:(?i:q(?:uestion)?)\s*\d+\s*[.):\-]*\s*|\d+\s*[.):\-]+\s*)?")
            .unwrap_or_else(|_| unreachable!("list marker pattern is a constant"))
    })
}

/// Removes leading bullet and numbering markers from one line.
pub fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    match list_marker().find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line,
    }
}

fn question_field() -> &'static Regex {
    static FIELD: OnceLock<Regex> = OnceLock::new();
    FIELD.get_or_init(|| {
        Regex::new(r#""(?:question_text|question|text)"\s*:\s*"((?:[^"\\]|\\.)*)""#)
            .unwrap_or_else(|_| unreachable!("question field pattern is a constant"))
    })
}

/// Lines cut from broken JSON keep only the question string itself.
fn unwrap_json_fragment(line: &str) -> String {
    let Some(captured) = question_field().captures(line).and_then(|c| c.get(1)) else {
        return line.to_string();
    };
    let escaped = captured.as_str();
    serde_json::from_str::<String>(&format!("\"{escaped}\""))
        .unwrap_or_else(|_| escaped.to_string())
        .trim()
        .to_string()
}

/// Picks question-like lines out of free text: longer than 20 characters and
/// containing a `?`. Returns at most `count` questions, possibly fewer.
pub fn salvage_questions_from_text(text: &str, count: usize) -> Vec<GeneratedQuestion> {
    text.lines()
        .map(|line| unwrap_json_fragment(strip_list_marker(line)))
        .filter(|line| line.chars().count() > MIN_SALVAGED_QUESTION_CHARS && line.contains('?'))
        .take(count)
        .map(|line| GeneratedQuestion::open(line, QuestionType::General, Difficulty::Medium))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

/// Parses an evaluation reply; a bad reply yields the generic textual result.
pub fn resolve_evaluation(raw: &str) -> EvaluationResult {
    match parse_evaluation(raw) {
        ParseOutcome::Ok(result) => result,
        ParseOutcome::MalformedJson(raw) | ParseOutcome::WrongShape(raw) => {
            warn!("Evaluation reply could not be parsed: {:?}", excerpt(&raw));
            fallback::unparsed_evaluation()
        }
    }
}

pub fn parse_evaluation(raw: &str) -> ParseOutcome<EvaluationResult> {
    parse_json(raw).and_then(
        |value, raw| {
            let Value::Object(map) = value else {
                return ParseOutcome::WrongShape(raw);
            };
            let score = match number_field(&map, "score") {
                Field::Number(score) => score,
                Field::Missing => DEFAULT_EVALUATION_SCORE,
                Field::Invalid => return ParseOutcome::WrongShape(raw),
            };
            ParseOutcome::Ok(EvaluationResult {
                score: clamp_score(score, EVALUATION_SCORE_MAX),
                evaluation: text_field(&map, "evaluation"),
                strengths: text_field(&map, "strengths"),
                improvements: text_field(&map, "improvements"),
                source: ResultSource::Llm,
            })
        },
        raw,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// ATS matching
// ────────────────────────────────────────────────────────────────────────────

/// Parses an ATS reply. A bad reply keeps whatever scores can be read from the
/// raw text and fills the prose fields with a generic explanation.
pub fn resolve_match(raw: &str) -> MatchResult {
    match parse_match(raw) {
        ParseOutcome::Ok(result) => result,
        ParseOutcome::MalformedJson(raw) | ParseOutcome::WrongShape(raw) => {
            warn!("ATS reply could not be parsed: {:?}", excerpt(&raw));
            salvage_match(&raw)
        }
    }
}

pub fn parse_match(raw: &str) -> ParseOutcome<MatchResult> {
    parse_json(raw).and_then(
        |value, raw| {
            let Value::Object(map) = value else {
                return ParseOutcome::WrongShape(raw);
            };

            let mut scores = [None; 4];
            for (slot, key) in scores.iter_mut().zip(MATCH_SCORE_KEYS) {
                match number_field(&map, key) {
                    Field::Number(n) => *slot = Some(clamp_score(n, MATCH_SCORE_MAX)),
                    Field::Missing => {}
                    Field::Invalid => return ParseOutcome::WrongShape(raw),
                }
            }
            if scores.iter().all(Option::is_none) {
                return ParseOutcome::WrongShape(raw);
            }

            let mut result = scores_to_result(scores);
            result.match_analysis = text_field(&map, "match_analysis");
            result.strengths = text_field(&map, "strengths");
            result.gaps = text_field(&map, "gaps");
            result.recommendations = text_field(&map, "recommendations");
            result.source = ResultSource::Llm;
            ParseOutcome::Ok(result)
        },
        raw,
    )
}

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?i)"?(overall_score|skills_score|experience_score|education_score)"?\s*[:=]\s*"?(-?\d+(?:\.\d+)?)"#,
        )
        .unwrap_or_else(|_| unreachable!("score pattern is a constant"))
    })
}

/// Generic ATS result for an unreadable reply, keeping any `"<field>": <number>`
/// scores that appear in the text.
pub fn salvage_match(raw: &str) -> MatchResult {
    let mut scores = [None; 4];
    for caps in score_pattern().captures_iter(raw) {
        let key = caps[1].to_ascii_lowercase();
        let Some(idx) = MATCH_SCORE_KEYS.iter().position(|k| *k == key) else {
            continue;
        };
        if scores[idx].is_none() {
            if let Ok(n) = caps[2].parse::<f64>() {
                scores[idx] = Some(clamp_score(n, MATCH_SCORE_MAX));
            }
        }
    }

    let mut result = scores_to_result(scores);
    result.match_analysis =
        "The AI response could not be fully parsed; scores were recovered where present."
            .to_string();
    result.strengths = "Detailed strengths are unavailable for this match.".to_string();
    result.gaps = "Detailed gap analysis is unavailable for this match.".to_string();
    result.recommendations = "Re-run the match to obtain a full analysis.".to_string();
    result.source = ResultSource::Salvaged;
    result
}

/// `[overall, skills, experience, education]`; a missing overall is derived
/// from the weights, other missing scores are 0.
fn scores_to_result(scores: [Option<f64>; 4]) -> MatchResult {
    let skills = scores[1].unwrap_or(0.0);
    let experience = scores[2].unwrap_or(0.0);
    let education = scores[3].unwrap_or(0.0);
    let overall = scores[0].unwrap_or_else(|| {
        clamp_score(
            round2(weighted_overall(skills, experience, education)),
            MATCH_SCORE_MAX,
        )
    });
    MatchResult {
        overall_score: overall,
        skills_score: skills,
        experience_score: experience,
        education_score: education,
        match_analysis: String::new(),
        strengths: String::new(),
        gaps: String::new(),
        recommendations: String::new(),
        source: ResultSource::Salvaged,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

enum Field {
    Number(f64),
    Missing,
    Invalid,
}

/// Numbers, and strings holding a number ("8", "7.5/10" is invalid).
fn number_field(map: &Map<String, Value>, key: &str) -> Field {
    match map.get(key) {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::Number(n)) => n.as_f64().map(Field::Number).unwrap_or(Field::Invalid),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Field::Number)
            .unwrap_or(Field::Invalid),
        Some(_) => Field::Invalid,
    }
}

/// Strings as-is; lists of strings joined with "; "; anything else empty.
fn text_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    }
}

pub fn clamp_score(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}
