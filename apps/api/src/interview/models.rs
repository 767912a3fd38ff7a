use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AppError;

pub const MIN_QUESTION_COUNT: i64 = 1;
pub const MAX_QUESTION_COUNT: i64 = 20;
const DEFAULT_QUESTION_COUNT: i64 = 5;

/// Deserialises through `parse_lenient`: any casing is accepted and unknown
/// values fall back to the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Technical,
    Behavioral,
    Situational,
    #[default]
    General,
}

impl QuestionType {
    /// Case-insensitive; anything unrecognised is `General`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "technical" => QuestionType::Technical,
            "behavioral" | "behavioural" => QuestionType::Behavioral,
            "situational" => QuestionType::Situational,
            _ => QuestionType::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Technical => "technical",
            QuestionType::Behavioral => "behavioral",
            QuestionType::Situational => "situational",
            QuestionType::General => "general",
        }
    }
}

impl<'de> Deserialize<'de> for QuestionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Deserialises leniently, like `QuestionType`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive; anything unrecognised is `Medium`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// A multiple-choice option letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum McqOption {
    A,
    B,
    C,
    D,
}

impl McqOption {
    /// Accepts a single letter in either case, surrounding whitespace allowed.
    pub fn from_letter(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(McqOption::A),
            "B" => Some(McqOption::B),
            "C" => Some(McqOption::C),
            "D" => Some(McqOption::D),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            McqOption::A => "A",
            McqOption::B => "B",
            McqOption::C => "C",
            McqOption::D => "D",
        }
    }
}

/// Which tier of the pipeline produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Parsed from a well-formed model response.
    Llm,
    /// Recovered from a malformed model response.
    Salvaged,
    /// Deterministic fallback; the model was unavailable.
    Default,
}

// ────────────────────────────────────────────────────────────────────────────
// Question generation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    /// Comma- or newline-separated.
    #[serde(default)]
    pub required_skills: Option<String>,
    /// `entry` | `mid` | `senior` | `executive`; other values pass through verbatim.
    #[serde(default)]
    pub experience_level: Option<String>,
    /// Signed so that out-of-range values reach `validate` instead of failing
    /// deserialisation.
    #[serde(default = "default_question_count")]
    pub question_count: i64,
}

fn default_question_count() -> i64 {
    DEFAULT_QUESTION_COUNT
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&self.question_count) {
            return Err(AppError::Validation(format!(
                "question_count must be between {MIN_QUESTION_COUNT} and {MAX_QUESTION_COUNT}, got {}",
                self.question_count
            )));
        }
        Ok(())
    }

    /// The validated count. Zero for an out-of-range value.
    pub fn count(&self) -> usize {
        usize::try_from(self.question_count)
            .ok()
            .filter(|_| self.validate().is_ok())
            .unwrap_or(0)
    }

    pub fn skill_list(&self) -> Vec<String> {
        self.required_skills
            .as_deref()
            .map(split_skills)
            .unwrap_or_default()
    }
}

/// A question ready to hand to the persistence layer.
///
/// Invariant: `options` is empty or has exactly 4 entries, and
/// `correct_answer` is `Some` iff `is_mcq`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub is_mcq: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<McqOption>,
    #[serde(default)]
    pub skill_tags: Vec<String>,
}

impl GeneratedQuestion {
    pub fn open(
        text: impl Into<String>,
        question_type: QuestionType,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            text: text.into(),
            question_type,
            difficulty,
            is_mcq: false,
            options: Vec::new(),
            correct_answer: None,
            skill_tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedQuestions {
    pub questions: Vec<GeneratedQuestion>,
    pub source: ResultSource,
    /// Set when the questions came back from a model call.
    pub model: Option<String>,
    /// How many trailing entries repeat the default bank because the
    /// request asked for more questions than the bank holds.
    pub recycled_from_bank: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Answer evaluation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub question_text: String,
    pub answer_text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

impl EvaluationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.question_text.trim().is_empty() {
            return Err(AppError::Validation(
                "question_text cannot be empty".to_string(),
            ));
        }
        if self.answer_text.trim().is_empty() {
            return Err(AppError::Validation("answer_text cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Always within 0.0 – 10.0.
    pub score: f64,
    pub evaluation: String,
    pub strengths: String,
    pub improvements: String,
    pub source: ResultSource,
}

// ────────────────────────────────────────────────────────────────────────────
// ATS matching
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub job_description_text: String,
    pub resume_text: String,
    #[serde(default)]
    pub required_skills: String,
    #[serde(default)]
    pub job_title: String,
}

impl MatchRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.job_description_text.trim().is_empty() {
            return Err(AppError::Validation(
                "job_description_text cannot be empty".to_string(),
            ));
        }
        if self.resume_text.trim().is_empty() {
            return Err(AppError::Validation("resume_text cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub overall_score: f64,        // 0 – 100
    pub skills_score: f64,         // 0 – 100
    pub experience_score: f64,     // 0 – 100
    pub education_score: f64,      // 0 – 100
    pub match_analysis: String,
    pub strengths: String,
    pub gaps: String,
    pub recommendations: String,
    pub source: ResultSource,
}

/// One job description matched against several candidates' résumés.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchMatchRequest {
    pub job_description_text: String,
    #[serde(default)]
    pub required_skills: String,
    #[serde(default)]
    pub job_title: String,
    pub resumes: Vec<CandidateResume>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateResume {
    pub resume_id: String,
    #[serde(default)]
    pub resume_text: String,
}

impl BatchMatchRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.job_description_text.trim().is_empty() {
            return Err(AppError::Validation(
                "job_description_text cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The single-résumé request for one candidate.
    pub fn for_candidate(&self, candidate: &CandidateResume) -> MatchRequest {
        MatchRequest {
            job_description_text: self.job_description_text.clone(),
            resume_text: candidate.resume_text.clone(),
            required_skills: self.required_skills.clone(),
            job_title: self.job_title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch {
    pub resume_id: String,
    #[serde(flatten)]
    pub result: MatchResult,
}

/// Matches ordered by `overall_score`, best first. Candidates without
/// résumé text are listed in `skipped` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchMatchResult {
    pub matches: Vec<RankedMatch>,
    pub skipped: Vec<String>,
}

/// Splits a free-form skills field on commas and newlines, dropping blanks.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
