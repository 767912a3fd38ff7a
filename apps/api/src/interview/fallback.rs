//! Deterministic fallbacks used when no model is available or a call fails.
//!
//! Everything here is a pure function of its input; the same request always
//! produces the same output.

use crate::interview::models::{
    split_skills, Difficulty, EvaluationResult, GeneratedQuestion, MatchRequest, MatchResult,
    QuestionType, ResultSource,
};

const DEFAULT_EVALUATION_SCORE: f64 = 7.0;

pub const SKILLS_WEIGHT: f64 = 0.4;
pub const EXPERIENCE_WEIGHT: f64 = 0.4;
pub const EDUCATION_WEIGHT: f64 = 0.2;

const EXPERIENCE_KEYWORDS: &[&str] = &["experience", "years", "worked", "role", "position", "job"];

const EDUCATION_KEYWORDS: &[&str] = &[
    "education",
    "degree",
    "bachelor",
    "master",
    "phd",
    "university",
    "college",
];

/// The fixed, ordered default question bank.
pub const DEFAULT_QUESTION_BANK: [(&str, QuestionType, Difficulty); 8] = [
    (
        "Please introduce yourself and tell us about your background.",
        QuestionType::General,
        Difficulty::Easy,
    ),
    (
        "What interests you most about this position?",
        QuestionType::Behavioral,
        Difficulty::Easy,
    ),
    (
        "Describe a challenging project you worked on and how you overcame obstacles.",
        QuestionType::Situational,
        Difficulty::Medium,
    ),
    (
        "What are your strengths and how do they align with this role?",
        QuestionType::Behavioral,
        Difficulty::Medium,
    ),
    (
        "How do you handle working under pressure or tight deadlines?",
        QuestionType::Behavioral,
        Difficulty::Medium,
    ),
    (
        "Tell me about a time when you had to learn a new technology quickly.",
        QuestionType::Situational,
        Difficulty::Medium,
    ),
    (
        "What is your approach to problem-solving?",
        QuestionType::Behavioral,
        Difficulty::Medium,
    ),
    (
        "Where do you see yourself in 5 years?",
        QuestionType::General,
        Difficulty::Easy,
    ),
];

/// First `count` bank questions in order. Requests beyond the bank size wrap
/// around to the start; the second value is how many entries were repeated.
pub fn default_questions(count: usize) -> (Vec<GeneratedQuestion>, usize) {
    let questions = DEFAULT_QUESTION_BANK
        .iter()
        .cycle()
        .take(count)
        .map(|(text, question_type, difficulty)| {
            GeneratedQuestion::open(*text, *question_type, *difficulty)
        })
        .collect();
    (questions, count.saturating_sub(DEFAULT_QUESTION_BANK.len()))
}

/// Tops `questions` up to `count` from the start of the bank. Returns how many
/// bank entries had to be repeated to get there.
pub fn pad_from_bank(questions: &mut Vec<GeneratedQuestion>, count: usize) -> usize {
    if questions.len() >= count {
        questions.truncate(count);
        return 0;
    }
    let (padding, recycled) = default_questions(count - questions.len());
    questions.extend(padding);
    recycled
}

/// Why a deterministic fallback is being used. Only the wording differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NoCredentials,
    ProviderFailure,
}

/// Fixed 7.0 evaluation used when no model is configured or the call failed.
pub fn basic_evaluation(reason: FallbackReason) -> EvaluationResult {
    let (evaluation, strengths, improvements) = match reason {
        FallbackReason::NoCredentials => (
            "Answer provided. Detailed evaluation requires API key.",
            "Answer was provided and relevant to the question.",
            "Consider providing more specific examples and details.",
        ),
        FallbackReason::ProviderFailure => (
            "Evaluation error: the AI provider could not be reached.",
            "Answer was provided.",
            "Please try again or check your answer.",
        ),
    };
    EvaluationResult {
        score: DEFAULT_EVALUATION_SCORE,
        evaluation: evaluation.to_string(),
        strengths: strengths.to_string(),
        improvements: improvements.to_string(),
        source: ResultSource::Default,
    }
}

/// Generic result for a model reply that could not be parsed.
pub fn unparsed_evaluation() -> EvaluationResult {
    EvaluationResult {
        score: DEFAULT_EVALUATION_SCORE,
        evaluation: "Evaluation completed. Some details may be missing.".to_string(),
        strengths: "Answer was provided.".to_string(),
        improvements: "Consider providing more detail.".to_string(),
        source: ResultSource::Salvaged,
    }
}

/// Keyword-based ATS scoring with no model involved.
///
/// skills     = required skills found in the résumé / required skills × 100
/// experience = experience keywords found / keyword count × 100
/// education  = education keywords found / keyword count × 100
/// overall    = 0.4·skills + 0.4·experience + 0.2·education
///
/// All matching is case-insensitive substring matching; all scores are
/// rounded to two decimals.
pub fn basic_ats_match(request: &MatchRequest, reason: FallbackReason) -> MatchResult {
    let resume_lower = request.resume_text.to_lowercase();

    let skills: Vec<String> = split_skills(&request.required_skills)
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();
    let matched_skills = skills
        .iter()
        .filter(|skill| resume_lower.contains(skill.as_str()))
        .count();
    let skills_score = if skills.is_empty() {
        0.0
    } else {
        matched_skills as f64 / skills.len() as f64 * 100.0
    };

    let experience_score = keyword_coverage(&resume_lower, EXPERIENCE_KEYWORDS);
    let education_score = keyword_coverage(&resume_lower, EDUCATION_KEYWORDS);
    let overall_score = weighted_overall(skills_score, experience_score, education_score);

    MatchResult {
        overall_score: round2(overall_score),
        skills_score: round2(skills_score),
        experience_score: round2(experience_score),
        education_score: round2(education_score),
        match_analysis: format!(
            "Basic matching: {matched_skills} skills matched, \
             experience and education keywords found."
        ),
        strengths: "Resume contains relevant keywords and skills.".to_string(),
        gaps: match reason {
            FallbackReason::NoCredentials => "Detailed analysis requires AI processing.",
            FallbackReason::ProviderFailure => {
                "Detailed analysis unavailable: the AI provider could not be reached."
            }
        }
        .to_string(),
        recommendations: match reason {
            FallbackReason::NoCredentials => {
                "For detailed analysis, ensure API keys are configured."
            }
            FallbackReason::ProviderFailure => "Re-run the match once the AI provider responds.",
        }
        .to_string(),
        source: ResultSource::Default,
    }
}

pub fn weighted_overall(skills: f64, experience: f64, education: f64) -> f64 {
    SKILLS_WEIGHT * skills + EXPERIENCE_WEIGHT * experience + EDUCATION_WEIGHT * education
}

fn keyword_coverage(haystack: &str, keywords: &[&str]) -> f64 {
    let found = keywords.iter().filter(|k| haystack.contains(*k)).count();
    (found as f64 / keywords.len() as f64 * 100.0).min(100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
