//! Prompt builders for the three pipeline tasks. Pure functions of their input.

use crate::interview::models::{EvaluationRequest, GenerationRequest, MatchRequest};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Job description and résumé excerpts in the question prompt.
const GENERATION_CONTEXT_CHARS: usize = 1000;
/// Résumé / job description excerpts in the evaluation prompt.
const EVALUATION_CONTEXT_CHARS: usize = 500;

/// Reply shape the question prompt asks for. The MCQ fields are optional.
pub const QUESTION_JSON_SHAPE: &str = r#"[
    {
        "question_text": "The question text",
        "question_type": "technical|behavioral|situational|general",
        "difficulty": "easy|medium|hard",
        "is_mcq": false,
        "options": [],
        "correct_answer": "",
        "skill_tags": []
    }
]"#;

pub const EVALUATION_JSON_SHAPE: &str = r#"{
    "score": <number 0-10>,
    "evaluation": "<detailed evaluation>",
    "strengths": "<list of strengths>",
    "improvements": "<suggested improvements>"
}"#;

pub const MATCH_JSON_SHAPE: &str = r#"{
    "overall_score": <number 0-100>,
    "skills_score": <number 0-100>,
    "experience_score": <number 0-100>,
    "education_score": <number 0-100>,
    "match_analysis": "<detailed analysis of how well the resume matches the job description>",
    "strengths": "<key strengths and matching points>",
    "gaps": "<missing requirements or gaps>",
    "recommendations": "<recommendations for the candidate or recruiter>"
}"#;

pub const MATCH_WEIGHTING_INSTRUCTION: &str = "Calculate scores based on:
- Skills Score: How many required skills are present in the resume
- Experience Score: How well the candidate's experience matches the job requirements
- Education Score: How well the candidate's education matches the requirements
- Overall Score: Weighted average (Skills: 40%, Experience: 40%, Education: 20%)";

/// Human label for a stored experience level. Unknown levels pass through.
pub fn experience_label(level: &str) -> &str {
    match level {
        "entry" => "Entry Level",
        "mid" => "Mid Level",
        "senior" => "Senior Level",
        "executive" => "Executive",
        other => other,
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn build_question_prompt(request: &GenerationRequest) -> String {
    let mut parts: Vec<String> = vec![
        "Generate a set of professional interview questions for a candidate interview.".to_string(),
        format!("Generate exactly {} questions.", request.question_count),
        String::new(),
        "Requirements:".to_string(),
        "- Mix of technical, behavioral, and situational questions".to_string(),
        "- Questions should be relevant to the candidate's background and the job role".to_string(),
        "- Vary the difficulty levels (easy, medium, hard)".to_string(),
        "- For a multiple-choice question set \"is_mcq\" to true, give exactly 4 \"options\" \
         and a \"correct_answer\" letter (A, B, C or D)"
            .to_string(),
        "- Return the response as a JSON array with the following structure:".to_string(),
        String::new(),
        QUESTION_JSON_SHAPE.to_string(),
        String::new(),
    ];

    if let Some(title) = present(&request.job_title) {
        parts.push(format!("Job Title: {title}"));
    }
    if let Some(level) = present(&request.experience_level) {
        parts.push(format!("Experience Level: {}", experience_label(level)));
    }
    if let Some(skills) = present(&request.required_skills) {
        parts.push(format!("Required Skills: {skills}"));
    }
    if let Some(jd) = present(&request.job_description) {
        parts.push(format!(
            "\nJob Description:\n{}",
            truncate_chars(jd, GENERATION_CONTEXT_CHARS)
        ));
    }
    if let Some(resume) = present(&request.resume_text) {
        parts.push(format!(
            "\nCandidate Resume Summary:\n{}",
            truncate_chars(resume, GENERATION_CONTEXT_CHARS)
        ));
    }

    parts.push("\nGenerate the questions now:".to_string());
    parts.join("\n")
}

pub fn build_evaluation_prompt(request: &EvaluationRequest) -> String {
    let resume_context = present(&request.resume_text)
        .map(|r| format!("Resume Context: {}", truncate_chars(r, EVALUATION_CONTEXT_CHARS)))
        .unwrap_or_default();
    let jd_context = present(&request.job_description)
        .map(|jd| format!("Job Description: {}", truncate_chars(jd, EVALUATION_CONTEXT_CHARS)))
        .unwrap_or_default();

    format!(
        "Evaluate the following interview answer and provide:
1. A score out of 10
2. Detailed evaluation
3. Strengths identified
4. Areas for improvement

Question Type: {question_type}
Question: {question}

Answer: {answer}

{resume_context}
{jd_context}

Provide your evaluation in JSON format:
{shape}",
        question_type = request.question_type.as_str(),
        question = request.question_text,
        answer = request.answer_text,
        shape = EVALUATION_JSON_SHAPE,
    )
}

pub fn build_match_prompt(request: &MatchRequest) -> String {
    format!(
        "You are an ATS (Applicant Tracking System) matching expert. Analyze the match between a job description and a candidate's resume.

Job Title: {title}
Job Description:
{jd}

Required Skills: {skills}

Candidate Resume:
{resume}

Please provide a detailed ATS match analysis in the following JSON format:
{shape}

{weighting}

{json_only}",
        title = request.job_title,
        jd = request.job_description_text,
        skills = request.required_skills,
        resume = request.resume_text,
        shape = MATCH_JSON_SHAPE,
        weighting = MATCH_WEIGHTING_INSTRUCTION,
        json_only = JSON_ONLY_INSTRUCTION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::QuestionType;

    fn generation_request() -> GenerationRequest {
        GenerationRequest {
            question_count: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_question_prompt_states_count_and_shape() {
        let prompt = build_question_prompt(&generation_request());
        assert!(prompt.contains("Generate exactly 3 questions."));
        assert!(prompt.contains("\"question_text\""));
        assert!(prompt.contains("technical, behavioral, and situational"));
        assert!(prompt.ends_with("Generate the questions now:"));
    }

    #[test]
    fn test_question_prompt_omits_absent_sections() {
        let prompt = build_question_prompt(&generation_request());
        assert!(!prompt.contains("Job Title:"));
        assert!(!prompt.contains("Experience Level:"));
        assert!(!prompt.contains("Job Description:"));
        assert!(!prompt.contains("Candidate Resume Summary:"));
    }

    #[test]
    fn test_question_prompt_maps_experience_level() {
        let request = GenerationRequest {
            experience_level: Some("senior".to_string()),
            job_title: Some("Backend Engineer".to_string()),
            required_skills: Some("Rust, Postgres".to_string()),
            ..generation_request()
        };
        let prompt = build_question_prompt(&request);
        assert!(prompt.contains("Experience Level: Senior Level"));
        assert!(prompt.contains("Job Title: Backend Engineer"));
        assert!(prompt.contains("Required Skills: Rust, Postgres"));
    }

    #[test]
    fn test_unknown_experience_level_passes_through() {
        assert_eq!(experience_label("principal"), "principal");
        assert_eq!(experience_label("entry"), "Entry Level");
    }

    #[test]
    fn test_question_prompt_truncates_context_to_1000_chars() {
        let request = GenerationRequest {
            job_description: Some("j".repeat(1500)),
            resume_text: Some("r".repeat(1200)),
            ..generation_request()
        };
        let prompt = build_question_prompt(&request);
        assert!(prompt.contains(&"j".repeat(1000)));
        assert!(!prompt.contains(&"j".repeat(1001)));
        assert!(prompt.contains(&"r".repeat(1000)));
        assert!(!prompt.contains(&"r".repeat(1001)));
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("résumé", 2), "ré");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_evaluation_prompt_embeds_fields_and_truncates_context() {
        let request = EvaluationRequest {
            question_text: "Explain ownership.".to_string(),
            answer_text: "Each value has one owner.".to_string(),
            question_type: QuestionType::Technical,
            resume_text: Some("x".repeat(800)),
            job_description: None,
        };
        let prompt = build_evaluation_prompt(&request);
        assert!(prompt.contains("Question Type: technical"));
        assert!(prompt.contains("Question: Explain ownership."));
        assert!(prompt.contains("Answer: Each value has one owner."));
        assert!(prompt.contains(&"x".repeat(500)));
        assert!(!prompt.contains(&"x".repeat(501)));
        assert!(!prompt.contains("Job Description:"));
        assert!(prompt.contains("\"score\": <number 0-10>"));
    }

    #[test]
    fn test_match_prompt_keeps_full_text_and_weighting() {
        let request = MatchRequest {
            job_description_text: "d".repeat(3000),
            resume_text: "Rust developer with 6 years experience".to_string(),
            required_skills: "Rust, Tokio".to_string(),
            job_title: "Systems Engineer".to_string(),
        };
        let prompt = build_match_prompt(&request);
        assert!(prompt.contains(&"d".repeat(3000)));
        assert!(prompt.contains("Job Title: Systems Engineer"));
        assert!(prompt.contains("Required Skills: Rust, Tokio"));
        assert!(prompt.contains("Skills: 40%, Experience: 40%, Education: 20%"));
        assert!(prompt.contains("Return ONLY valid JSON, no additional text."));
    }
}
