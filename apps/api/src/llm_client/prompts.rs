// System prompts, one per pipeline task.
// Task prompt bodies live next to their builders in interview::prompts.

pub const QUESTION_GENERATION_SYSTEM: &str = "You are an expert interview question generator. \
    Generate relevant, professional interview questions based on the provided resume \
    and job description.";

pub const ANSWER_EVALUATION_SYSTEM: &str =
    "You are an expert interview evaluator. Provide fair, constructive feedback.";

pub const ATS_MATCHING_SYSTEM: &str =
    "You are an expert ATS matching system. Always return valid JSON.";

/// Closing instruction shared by the scoring prompts.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON, no additional text.";
