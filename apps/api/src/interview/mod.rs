//! Interview pipeline: question generation, answer evaluation, ATS matching,
//! and the supporting MCQ, transcription and report logic.
//!
//! Every orchestrator makes at most one model call and always returns a
//! usable result; model trouble degrades to salvage or deterministic defaults.

pub mod answers;
pub mod ats;
pub mod evaluation;
pub mod fallback;
pub mod handlers;
pub mod mcq;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod question_gen;
pub mod report;
pub mod transcription;
