// Evaluation core: proficiency normalization, vector math, and the
// alignment/readiness/gap computation. Pure and synchronous — handlers own
// all I/O.

pub mod engine;
pub mod handlers;
pub mod normalize;
pub mod vectors;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller-input error: the request is malformed in a way the caller can fix.
/// Always identifies the offending field.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("invalid proficiency for '{skill}': {detail}")]
    InvalidProficiency { skill: String, detail: String },
}

/// Non-fatal notice emitted during evaluation, returned alongside the result
/// rather than printed as a side effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A profile entry named a skill outside the vocabulary and was ignored.
    UnknownSkillDropped { skill: String },
}
