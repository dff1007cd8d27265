//! Proficiency Normalizer — raw profile values to numeric scores in [0, 1].
//!
//! Accepts a number already in [0, 1] or one of four qualitative labels
//! (case-insensitive, surrounding whitespace ignored). Anything else is an
//! `InvalidProficiency` naming the skill. Skills outside the vocabulary are
//! dropped with a diagnostic, not an error — the evaluation proceeds on what
//! it recognizes.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::catalog::SkillVocabulary;
use crate::evaluation::{Diagnostic, EvaluationError};

/// Qualitative label → numeric score.
const LABEL_SCORES: &[(&str, f64)] = &[
    ("none", 0.0),
    ("beginner", 0.25),
    ("intermediate", 0.6),
    ("strong", 1.0),
];

/// Normalizes a single raw proficiency value.
pub fn normalize_proficiency(skill: &str, raw: &Value) -> Result<f64, EvaluationError> {
    match raw {
        Value::String(label) => {
            let key = label.trim().to_lowercase();
            LABEL_SCORES
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, score)| *score)
                .ok_or_else(|| EvaluationError::InvalidProficiency {
                    skill: skill.to_string(),
                    detail: format!("unknown proficiency label '{label}'"),
                })
        }
        Value::Number(n) => {
            let value = n.as_f64().ok_or_else(|| EvaluationError::InvalidProficiency {
                skill: skill.to_string(),
                detail: format!("'{n}' is not a representable number"),
            })?;
            if !(0.0..=1.0).contains(&value) {
                return Err(EvaluationError::InvalidProficiency {
                    skill: skill.to_string(),
                    detail: format!("numeric proficiency {value} is outside [0, 1]"),
                });
            }
            Ok(value)
        }
        other => Err(EvaluationError::InvalidProficiency {
            skill: skill.to_string(),
            detail: format!(
                "expected a number in [0, 1] or a label, got {}",
                value_type_name(other)
            ),
        }),
    }
}

/// Normalizes a whole profile against the vocabulary.
///
/// Returns the recognized skill → score map plus one diagnostic per dropped
/// unknown skill. Fails on the first invalid value.
pub fn normalize_profile(
    profile: &BTreeMap<String, Value>,
    vocabulary: &SkillVocabulary,
) -> Result<(BTreeMap<String, f64>, Vec<Diagnostic>), EvaluationError> {
    let mut normalized = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for (skill, raw) in profile {
        if vocabulary.index_of(skill).is_none() {
            diagnostics.push(Diagnostic::UnknownSkillDropped {
                skill: skill.clone(),
            });
            continue;
        }
        normalized.insert(skill.clone(), normalize_proficiency(skill, raw)?);
    }

    Ok((normalized, diagnostics))
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
