//! Dense skill vectors over the vocabulary and the weighted-cosine / gap math.
//!
//! All vectors have vocabulary density: index i is the score for skill i,
//! defaulting to 0 for skills a profile or role does not mention.

use std::collections::BTreeMap;

use crate::catalog::{RoleDef, SkillVocabulary};

/// Builds the student vector from an already-normalized profile.
pub fn build_student_vector(
    profile: &BTreeMap<String, f64>,
    vocabulary: &SkillVocabulary,
) -> Vec<f64> {
    let mut vector = vec![0.0; vocabulary.len()];
    for (skill, score) in profile {
        if let Some(index) = vocabulary.index_of(skill) {
            vector[index] = *score;
        }
    }
    vector
}

/// Builds the role's required vector and weight vector.
pub fn build_role_vectors(role: &RoleDef, vocabulary: &SkillVocabulary) -> (Vec<f64>, Vec<f64>) {
    let mut required = vec![0.0; vocabulary.len()];
    let mut weights = vec![0.0; vocabulary.len()];
    for (skill, requirement) in &role.skills {
        if let Some(index) = vocabulary.index_of(skill) {
            required[index] = requirement.required;
            weights[index] = requirement.weight;
        }
    }
    (required, weights)
}

/// Weighted cosine similarity between the student vector and the
/// weight-scaled role vector, clamped to [0, 1].
///
/// A zero norm on either side floors the result at 0 rather than erroring.
pub fn weighted_cosine(student: &[f64], required: &[f64], weights: &[f64]) -> f64 {
    let weighted_role: Vec<f64> = required
        .iter()
        .zip(weights)
        .map(|(r, w)| r * w)
        .collect();

    let numerator: f64 = student.iter().zip(&weighted_role).map(|(s, wr)| s * wr).sum();
    let denominator = norm(student) * norm(&weighted_role);

    if denominator == 0.0 {
        return 0.0;
    }

    (numerator / denominator).clamp(0.0, 1.0)
}

/// Per-index weighted gaps `w_i * max(0, r_i - s_i)` and their sum.
pub fn weighted_gaps(student: &[f64], required: &[f64], weights: &[f64]) -> (Vec<f64>, f64) {
    let gaps: Vec<f64> = student
        .iter()
        .zip(required)
        .zip(weights)
        .map(|((s, r), w)| w * (r - s).max(0.0))
        .collect();
    let total = gaps.iter().sum();
    (gaps, total)
}

/// Total weighted requirement `Σ w_i * r_i` — the readiness denominator.
pub fn total_required(required: &[f64], weights: &[f64]) -> f64 {
    required.iter().zip(weights).map(|(r, w)| r * w).sum()
}

fn norm(vector: &[f64]) -> f64 {
    vector.iter().map(|v| v * v).sum::<f64>().sqrt()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SkillDef, SkillRequirement};

    fn make_vocab(names: &[&str]) -> SkillVocabulary {
        let skills: Vec<SkillDef> = names
            .iter()
            .map(|n| SkillDef {
                name: n.to_string(),
                group: "Test".to_string(),
            })
            .collect();
        SkillVocabulary::new(&skills)
    }

    fn make_role(skills: &[(&str, f64, f64)]) -> RoleDef {
        RoleDef {
            label: "Test".to_string(),
            description: "test".to_string(),
            icon: "code".to_string(),
            skills: skills
                .iter()
                .map(|(name, required, weight)| {
                    (
                        name.to_string(),
                        SkillRequirement {
                            required: *required,
                            weight: *weight,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_student_vector_defaults_to_zero() {
        let vocab = make_vocab(&["A", "B", "C"]);
        let profile = BTreeMap::from([("B".to_string(), 0.5)]);
        assert_eq!(build_student_vector(&profile, &vocab), vec![0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_role_vectors_place_required_and_weight() {
        let vocab = make_vocab(&["A", "B"]);
        let role = make_role(&[("A", 1.0, 0.7), ("B", 0.5, 0.3)]);
        let (required, weights) = build_role_vectors(&role, &vocab);
        assert_eq!(required, vec![1.0, 0.5]);
        assert_eq!(weights, vec![0.7, 0.3]);
    }

    #[test]
    fn test_cosine_identical_direction_is_one() {
        let s = vec![0.5, 0.25];
        let r = vec![1.0, 0.5];
        let w = vec![1.0, 1.0];
        let sim = weighted_cosine(&s, &r, &w);
        assert!((sim - 1.0).abs() < 1e-9, "got {sim}");
    }

    #[test]
    fn test_cosine_zero_student_vector_is_zero() {
        let s = vec![0.0, 0.0];
        let r = vec![1.0, 0.5];
        let w = vec![0.6, 0.4];
        assert_eq!(weighted_cosine(&s, &r, &w), 0.0);
    }

    #[test]
    fn test_cosine_zero_role_vector_is_zero() {
        let s = vec![0.5, 0.5];
        let r = vec![0.0, 0.0];
        let w = vec![0.6, 0.4];
        assert_eq!(weighted_cosine(&s, &r, &w), 0.0);
    }

    #[test]
    fn test_cosine_bounded() {
        let s = vec![1.0, 0.0, 0.3];
        let r = vec![0.2, 1.0, 0.8];
        let w = vec![0.5, 0.3, 0.2];
        let sim = weighted_cosine(&s, &r, &w);
        assert!((0.0..=1.0).contains(&sim), "got {sim}");
    }

    #[test]
    fn test_gaps_floor_at_zero_when_proficient() {
        let s = vec![1.0, 0.2];
        let r = vec![0.8, 0.6];
        let w = vec![0.5, 0.5];
        let (gaps, total) = weighted_gaps(&s, &r, &w);
        assert_eq!(gaps[0], 0.0, "exceeding the requirement leaves no gap");
        assert!((gaps[1] - 0.2).abs() < 1e-9);
        assert!((total - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_gaps_are_non_negative() {
        let s = vec![0.9, 0.1, 1.0];
        let r = vec![0.5, 0.8, 0.2];
        let w = vec![0.2, 0.5, 0.3];
        let (gaps, _) = weighted_gaps(&s, &r, &w);
        assert!(gaps.iter().all(|g| *g >= 0.0));
    }

    #[test]
    fn test_total_required_sum() {
        let r = vec![1.0, 0.5];
        let w = vec![0.6, 0.4];
        assert!((total_required(&r, &w) - 0.8).abs() < 1e-9);
    }
}
