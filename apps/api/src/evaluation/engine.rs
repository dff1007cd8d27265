//! Evaluation Engine — turns a raw profile and a role name into alignment,
//! readiness, and the per-skill weighted gap map the planner consumes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::Catalog;
use crate::evaluation::normalize::normalize_profile;
use crate::evaluation::vectors::{
    build_role_vectors, build_student_vector, total_required, weighted_cosine, weighted_gaps,
};
use crate::evaluation::{Diagnostic, EvaluationError};

/// Per-skill weighted deficiency, keyed by skill name over the full
/// vocabulary. Zero means no deficiency or not relevant to the role.
pub type GapMap = BTreeMap<String, f64>;

/// The evaluation contract consumed by callers and the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub role: String,
    /// Weighted cosine similarity between student and role vectors, in [0, 1].
    pub alignment_score: f64,
    /// `1 - total_gap / total_required`; below 0 only when deficits exceed
    /// the whole weighted requirement.
    pub readiness_score: f64,
    pub gaps: GapMap,
    /// Nonzero gaps sorted descending; ties keep vocabulary order.
    pub top_gaps: Vec<(String, f64)>,
}

/// Everything `evaluate` produces: the result contract, the normalized
/// profile the classifier needs downstream, and any non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub result: EvaluationResult,
    pub normalized_profile: BTreeMap<String, f64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Evaluates a raw student profile against a catalog role.
///
/// Fails only on caller-input errors (unknown role, invalid proficiency).
/// Unknown skills in the profile are dropped with a diagnostic.
pub fn evaluate(
    profile: &BTreeMap<String, Value>,
    role_name: &str,
    catalog: &Catalog,
) -> Result<EvaluationOutcome, EvaluationError> {
    let role = catalog
        .role(role_name)
        .ok_or_else(|| EvaluationError::UnknownRole(role_name.to_string()))?;

    let (normalized_profile, diagnostics) = normalize_profile(profile, &catalog.vocabulary)?;

    let student = build_student_vector(&normalized_profile, &catalog.vocabulary);
    let (required, weights) = build_role_vectors(role, &catalog.vocabulary);

    let alignment_score = weighted_cosine(&student, &required, &weights);

    let (gap_vector, total_gap) = weighted_gaps(&student, &required, &weights);
    let required_sum = total_required(&required, &weights);
    let readiness_score = if required_sum > 0.0 {
        1.0 - total_gap / required_sum
    } else {
        // Degenerate role with no weighted requirement. The catalog invariant
        // rules this out, but it must not divide by zero.
        1.0
    };

    let gaps: GapMap = catalog
        .vocabulary
        .names()
        .iter()
        .zip(&gap_vector)
        .map(|(name, gap)| (name.clone(), *gap))
        .collect();

    // Stable sort: equal gaps keep their vocabulary order.
    let mut top_gaps: Vec<(String, f64)> = catalog
        .vocabulary
        .names()
        .iter()
        .zip(&gap_vector)
        .filter(|(_, gap)| **gap > 0.0)
        .map(|(name, gap)| (name.clone(), *gap))
        .collect();
    top_gaps.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(EvaluationOutcome {
        result: EvaluationResult {
            role: role_name.to_string(),
            alignment_score,
            readiness_score,
            gaps,
            top_gaps,
        },
        normalized_profile,
        diagnostics,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RoleDef, SkillDef, SkillRequirement};
    use serde_json::json;

    /// Vocabulary + one role matching the worked scenario: DSA 1.0 (w 0.30),
    /// OS 0.6 (0.15), DBMS 0.5 (0.10), Programming 1.0 (0.30), Git 0.5 (0.15).
    fn make_catalog() -> Catalog {
        let skills: Vec<SkillDef> = ["DSA", "OS", "DBMS", "Programming", "Git"]
            .iter()
            .map(|n| SkillDef {
                name: n.to_string(),
                group: "Test".to_string(),
            })
            .collect();

        let role = RoleDef {
            label: "SDE".to_string(),
            description: "test".to_string(),
            icon: "code".to_string(),
            skills: BTreeMap::from([
                ("DSA".to_string(), SkillRequirement { required: 1.0, weight: 0.30 }),
                ("OS".to_string(), SkillRequirement { required: 0.6, weight: 0.15 }),
                ("DBMS".to_string(), SkillRequirement { required: 0.5, weight: 0.10 }),
                ("Programming".to_string(), SkillRequirement { required: 1.0, weight: 0.30 }),
                ("Git".to_string(), SkillRequirement { required: 0.5, weight: 0.15 }),
            ]),
        };

        Catalog::build(
            skills,
            BTreeMap::from([("SDE".to_string(), role)]),
            vec![],
        )
        .unwrap()
    }

    fn make_profile() -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("DSA".to_string(), json!("intermediate")),
            ("OS".to_string(), json!("beginner")),
            ("DBMS".to_string(), json!("none")),
            ("Programming".to_string(), json!("strong")),
            ("Git".to_string(), json!("beginner")),
        ])
    }

    #[test]
    fn test_worked_gap_scenario() {
        let catalog = make_catalog();
        let outcome = evaluate(&make_profile(), "SDE", &catalog).unwrap();

        let expected = [
            ("DSA", 0.30 * 0.4),
            ("OS", 0.15 * 0.35),
            ("DBMS", 0.10 * 0.5),
            ("Git", 0.15 * 0.25),
        ];
        assert_eq!(outcome.result.top_gaps.len(), expected.len());
        for ((skill, gap), (want_skill, want_gap)) in
            outcome.result.top_gaps.iter().zip(expected)
        {
            assert_eq!(skill, want_skill);
            assert!((gap - want_gap).abs() < 1e-9, "{skill}: got {gap}, want {want_gap}");
        }

        // Programming is fully met, so its gap is zero and it is excluded.
        assert_eq!(outcome.result.gaps.get("Programming"), Some(&0.0));
    }

    #[test]
    fn test_unknown_role_fails() {
        let catalog = make_catalog();
        let err = evaluate(&make_profile(), "Astronaut", &catalog).unwrap_err();
        assert!(matches!(err, EvaluationError::UnknownRole(_)), "got {err}");
    }

    #[test]
    fn test_invalid_proficiency_propagates() {
        let catalog = make_catalog();
        let profile = BTreeMap::from([("DSA".to_string(), json!("galactic"))]);
        let err = evaluate(&profile, "SDE", &catalog).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidProficiency { .. }), "got {err}");
    }

    #[test]
    fn test_unknown_skill_dropped_and_reported() {
        let catalog = make_catalog();
        let mut profile = make_profile();
        profile.insert("Juggling".to_string(), json!("strong"));

        let outcome = evaluate(&profile, "SDE", &catalog).unwrap();
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::UnknownSkillDropped {
                skill: "Juggling".to_string()
            }]
        );
        assert!(!outcome.normalized_profile.contains_key("Juggling"));
    }

    #[test]
    fn test_empty_profile_alignment_floor() {
        let catalog = make_catalog();
        let outcome = evaluate(&BTreeMap::new(), "SDE", &catalog).unwrap();
        assert_eq!(outcome.result.alignment_score, 0.0);
    }

    #[test]
    fn test_alignment_in_unit_range() {
        let catalog = make_catalog();
        let outcome = evaluate(&make_profile(), "SDE", &catalog).unwrap();
        let a = outcome.result.alignment_score;
        assert!((0.0..=1.0).contains(&a), "alignment {a} out of range");
    }

    #[test]
    fn test_readiness_matches_deficit_formula() {
        let catalog = make_catalog();
        let outcome = evaluate(&make_profile(), "SDE", &catalog).unwrap();

        let total_gap: f64 = outcome.result.gaps.values().sum();
        let total_required = 0.30 * 1.0 + 0.15 * 0.6 + 0.10 * 0.5 + 0.30 * 1.0 + 0.15 * 0.5;
        let want = 1.0 - total_gap / total_required;
        assert!((outcome.result.readiness_score - want).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_profile_reads_fully_ready() {
        let catalog = make_catalog();
        let profile: BTreeMap<String, Value> = ["DSA", "OS", "DBMS", "Programming", "Git"]
            .iter()
            .map(|s| (s.to_string(), json!(1.0)))
            .collect();

        let outcome = evaluate(&profile, "SDE", &catalog).unwrap();
        assert!((outcome.result.readiness_score - 1.0).abs() < 1e-9);
        assert!(outcome.result.top_gaps.is_empty());
    }

    #[test]
    fn test_top_gaps_sorted_descending_and_nonzero() {
        let catalog = make_catalog();
        let outcome = evaluate(&make_profile(), "SDE", &catalog).unwrap();

        let gaps: Vec<f64> = outcome.result.top_gaps.iter().map(|(_, g)| *g).collect();
        assert!(gaps.windows(2).all(|w| w[0] >= w[1]), "not descending: {gaps:?}");
        assert!(gaps.iter().all(|g| *g > 0.0));
    }

    #[test]
    fn test_gap_ties_keep_vocabulary_order() {
        // Two skills with identical weighted gaps: OS before DBMS in the vocabulary.
        let skills: Vec<SkillDef> = ["OS", "DBMS"]
            .iter()
            .map(|n| SkillDef {
                name: n.to_string(),
                group: "Test".to_string(),
            })
            .collect();
        let role = RoleDef {
            label: "Tied".to_string(),
            description: "test".to_string(),
            icon: "code".to_string(),
            skills: BTreeMap::from([
                ("OS".to_string(), SkillRequirement { required: 1.0, weight: 0.5 }),
                ("DBMS".to_string(), SkillRequirement { required: 1.0, weight: 0.5 }),
            ]),
        };
        let catalog = Catalog::build(
            skills,
            BTreeMap::from([("Tied".to_string(), role)]),
            vec![],
        )
        .unwrap();

        let outcome = evaluate(&BTreeMap::new(), "Tied", &catalog).unwrap();
        let names: Vec<&str> = outcome.result.top_gaps.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["OS", "DBMS"]);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let catalog = make_catalog();
        let first = evaluate(&make_profile(), "SDE", &catalog).unwrap();
        let second = evaluate(&make_profile(), "SDE", &catalog).unwrap();

        assert_eq!(first.result.alignment_score, second.result.alignment_score);
        assert_eq!(first.result.readiness_score, second.result.readiness_score);
        assert_eq!(first.result.gaps, second.result.gaps);
        assert_eq!(first.result.top_gaps, second.result.top_gaps);
    }

    #[test]
    fn test_gaps_cover_full_vocabulary() {
        let catalog = make_catalog();
        let outcome = evaluate(&make_profile(), "SDE", &catalog).unwrap();
        assert_eq!(outcome.result.gaps.len(), catalog.vocabulary.len());
    }
}
