//! Priority Classifier — urgency tier and skim-eligibility per resource.
//!
//! A monotone two-factor decision over (skill weight, skill gap): neither
//! dimension alone determines urgency. A large gap in a low-weight skill is
//! at most medium; a high-weight skill the student already satisfies is
//! never high. High priority and skim-eligibility are mutually exclusive.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Resource, RoleDef};
use crate::evaluation::engine::GapMap;

/// Weight at or above which a skill counts as high-weight.
const HIGH_WEIGHT: f64 = 0.15;
/// Weight at or above which a skill counts as medium-weight.
const MEDIUM_WEIGHT: f64 = 0.10;

/// Urgency tier for placement ordering. High material is locked in before
/// economics are optimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Rank for descending sorts: high=3, medium=2, low=1.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Classification attached to a selected resource for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub priority: Priority,
    pub can_skim: bool,
    /// Covered skills with nonzero coverage that the role actually requires.
    pub covered_skills: Vec<String>,
}

/// Classifies one resource against the role, the gap map, and the student's
/// normalized profile.
pub fn classify(
    resource: &Resource,
    gaps: &GapMap,
    role: &RoleDef,
    profile: &BTreeMap<String, f64>,
) -> Classification {
    // Only skills the resource covers (coverage > 0) and the role requires.
    let covered_skills: Vec<String> = resource
        .coverage
        .iter()
        .filter(|(skill, coverage)| **coverage > 0.0 && role.skills.contains_key(*skill))
        .map(|(skill, _)| skill.clone())
        .collect();

    let mut max_weight = 0.0_f64;
    let mut max_gap = 0.0_f64;
    let mut all_proficient = true;

    for skill in &covered_skills {
        let requirement = role.skills[skill];
        let gap = gaps.get(skill).copied().unwrap_or(0.0);
        let actual = profile.get(skill).copied().unwrap_or(0.0);

        max_weight = max_weight.max(requirement.weight);
        max_gap = max_gap.max(gap);
        if actual < requirement.required {
            all_proficient = false;
        }
    }

    // Already proficient everywhere the resource touches: low, a skim candidate.
    let priority = if all_proficient {
        Priority::Low
    } else if max_weight >= HIGH_WEIGHT {
        if max_gap > 0.2 {
            Priority::High
        } else if max_gap > 0.05 {
            Priority::Medium
        } else {
            Priority::Low
        }
    } else if max_weight >= MEDIUM_WEIGHT {
        if max_gap > 0.3 {
            Priority::High
        } else if max_gap > 0.1 {
            Priority::Medium
        } else {
            Priority::Low
        }
    } else if max_gap > 0.3 {
        Priority::Medium
    } else {
        Priority::Low
    };

    // Skimmable only when the resource touches no medium/high-weight skill
    // and every low-weight covered skill is nearly met. A resource with no
    // role-relevant coverage is trivially skim-eligible.
    let can_skim = priority != Priority::High
        && covered_skills.iter().all(|skill| {
            let requirement = role.skills[skill];
            let gap = gaps.get(skill).copied().unwrap_or(0.0);
            requirement.weight < MEDIUM_WEIGHT && gap <= 0.1
        });

    Classification {
        priority,
        can_skim,
        covered_skills,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
