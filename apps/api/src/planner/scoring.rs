//! Resource Scorer — benefit and benefit-per-hour against a gap map.
//!
//! Scoring is total: every catalog resource gets a score, including
//! non-beneficial ones. Filtering out `benefit <= 0` is the allocator's
//! policy, not the scorer's.

use serde::{Deserialize, Serialize};

use crate::catalog::Resource;
use crate::evaluation::engine::GapMap;

/// A resource decorated with its gap-reduction economics for one evaluation.
/// Created fresh per request; the underlying catalog entry is never touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResource {
    pub resource: Resource,
    /// Sum of weighted gap × coverage over the resource's covered skills.
    pub benefit: f64,
    /// `benefit / time`, or 0 when time is not positive.
    pub benefit_per_hour: f64,
}

/// Scores every resource against the gap map, sorted best
/// benefit-per-hour first (benefit breaks ties).
pub fn score_resources(resources: &[Resource], gaps: &GapMap) -> Vec<ScoredResource> {
    let mut scored: Vec<ScoredResource> = resources
        .iter()
        .map(|resource| {
            let benefit: f64 = resource
                .coverage
                .iter()
                .map(|(skill, coverage)| gaps.get(skill).copied().unwrap_or(0.0) * coverage)
                .sum();
            let benefit_per_hour = if resource.time > 0.0 {
                benefit / resource.time
            } else {
                0.0
            };
            ScoredResource {
                resource: resource.clone(),
                benefit,
                benefit_per_hour,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.benefit_per_hour
            .partial_cmp(&a.benefit_per_hour)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.benefit
                    .partial_cmp(&a.benefit)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    scored
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceKind;
    use std::collections::BTreeMap;

    fn make_resource(id: &str, time: f64, coverage: &[(&str, f64)]) -> Resource {
        Resource {
            id: id.to_string(),
            title: id.to_string(),
            url: format!("https://example.com/{id}"),
            time,
            coverage: coverage
                .iter()
                .map(|(skill, cov)| (skill.to_string(), *cov))
                .collect(),
            kind: ResourceKind::Theory,
            icon_type: "docs".to_string(),
        }
    }

    fn make_gaps(entries: &[(&str, f64)]) -> GapMap {
        entries
            .iter()
            .map(|(skill, gap)| (skill.to_string(), *gap))
            .collect()
    }

    #[test]
    fn test_benefit_is_gap_times_coverage() {
        let resources = vec![make_resource("res_a", 2.0, &[("DSA", 0.9), ("OS", 0.5)])];
        let gaps = make_gaps(&[("DSA", 0.12), ("OS", 0.05)]);

        let scored = score_resources(&resources, &gaps);
        let want = 0.12 * 0.9 + 0.05 * 0.5;
        assert!((scored[0].benefit - want).abs() < 1e-9);
        assert!((scored[0].benefit_per_hour - want / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_time_yields_zero_benefit_per_hour() {
        let resources = vec![make_resource("res_free", 0.0, &[("DSA", 1.0)])];
        let gaps = make_gaps(&[("DSA", 0.3)]);

        let scored = score_resources(&resources, &gaps);
        assert!(scored[0].benefit > 0.0);
        assert_eq!(scored[0].benefit_per_hour, 0.0);
    }

    #[test]
    fn test_coverage_of_unknown_skill_contributes_nothing() {
        let resources = vec![make_resource("res_a", 1.0, &[("Quiltmaking", 0.9)])];
        let gaps = make_gaps(&[("DSA", 0.3)]);

        let scored = score_resources(&resources, &gaps);
        assert_eq!(scored[0].benefit, 0.0);
    }

    #[test]
    fn test_sorted_by_benefit_per_hour_descending() {
        let resources = vec![
            make_resource("res_slow", 10.0, &[("DSA", 0.9)]),
            make_resource("res_fast", 1.0, &[("DSA", 0.9)]),
        ];
        let gaps = make_gaps(&[("DSA", 0.3)]);

        let scored = score_resources(&resources, &gaps);
        assert_eq!(scored[0].resource.id, "res_fast");
        assert_eq!(scored[1].resource.id, "res_slow");
    }

    #[test]
    fn test_equal_rate_falls_back_to_benefit() {
        // Same benefit/hour, different absolute benefit.
        let resources = vec![
            make_resource("res_small", 1.0, &[("DSA", 0.3)]),
            make_resource("res_big", 2.0, &[("DSA", 0.6)]),
        ];
        let gaps = make_gaps(&[("DSA", 0.5)]);

        let scored = score_resources(&resources, &gaps);
        assert_eq!(scored[0].resource.id, "res_big");
    }

    #[test]
    fn test_scoring_is_total() {
        // Non-beneficial resources are scored, not dropped.
        let resources = vec![
            make_resource("res_useful", 1.0, &[("DSA", 0.9)]),
            make_resource("res_useless", 1.0, &[("OS", 0.9)]),
        ];
        let gaps = make_gaps(&[("DSA", 0.3), ("OS", 0.0)]);

        let scored = score_resources(&resources, &gaps);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[1].benefit, 0.0);
    }

    #[test]
    fn test_catalog_resource_not_mutated() {
        let resources = vec![make_resource("res_a", 2.0, &[("DSA", 0.9)])];
        let before = resources[0].clone();
        let gaps = make_gaps(&[("DSA", 0.12)]);

        let _ = score_resources(&resources, &gaps);
        assert_eq!(resources[0].id, before.id);
        assert_eq!(resources[0].time, before.time);
        assert_eq!(resources[0].coverage, before.coverage);
    }
}
