//! Week Allocator — greedy selection and packing of resources into weekly
//! time buckets, with split handling and empty-week repair.
//!
//! The allocator never fails: any scored input produces some plan, even a
//! degenerate one. Capacity overflow is surfaced through `adjustment_note`,
//! not an error, and `optimal_weeks` is never re-derived downward once
//! sized.
//!
//! Phases:
//! 1. keep resources with positive benefit
//! 2. seed with up to `PRACTICE_SEED_LIMIT` practice resources
//! 3. append every remaining beneficial resource
//! 4. size the plan (`ceil(total / MAX_WEEKLY_HOURS)`, floor 1), topping up
//!    from the unselected pool until the count matches the week count
//! 5. classify priorities and skim flags
//! 6. order for placement: priority rank, then benefit/hour, then benefit
//! 7. place — splitting anything longer than a week, front-loading urgent
//!    material and pushing flexible material to the tail
//! 8.–10. repair empty weeks (see `repair`)
//! 11. re-sort and emit

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::{ResourceKind, RoleDef};
use crate::evaluation::engine::GapMap;
use crate::planner::priority::{classify, Classification, Priority};
use crate::planner::repair::{run_repairs, RepairCtx};
use crate::planner::scoring::ScoredResource;

/// Fixed weekly study-hour cap.
pub const MAX_WEEKLY_HOURS: f64 = 15.0;

/// Maximum number of practice resources seeded ahead of the greedy fill.
const PRACTICE_SEED_LIMIT: usize = 10;

/// Plans longer than this get an advisory note.
const ADVISORY_WEEK_LIMIT: u32 = 8;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Where a resource landed: the weeks it occupies and the hours it consumes
/// in each of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekAssignment {
    pub weeks: Vec<u32>,
    pub hours_per_week: f64,
    pub is_split: bool,
}

/// A selected resource as presented in the plan: catalog fields, scoring,
/// classification, and placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedResource {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub icon_type: String,
    pub time: f64,
    pub benefit: f64,
    pub benefit_per_hour: f64,
    pub priority: Priority,
    pub can_skim: bool,
    pub covered_skills: Vec<String>,
    pub week_assignment: WeekAssignment,
}

/// The week-by-week study plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPlan {
    /// Week number (1-based) → resource ids in placement order.
    pub weeks: BTreeMap<u32, Vec<String>>,
    pub selected_resources: Vec<PlannedResource>,
    pub total_hours: f64,
    pub optimal_weeks: u32,
    /// Advisory only: set when a week overflows its capacity or the plan
    /// runs long. Never an error.
    pub adjustment_note: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Allocation state
// ────────────────────────────────────────────────────────────────────────────

/// A selected resource with its per-request classification attached.
#[derive(Debug, Clone)]
pub(super) struct Candidate {
    pub scored: ScoredResource,
    pub class: Classification,
}

impl Candidate {
    pub(super) fn id(&self) -> &str {
        &self.scored.resource.id
    }
}

/// Mutable packing state: per-week id lists, per-week remaining hours, and
/// the assignment record per resource. Weeks are 1-based in the API.
#[derive(Debug)]
pub(super) struct PlanState {
    pub(super) weeks: Vec<Vec<String>>,
    pub(super) remaining: Vec<f64>,
    pub(super) assignments: HashMap<String, WeekAssignment>,
}

impl PlanState {
    pub(super) fn new(week_count: u32) -> Self {
        Self {
            weeks: vec![Vec::new(); week_count as usize],
            remaining: vec![MAX_WEEKLY_HOURS; week_count as usize],
            assignments: HashMap::new(),
        }
    }

    pub(super) fn week_count(&self) -> u32 {
        self.weeks.len() as u32
    }

    pub(super) fn remaining_in(&self, week: u32) -> f64 {
        self.remaining[week as usize - 1]
    }

    /// Appends a resource to a week and consumes its hours. May drive the
    /// week's remaining hours negative — overflow is advisory.
    pub(super) fn add_to_week(&mut self, id: &str, week: u32, hours: f64) {
        self.weeks[week as usize - 1].push(id.to_string());
        self.remaining[week as usize - 1] -= hours;
    }

    /// Removes a resource from a week and credits its hours back.
    pub(super) fn remove_from_week(&mut self, id: &str, week: u32, hours: f64) {
        self.weeks[week as usize - 1].retain(|other| other != id);
        self.remaining[week as usize - 1] += hours;
    }

    pub(super) fn empty_weeks(&self) -> Vec<u32> {
        self.weeks
            .iter()
            .enumerate()
            .filter(|(_, ids)| ids.is_empty())
            .map(|(i, _)| i as u32 + 1)
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Plan construction
// ────────────────────────────────────────────────────────────────────────────

/// Builds the learning plan from scored resources.
///
/// `scored` is the Resource Scorer's output and is expected in its order
/// (benefit/hour descending). `profile` is the normalized student profile.
pub fn build_plan(
    scored: &[ScoredResource],
    gaps: &GapMap,
    role: &RoleDef,
    profile: &BTreeMap<String, f64>,
) -> LearningPlan {
    // Phase 1: selection only considers beneficial resources.
    let beneficial: Vec<ScoredResource> = scored
        .iter()
        .filter(|s| s.benefit > 0.0)
        .cloned()
        .collect();

    // Phases 2–3: practice seed, then greedy fill of everything left.
    let mut selected: Vec<ScoredResource> = Vec::new();
    let mut selected_ids: std::collections::HashSet<String> = std::collections::HashSet::new();

    for entry in &beneficial {
        if selected.len() >= PRACTICE_SEED_LIMIT {
            break;
        }
        if entry.resource.kind == ResourceKind::Practice && selected_ids.insert(entry.resource.id.clone()) {
            selected.push(entry.clone());
        }
    }
    for entry in &beneficial {
        if selected_ids.insert(entry.resource.id.clone()) {
            selected.push(entry.clone());
        }
    }
    let mut pool: Vec<ScoredResource> = beneficial
        .iter()
        .filter(|entry| !selected_ids.contains(&entry.resource.id))
        .cloned()
        .collect();

    // Phase 4: size the plan; top up if fewer resources than weeks.
    let mut total_hours: f64 = selected.iter().map(|s| s.resource.time).sum();
    let mut optimal_weeks = weeks_needed(total_hours);
    while (selected.len() as u32) < optimal_weeks && !pool.is_empty() {
        let entry = pool.remove(0);
        total_hours += entry.resource.time;
        selected.push(entry);
    }
    // Hours only grew, so the size can only grow too.
    optimal_weeks = optimal_weeks.max(weeks_needed(total_hours));

    // Phase 5: classify.
    let mut candidates: Vec<Candidate> = selected
        .into_iter()
        .map(|scored| {
            let class = classify(&scored.resource, gaps, role, profile);
            Candidate { scored, class }
        })
        .collect();

    // Phase 6: priority dominates economics.
    candidates.sort_by(placement_order);

    // Phase 7: placement.
    let mut state = PlanState::new(optimal_weeks);
    for candidate in &candidates {
        place_resource(&mut state, candidate);
    }

    // Phases 8–10: empty-week repair strategies.
    let mut ctx = RepairCtx {
        candidates: &mut candidates,
        pool: &mut pool,
        gaps,
        role,
        profile,
    };
    run_repairs(&mut state, &mut ctx);

    // Phase 11: final ordering and response assembly.
    candidates.sort_by(placement_order);
    let total_hours: f64 = candidates.iter().map(|c| c.scored.resource.time).sum();
    let adjustment_note = build_adjustment_note(&state, optimal_weeks);

    let weeks: BTreeMap<u32, Vec<String>> = state
        .weeks
        .iter()
        .enumerate()
        .map(|(i, ids)| (i as u32 + 1, ids.clone()))
        .collect();

    let selected_resources = candidates
        .iter()
        .map(|candidate| {
            let assignment = state
                .assignments
                .get(candidate.id())
                .cloned()
                .unwrap_or(WeekAssignment {
                    weeks: Vec::new(),
                    hours_per_week: 0.0,
                    is_split: false,
                });
            let resource = &candidate.scored.resource;
            PlannedResource {
                id: resource.id.clone(),
                title: resource.title.clone(),
                url: resource.url.clone(),
                kind: resource.kind,
                icon_type: resource.icon_type.clone(),
                time: resource.time,
                benefit: candidate.scored.benefit,
                benefit_per_hour: candidate.scored.benefit_per_hour,
                priority: candidate.class.priority,
                can_skim: candidate.class.can_skim,
                covered_skills: candidate.class.covered_skills.clone(),
                week_assignment: assignment,
            }
        })
        .collect();

    LearningPlan {
        weeks,
        selected_resources,
        total_hours,
        optimal_weeks,
        adjustment_note,
    }
}

/// Minimum weeks for the given hours under the weekly cap, floored at 1.
fn weeks_needed(total_hours: f64) -> u32 {
    ((total_hours / MAX_WEEKLY_HOURS).ceil() as u32).max(1)
}

/// Strict lexicographic placement order: priority rank, then benefit/hour,
/// then benefit, all descending. Stable under equal keys.
pub(super) fn placement_order(a: &Candidate, b: &Candidate) -> std::cmp::Ordering {
    b.class
        .priority
        .rank()
        .cmp(&a.class.priority.rank())
        .then_with(|| {
            b.scored
                .benefit_per_hour
                .partial_cmp(&a.scored.benefit_per_hour)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .then_with(|| {
            b.scored
                .benefit
                .partial_cmp(&a.scored.benefit)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Placement
// ────────────────────────────────────────────────────────────────────────────

fn place_resource(state: &mut PlanState, candidate: &Candidate) {
    if candidate.scored.resource.time > MAX_WEEKLY_HOURS {
        place_split(state, candidate);
    } else {
        place_whole(state, candidate);
    }
}

fn week_scan_order(week_count: u32, forward: bool) -> Vec<u32> {
    if forward {
        (1..=week_count).collect()
    } else {
        (1..=week_count).rev().collect()
    }
}

/// Splits a resource longer than one week across `ceil(time / cap)` weeks of
/// equal hours. Urgent splits fill from the front of the plan; flexible ones
/// from the tail. When too few weeks have capacity, the split wraps into any
/// week not yet holding it, capacity ignored.
fn place_split(state: &mut PlanState, candidate: &Candidate) {
    let time = candidate.scored.resource.time;
    let parts = (time / MAX_WEEKLY_HOURS).ceil() as usize;
    let hours_per_week = time / parts as f64;

    let forward = candidate.class.priority == Priority::High && !candidate.class.can_skim;
    let order = week_scan_order(state.week_count(), forward);

    let mut chosen: Vec<u32> = order
        .iter()
        .copied()
        .filter(|week| state.remaining_in(*week) >= hours_per_week)
        .take(parts)
        .collect();
    if chosen.len() < parts {
        for week in &order {
            if chosen.len() == parts {
                break;
            }
            if !chosen.contains(week) {
                chosen.push(*week);
            }
        }
    }
    chosen.sort_unstable();

    for week in &chosen {
        state.add_to_week(candidate.id(), *week, hours_per_week);
    }
    state.assignments.insert(
        candidate.id().to_string(),
        WeekAssignment {
            weeks: chosen,
            hours_per_week,
            is_split: true,
        },
    );
}

/// Places a resource whole into the first week with room, scanning forward
/// for urgent material and backward for flexible material. When nothing
/// fits, forces into week 1 (high priority) or the last week (otherwise),
/// permitting negative remaining capacity.
fn place_whole(state: &mut PlanState, candidate: &Candidate) {
    let time = candidate.scored.resource.time;
    let backward = candidate.class.priority == Priority::Low || candidate.class.can_skim;
    let order = week_scan_order(state.week_count(), !backward);

    let target = order
        .iter()
        .copied()
        .find(|week| state.remaining_in(*week) >= time)
        .unwrap_or(if candidate.class.priority == Priority::High {
            1
        } else {
            state.week_count()
        });

    state.add_to_week(candidate.id(), target, time);
    state.assignments.insert(
        candidate.id().to_string(),
        WeekAssignment {
            weeks: vec![target],
            hours_per_week: time,
            is_split: false,
        },
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Advisory note
// ────────────────────────────────────────────────────────────────────────────

fn build_adjustment_note(state: &PlanState, optimal_weeks: u32) -> Option<String> {
    let mut notes = Vec::new();

    let overloaded: Vec<String> = (1..=state.week_count())
        .filter(|week| state.remaining_in(*week) < -1e-9)
        .map(|week| week.to_string())
        .collect();
    if !overloaded.is_empty() {
        notes.push(format!(
            "Week(s) {} exceed the {MAX_WEEKLY_HOURS} hour weekly cap; expect a heavier load there.",
            overloaded.join(", ")
        ));
    }
    if optimal_weeks > ADVISORY_WEEK_LIMIT {
        notes.push(format!(
            "The plan spans {optimal_weeks} weeks; consider starting with the high priority resources."
        ));
    }

    if notes.is_empty() {
        None
    } else {
        Some(notes.join(" "))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
