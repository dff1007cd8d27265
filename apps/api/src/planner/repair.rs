//! Empty-week repair — an ordered list of bounded strategies, applied until
//! every week holds something or the list is exhausted. Not a backtracking
//! search: each pass makes local moves and the plan size never shrinks.
//!
//! Order: relocate a flexible resource, then move-or-split anything, then
//! backfill from the unselected pool. A repair never empties the week it
//! takes from, so a week can stay empty only when all three passes run dry.

use std::collections::BTreeMap;

use crate::catalog::RoleDef;
use crate::evaluation::engine::GapMap;
use crate::planner::allocator::{Candidate, PlanState, WeekAssignment, MAX_WEEKLY_HOURS};
use crate::planner::priority::{classify, Priority};
use crate::planner::scoring::ScoredResource;

/// Everything the repair passes may touch besides the packing state.
pub(super) struct RepairCtx<'a> {
    pub candidates: &'a mut Vec<Candidate>,
    pub pool: &'a mut Vec<ScoredResource>,
    pub gaps: &'a GapMap,
    pub role: &'a RoleDef,
    pub profile: &'a BTreeMap<String, f64>,
}

type Strategy = fn(&mut PlanState, &mut RepairCtx);

pub(super) fn run_repairs(state: &mut PlanState, ctx: &mut RepairCtx) {
    let strategies: [Strategy; 3] = [relocate_flexible, move_or_split, backfill_unselected];
    for strategy in strategies {
        if state.empty_weeks().is_empty() {
            return;
        }
        strategy(state, ctx);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 1: relocate a low-priority or skim-eligible resource
// ────────────────────────────────────────────────────────────────────────────

fn relocate_flexible(state: &mut PlanState, ctx: &mut RepairCtx) {
    for empty in state.empty_weeks() {
        if let Some((id, source, hours)) = find_movable(state, ctx, empty, true) {
            move_whole(state, &id, source, empty, hours);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 2: move any whole resource that fits, or split a large one in half
// ────────────────────────────────────────────────────────────────────────────

fn move_or_split(state: &mut PlanState, ctx: &mut RepairCtx) {
    for empty in state.empty_weeks() {
        if let Some((id, source, hours)) = find_movable(state, ctx, empty, false) {
            move_whole(state, &id, source, empty, hours);
            continue;
        }

        // No whole move possible: seed the week with half of a large
        // single-week allocation. Half stays behind, so the donor week
        // cannot become the next hole.
        if let Some((id, source, hours)) = find_splittable(state) {
            let half = hours / 2.0;
            state.remaining[source as usize - 1] += half;
            state.add_to_week(&id, empty, half);

            if let Some(assignment) = state.assignments.get_mut(&id) {
                let mut weeks = vec![source, empty];
                weeks.sort_unstable();
                assignment.weeks = weeks;
                assignment.hours_per_week = half;
                assignment.is_split = true;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pass 3: backfill from the unselected beneficial pool
// ────────────────────────────────────────────────────────────────────────────

fn backfill_unselected(state: &mut PlanState, ctx: &mut RepairCtx) {
    for empty in state.empty_weeks() {
        // Pool is already ordered best benefit/hour first.
        let Some(position) = ctx
            .pool
            .iter()
            .position(|entry| entry.resource.time <= state.remaining_in(empty))
        else {
            continue;
        };

        let scored = ctx.pool.remove(position);
        let class = classify(&scored.resource, ctx.gaps, ctx.role, ctx.profile);
        let id = scored.resource.id.clone();

        state.add_to_week(&id, empty, scored.resource.time);
        state.assignments.insert(
            id,
            WeekAssignment {
                weeks: vec![empty],
                hours_per_week: scored.resource.time,
                is_split: false,
            },
        );
        ctx.candidates.push(Candidate { scored, class });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Finds, in week order, a whole (non-split) resource that fits the empty
/// week and whose donor week keeps at least one other resource.
fn find_movable(
    state: &PlanState,
    ctx: &RepairCtx,
    empty: u32,
    flexible_only: bool,
) -> Option<(String, u32, f64)> {
    for week in 1..=state.week_count() {
        if week == empty || state.weeks[week as usize - 1].len() < 2 {
            continue;
        }
        for id in &state.weeks[week as usize - 1] {
            let assignment = &state.assignments[id];
            if assignment.is_split || assignment.hours_per_week > state.remaining_in(empty) {
                continue;
            }
            if flexible_only && !is_flexible(ctx, id) {
                continue;
            }
            return Some((id.clone(), week, assignment.hours_per_week));
        }
    }
    None
}

/// Finds a whole single-week allocation consuming more than half the weekly
/// cap — large enough that halving it meaningfully seeds an empty week.
fn find_splittable(state: &PlanState) -> Option<(String, u32, f64)> {
    for week in 1..=state.week_count() {
        for id in &state.weeks[week as usize - 1] {
            let assignment = &state.assignments[id];
            if !assignment.is_split && assignment.hours_per_week > MAX_WEEKLY_HOURS / 2.0 {
                return Some((id.clone(), week, assignment.hours_per_week));
            }
        }
    }
    None
}

fn is_flexible(ctx: &RepairCtx, id: &str) -> bool {
    ctx.candidates
        .iter()
        .any(|c| c.id() == id && (c.class.priority == Priority::Low || c.class.can_skim))
}

fn move_whole(state: &mut PlanState, id: &str, source: u32, target: u32, hours: f64) {
    state.remove_from_week(id, source, hours);
    state.add_to_week(id, target, hours);
    if let Some(assignment) = state.assignments.get_mut(id) {
        assignment.weeks = vec![target];
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
