use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::SkillRequirement;
use crate::db::{insert_evaluation, list_evaluations};
use crate::errors::AppError;
use crate::evaluation::engine::{evaluate, GapMap};
use crate::evaluation::{Diagnostic, EvaluationError};
use crate::models::evaluation::EvaluationRow;
use crate::planner::allocator::{build_plan, LearningPlan};
use crate::planner::scoring::score_resources;
use crate::state::AppState;

const HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub role: String,
    /// Skill → proficiency, either a number in [0, 1] or a label.
    pub student_profile: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub evaluation_id: i64,
    pub role: String,
    pub alignment_score: f64,
    pub readiness_score: f64,
    pub top_gaps: Vec<(String, f64)>,
    pub gaps: GapMap,
    /// Full requirement map so the UI can explain priorities and weights.
    pub role_requirements: BTreeMap<String, SkillRequirement>,
    pub warnings: Vec<Diagnostic>,
    pub plan: LearningPlan,
}

/// POST /api/v1/evaluate
///
/// Runs the full pipeline — normalize, evaluate, score, allocate — against
/// request-local state, persists the summary row, and returns both the
/// evaluation and the plan.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, AppError> {
    if req.student_profile.is_empty() {
        return Err(AppError::Validation(
            "student_profile must contain at least one skill".to_string(),
        ));
    }
    let role = state
        .catalog
        .role(&req.role)
        .ok_or_else(|| EvaluationError::UnknownRole(req.role.clone()))?;

    let outcome = evaluate(&req.student_profile, &req.role, &state.catalog)?;
    for diagnostic in &outcome.diagnostics {
        let Diagnostic::UnknownSkillDropped { skill } = diagnostic;
        warn!("Ignoring unknown skill in student profile: {skill}");
    }

    let scored = score_resources(&state.catalog.resources, &outcome.result.gaps);
    let plan = build_plan(
        &scored,
        &outcome.result.gaps,
        role,
        &outcome.normalized_profile,
    );

    let evaluation_id = insert_evaluation(
        &state.db,
        &req.role,
        outcome.result.alignment_score,
        outcome.result.readiness_score,
    )
    .await?;

    info!(
        "Evaluated role={} alignment={:.3} readiness={:.3} weeks={}",
        req.role, outcome.result.alignment_score, outcome.result.readiness_score,
        plan.optimal_weeks
    );

    Ok(Json(EvaluateResponse {
        evaluation_id,
        role: outcome.result.role,
        alignment_score: outcome.result.alignment_score,
        readiness_score: outcome.result.readiness_score,
        top_gaps: outcome.result.top_gaps,
        gaps: outcome.result.gaps,
        role_requirements: role.skills.clone(),
        warnings: outcome.diagnostics,
        plan,
    }))
}

#[derive(Debug, Serialize)]
pub struct RoleCard {
    pub id: String,
    pub label: String,
    pub description: String,
    pub icon: String,
    pub skills: Vec<String>,
}

/// GET /api/v1/roles
///
/// Role cards for the selection UI, derived from the catalog.
pub async fn handle_list_roles(State(state): State<AppState>) -> Json<Vec<RoleCard>> {
    let cards = state
        .catalog
        .roles
        .iter()
        .map(|(name, role)| RoleCard {
            id: name.clone(),
            label: role.label.clone(),
            description: role.description.clone(),
            icon: role.icon.clone(),
            skills: role.skills.keys().cloned().collect(),
        })
        .collect();
    Json(cards)
}

/// GET /api/v1/history
pub async fn handle_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<EvaluationRow>>, AppError> {
    let rows = list_evaluations(&state.db, HISTORY_LIMIT).await?;
    Ok(Json(rows))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
