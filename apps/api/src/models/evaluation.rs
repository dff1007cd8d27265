use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted evaluation summary: one row per POST /evaluate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationRow {
    pub id: i64,
    pub role: String,
    pub alignment: f64,
    pub readiness: f64,
    pub created_at: NaiveDateTime,
}
