use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::evaluation::EvaluationRow;

/// Creates and returns a SQLite connection pool.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite database at {database_url}");

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates the evaluations table if it does not exist. Called once at startup.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS evaluations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            role TEXT NOT NULL,
            alignment REAL NOT NULL,
            readiness REAL NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Persists an evaluation summary row and returns its id.
pub async fn insert_evaluation(
    pool: &SqlitePool,
    role: &str,
    alignment: f64,
    readiness: f64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO evaluations (role, alignment, readiness) VALUES ($1, $2, $3)",
    )
    .bind(role)
    .bind(alignment)
    .bind(readiness)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Returns the most recent evaluation summaries, newest first.
pub async fn list_evaluations(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<EvaluationRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM evaluations ORDER BY id DESC LIMIT $1")
        .bind(limit)
        .fetch_all(pool)
        .await
}
