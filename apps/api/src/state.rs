use std::sync::Arc;

use sqlx::SqlitePool;

use crate::catalog::Catalog;

/// Shared application state injected into all route handlers via Axum
/// extractors. The catalog is the only cross-request data and is read-only,
/// so concurrent requests read it lock-free behind the `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub catalog: Arc<Catalog>,
}
