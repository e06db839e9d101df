//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up the test environment with a database
//! - Helper functions for creating test data
//! - Identity-header helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL).

pub mod fixtures;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use srs_core::SchedulerParams;
use temario_backend::db::Database;
use temario_backend::routes;
use temario_backend::services::progress::ProgressService;
use temario_backend::AppState;

/// Test context containing database connection and test server.
///
/// Requires the DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);
        let progress = Arc::new(
            ProgressService::new(db.clone(), SchedulerParams::default())
                .expect("default scheduler parameters are valid"),
        );

        let state = AppState {
            db: db.clone(),
            progress,
        };

        let app = build_test_router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Fresh learner identity for a test.
    pub fn new_test_user() -> Uuid {
        Uuid::new_v4()
    }

    /// Clean up test data for a user and the given questions.
    pub async fn cleanup(&self, user_id: Uuid, question_ids: &[Uuid]) {
        let _ = sqlx::query("DELETE FROM question_progress WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM daily_activity WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM question_progress WHERE question_id = ANY($1)")
            .bind(question_ids)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM questions WHERE id = ANY($1)")
            .bind(question_ids)
            .execute(self.db.pool())
            .await;
    }
}

/// Build the test router with all routes.
fn build_test_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/study/session", get(routes::study::session))
        .route("/api/study/answer", post(routes::study::answer))
        .route("/api/study/complete", post(routes::study::complete))
        .route("/api/study/stats", get(routes::stats::stats))
        .route("/api/study/activity", get(routes::stats::activity))
        .layer(middleware::from_fn(routes::auth::auth_middleware));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(protected_routes)
        .with_state(state)
}
