//! PostgreSQL database operations

use chrono::{NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use srs_core::CandidateFilter;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Question Repository ===

    /// Insert a question into the bank
    pub async fn insert_question(&self, question: &DbQuestion) -> Result<DbQuestion> {
        let inserted = sqlx::query_as::<_, DbQuestion>(
            r#"
            INSERT INTO questions (id, topic, prompt, choices, correct_choice,
                                   explanation, level, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, topic, prompt, choices, correct_choice, explanation,
                      level, is_active, created_at, updated_at
            "#,
        )
        .bind(question.id)
        .bind(&question.topic)
        .bind(&question.prompt)
        .bind(&question.choices)
        .bind(question.correct_choice)
        .bind(&question.explanation)
        .bind(question.level)
        .bind(question.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    /// Get a question by ID
    pub async fn get_question(&self, question_id: Uuid) -> Result<Option<DbQuestion>> {
        let question = sqlx::query_as::<_, DbQuestion>(
            r#"
            SELECT id, topic, prompt, choices, correct_choice, explanation,
                   level, is_active, created_at, updated_at
            FROM questions
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    // === Progress Repository ===

    /// Get the memory trace for one (user, question) pair
    pub async fn get_progress(&self, user_id: Uuid, question_id: Uuid) -> Result<Option<DbProgress>> {
        let progress = sqlx::query_as::<_, DbProgress>(
            r#"
            SELECT id, user_id, question_id, times_seen, times_correct, lapses,
                   stability, difficulty, ease_factor, interval_days,
                   next_review, last_reviewed, created_at, updated_at
            FROM question_progress
            WHERE user_id = $1 AND question_id = $2
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progress)
    }

    /// Get all memory traces for a user
    pub async fn get_all_progress(&self, user_id: Uuid) -> Result<Vec<DbProgress>> {
        let progress = sqlx::query_as::<_, DbProgress>(
            r#"
            SELECT id, user_id, question_id, times_seen, times_correct, lapses,
                   stability, difficulty, ease_factor, interval_days,
                   next_review, last_reviewed, created_at, updated_at
            FROM question_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(progress)
    }

    /// Upsert the memory trace for one (user, question) pair
    pub async fn upsert_progress(&self, progress: &ItemProgress) -> Result<DbProgress> {
        let saved = sqlx::query_as::<_, DbProgress>(
            r#"
            INSERT INTO question_progress (user_id, question_id, times_seen, times_correct,
                                           lapses, stability, difficulty, ease_factor,
                                           interval_days, next_review, last_reviewed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, question_id) DO UPDATE SET
                times_seen = EXCLUDED.times_seen,
                times_correct = EXCLUDED.times_correct,
                lapses = EXCLUDED.lapses,
                stability = EXCLUDED.stability,
                difficulty = EXCLUDED.difficulty,
                ease_factor = EXCLUDED.ease_factor,
                interval_days = EXCLUDED.interval_days,
                next_review = EXCLUDED.next_review,
                last_reviewed = EXCLUDED.last_reviewed,
                updated_at = NOW()
            RETURNING id, user_id, question_id, times_seen, times_correct, lapses,
                      stability, difficulty, ease_factor, interval_days,
                      next_review, last_reviewed, created_at, updated_at
            "#,
        )
        .bind(progress.user_id)
        .bind(progress.question_id)
        .bind(progress.times_seen as i32)
        .bind(progress.times_correct as i32)
        .bind(progress.lapses as i32)
        .bind(progress.stability)
        .bind(progress.difficulty)
        .bind(progress.ease_factor)
        .bind(progress.interval as i32)
        .bind(progress.next_review)
        .bind(progress.last_reviewed)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    // === Candidate Pools ===

    /// Due review candidates joined with question content, most overdue
    /// first
    pub async fn get_due_candidates(
        &self,
        user_id: Uuid,
        filter: &CandidateFilter,
        limit: i64,
    ) -> Result<Vec<DbDueRow>> {
        let now = Utc::now();
        let rows = sqlx::query_as::<_, DbDueRow>(
            r#"
            SELECT p.user_id, p.question_id, p.times_seen, p.times_correct, p.lapses,
                   p.stability, p.difficulty, p.ease_factor, p.interval_days,
                   p.next_review, p.last_reviewed,
                   q.topic, q.prompt, q.choices, q.correct_choice, q.explanation, q.level
            FROM question_progress p
            JOIN questions q ON q.id = p.question_id AND q.is_active
            WHERE p.user_id = $1
              AND p.next_review IS NOT NULL
              AND p.next_review <= $2
              AND ($3::text IS NULL OR q.topic = $3)
            ORDER BY p.next_review
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(now)
        .bind(&filter.topic)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Questions the user has never answered. When a target level is set,
    /// questions closest to it come first.
    pub async fn get_unseen_questions(
        &self,
        user_id: Uuid,
        filter: &CandidateFilter,
        limit: i64,
    ) -> Result<Vec<DbQuestion>> {
        let rows = sqlx::query_as::<_, DbQuestion>(
            r#"
            SELECT q.id, q.topic, q.prompt, q.choices, q.correct_choice, q.explanation,
                   q.level, q.is_active, q.created_at, q.updated_at
            FROM questions q
            LEFT JOIN question_progress p
              ON p.question_id = q.id AND p.user_id = $1
            WHERE q.is_active
              AND p.id IS NULL
              AND ($2::text IS NULL OR q.topic = $2)
            ORDER BY
                CASE WHEN $3::int IS NULL THEN 0
                     ELSE ABS(COALESCE(q.level, 3) - $3) END,
                q.created_at
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(&filter.topic)
        .bind(filter.level)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // === Daily Activity ===

    /// Merge deltas into the daily aggregate. The increment happens in the
    /// database so concurrent sessions cannot lose counts.
    pub async fn upsert_daily_activity(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        answered_delta: u32,
        correct_delta: u32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_activity (user_id, activity_date, answered, correct)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, activity_date) DO UPDATE SET
                answered = daily_activity.answered + EXCLUDED.answered,
                correct = daily_activity.correct + EXCLUDED.correct,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(answered_delta as i32)
        .bind(correct_delta as i32)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Daily aggregates on or after a date, oldest first
    pub async fn get_daily_activity_since(
        &self,
        user_id: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<DbDailyActivity>> {
        let rows = sqlx::query_as::<_, DbDailyActivity>(
            r#"
            SELECT user_id, activity_date, answered, correct
            FROM daily_activity
            WHERE user_id = $1 AND activity_date >= $2
            ORDER BY activity_date
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
