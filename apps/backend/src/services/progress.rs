//! Progress service: adapts the database to the core `ProgressStore`
//! boundary and applies answer outcomes through the scheduler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use srs_core::{
    CandidateFilter, DueCandidate, ItemProgress, ProgressStore, Question, ReviewScheduler,
    SchedulerParams, StoreError,
};

use crate::db::Database;
use crate::error::{ApiError, Result};

#[async_trait]
impl ProgressStore for Database {
    async fn read_all_progress(&self, user: Uuid) -> std::result::Result<Vec<ItemProgress>, StoreError> {
        let rows = self
            .get_all_progress(user)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows.iter().map(|row| row.to_core()).collect())
    }

    async fn read_due(
        &self,
        user: Uuid,
        filter: &CandidateFilter,
        limit: usize,
    ) -> std::result::Result<Vec<DueCandidate>, StoreError> {
        let rows = self
            .get_due_candidates(user, filter, limit as i64)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows.iter().map(|row| row.to_core()).collect())
    }

    async fn read_unseen(
        &self,
        user: Uuid,
        filter: &CandidateFilter,
        limit: usize,
    ) -> std::result::Result<Vec<Question>, StoreError> {
        let rows = self
            .get_unseen_questions(user, filter, limit as i64)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows.iter().map(|row| row.to_core()).collect())
    }

    async fn upsert_progress(
        &self,
        progress: &ItemProgress,
    ) -> std::result::Result<ItemProgress, StoreError> {
        let saved = Database::upsert_progress(self, progress)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(saved.to_core())
    }

    async fn record_daily_activity(
        &self,
        user: Uuid,
        date: NaiveDate,
        answered_delta: u32,
        correct_delta: u32,
    ) -> std::result::Result<(), StoreError> {
        self.upsert_daily_activity(user, date, answered_delta, correct_delta)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

/// Applies answer outcomes and session completions for the routes.
pub struct ProgressService {
    db: Arc<Database>,
    scheduler: ReviewScheduler,
}

/// Result of applying one answer.
pub struct AppliedAnswer {
    pub progress: ItemProgress,
    pub saved: bool,
}

impl ProgressService {
    pub fn new(db: Arc<Database>, params: SchedulerParams) -> srs_core::Result<Self> {
        Ok(Self {
            db,
            scheduler: ReviewScheduler::new(params)?,
        })
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    /// Apply one outcome to the (user, question) trace and persist it.
    ///
    /// The transition is derived purely from the current state plus the
    /// outcome, so a retry after a lost write is safe. A failed write is
    /// logged and reported through `saved`; the computed state is returned
    /// either way so the session can continue.
    pub async fn submit_answer(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        was_correct: bool,
    ) -> Result<AppliedAnswer> {
        let now = Utc::now();

        if self.db.get_question(question_id).await?.is_none() {
            return Err(ApiError::NotFound("Question not found".to_string()));
        }

        let current = self
            .db
            .get_progress(user_id, question_id)
            .await?
            .map(|row| row.to_core());

        let next = self
            .scheduler
            .apply(user_id, question_id, current.as_ref(), was_correct, now);

        match ProgressStore::upsert_progress(self.db.as_ref(), &next).await {
            Ok(saved) => Ok(AppliedAnswer {
                progress: saved,
                saved: true,
            }),
            Err(err) => {
                tracing::warn!(%user_id, %question_id, error = %err, "progress write lost");
                Ok(AppliedAnswer {
                    progress: next,
                    saved: false,
                })
            }
        }
    }

    /// Merge a finished session into today's activity aggregate.
    pub async fn complete_session(&self, user_id: Uuid, answered: u32, correct: u32) -> bool {
        let today = Utc::now().date_naive();
        match self
            .db
            .upsert_daily_activity(user_id, today, answered, correct)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "daily aggregate write lost");
                false
            }
        }
    }
}
