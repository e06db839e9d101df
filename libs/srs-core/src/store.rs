//! The persistence boundary.
//!
//! The engine is backend-agnostic: everything durable goes through this
//! trait. Implementations own connection management, timeouts, and
//! retries; the core performs a single attempt per call.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{CandidateFilter, DueCandidate, ItemProgress, Question};

/// Storage operations required by the scheduler.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// All memory traces for a learner.
    async fn read_all_progress(&self, user: Uuid) -> Result<Vec<ItemProgress>, StoreError>;

    /// Due review candidates joined with their question content, most
    /// overdue first.
    async fn read_due(
        &self,
        user: Uuid,
        filter: &CandidateFilter,
        limit: usize,
    ) -> Result<Vec<DueCandidate>, StoreError>;

    /// Questions this learner has never answered.
    async fn read_unseen(
        &self,
        user: Uuid,
        filter: &CandidateFilter,
        limit: usize,
    ) -> Result<Vec<Question>, StoreError>;

    /// Insert or replace the trace for (user, question). Returns the
    /// persisted row.
    async fn upsert_progress(&self, progress: &ItemProgress) -> Result<ItemProgress, StoreError>;

    /// Merge deltas into the learner's daily aggregate. Implementations
    /// should make this increment atomic so concurrent sessions cannot
    /// lose counts.
    async fn record_daily_activity(
        &self,
        user: Uuid,
        date: NaiveDate,
        answered_delta: u32,
        correct_delta: u32,
    ) -> Result<(), StoreError>;
}
