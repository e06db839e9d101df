//! Session composition: one ordered study session blending due reviews
//! with unseen material.
//!
//! The composer is the only part of the engine that touches the store, and
//! it never lets a store failure escape: a failed pool read degrades to an
//! empty pool and the session is built from whatever remains.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::warn;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::ProgressStore;
use crate::types::{DueCandidate, Question, SessionItem, SessionPlan};

/// Extra candidates fetched beyond each pool's target, to allow backfill
/// when the other pool runs short.
const OVERSAMPLE: usize = 5;

/// Chance of inserting a review between new items.
const REVIEW_INSERT_PROBABILITY: f64 = 0.3;

/// Builds study sessions. The random source is injectable so composition
/// is reproducible under test; [`SessionComposer::new`] seeds from entropy
/// for production use.
#[derive(Debug)]
pub struct SessionComposer<R: Rng> {
    rng: R,
}

impl SessionComposer<SmallRng> {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }
}

impl Default for SessionComposer<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SessionComposer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Compose one session for a learner.
    ///
    /// Produces exactly `plan.total_questions` items when supply allows;
    /// fewer, silently, when it does not. Reviews carry a snapshot of the
    /// prior memory state. No two reviews are adjacent except in the
    /// trailing run after the new-item pool is exhausted.
    pub async fn compose<S>(
        &mut self,
        store: &S,
        user: Uuid,
        plan: &SessionPlan,
    ) -> Result<Vec<SessionItem>>
    where
        S: ProgressStore + ?Sized,
    {
        validate_plan(plan)?;

        let review_target = (plan.total_questions as f64 * plan.review_ratio).floor() as usize;
        let new_target = plan.total_questions - review_target;
        let filter = plan.filter();

        let mut due = match store.read_due(user, &filter, review_target + OVERSAMPLE).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(%user, error = %err, "due-candidate read failed, composing without reviews");
                Vec::new()
            }
        };
        let mut unseen = match store.read_unseen(user, &filter, new_target + OVERSAMPLE).await {
            Ok(questions) => questions,
            Err(err) => {
                warn!(%user, error = %err, "unseen-candidate read failed, composing without new items");
                Vec::new()
            }
        };

        // Trim each pool to its target, keeping the surplus for backfill.
        let due_surplus = split_surplus(&mut due, review_target);
        let unseen_surplus = split_surplus(&mut unseen, new_target);

        let review_shortfall = review_target.saturating_sub(due.len());
        if review_shortfall > 0 {
            unseen.extend(unseen_surplus.into_iter().take(review_shortfall));
        }
        let new_shortfall = new_target.saturating_sub(unseen.len());
        if new_shortfall > 0 {
            due.extend(due_surplus.into_iter().take(new_shortfall));
        }

        Ok(self.interleave(due, unseen))
    }

    fn interleave(&mut self, due: Vec<DueCandidate>, unseen: Vec<Question>) -> Vec<SessionItem> {
        let mut reviews: VecDeque<SessionItem> = due
            .into_iter()
            .map(|candidate| SessionItem {
                prior: Some((&candidate.progress).into()),
                question: candidate.question,
                is_review: true,
            })
            .collect();
        let mut fresh: VecDeque<SessionItem> = unseen
            .into_iter()
            .map(|question| SessionItem {
                question,
                is_review: false,
                prior: None,
            })
            .collect();

        let mut session = Vec::with_capacity(reviews.len() + fresh.len());
        let mut last_was_review = false;

        while !reviews.is_empty() || !fresh.is_empty() {
            let take_review = if last_was_review && !fresh.is_empty() {
                // force alternation after a review
                false
            } else if !last_was_review
                && !reviews.is_empty()
                && self.rng.gen_bool(REVIEW_INSERT_PROBABILITY)
            {
                true
            } else if !fresh.is_empty() {
                false
            } else {
                // new items exhausted: drain the remaining reviews
                true
            };

            let popped = if take_review {
                reviews.pop_front()
            } else {
                fresh.pop_front()
            };
            if let Some(item) = popped {
                last_was_review = item.is_review;
                session.push(item);
            }
        }

        session
    }
}

fn validate_plan(plan: &SessionPlan) -> Result<()> {
    if plan.total_questions == 0 {
        return Err(Error::EmptySession);
    }
    if !(0.0..=1.0).contains(&plan.review_ratio) {
        return Err(Error::ReviewRatioOutOfRange(plan.review_ratio));
    }
    Ok(())
}

fn split_surplus<T>(pool: &mut Vec<T>, target: usize) -> Vec<T> {
    if pool.len() > target {
        pool.split_off(target)
    } else {
        Vec::new()
    }
}
