//! Due-set selection: which items need review now, and in what order.
//!
//! Two ranking policies exist on purpose. `OverdueDate` (most overdue
//! first) feeds session composition; `PriorityScore` additionally weighs
//! item difficulty and is meant for dashboard surfaces.

use chrono::{DateTime, Utc};

use crate::model;
use crate::types::ItemProgress;

/// Priority assigned to items with no recorded state.
pub const NEW_ITEM_PRIORITY: f64 = 100.0;

/// Flat boost for items still inside the learning steps.
const LEARNING_BOOST: f64 = 20.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Ranking policy for the due set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DueRanking {
    /// Ascending by `next_review`: the canonical order for composing
    /// sessions.
    #[default]
    OverdueDate,
    /// Descending by [`priority_of`]: difficulty-weighted, for display.
    PriorityScore,
}

/// Priority score for one item; higher means review sooner.
///
/// days overdue x 10, plus a difficulty term (native difficulty x 2, or
/// the legacy ease equivalent), plus a flat boost while the item is still
/// being learned. Unknown items rank highest.
pub fn priority_of(progress: Option<&ItemProgress>, now: DateTime<Utc>) -> f64 {
    let Some(progress) = progress else {
        return NEW_ITEM_PRIORITY;
    };

    let next_review = progress.next_review.unwrap_or(now);
    let days_overdue = (now - next_review).num_seconds() as f64 / SECONDS_PER_DAY;
    let mut priority = days_overdue * 10.0;

    priority += match progress.difficulty {
        Some(difficulty) => difficulty * 2.0,
        None => (model::MAX_EASE - progress.ease_factor.unwrap_or(2.5)) * 5.0,
    };

    if progress.interval <= 3 {
        priority += LEARNING_BOOST;
    }

    priority
}

/// Items currently due, ordered by the requested policy. Entries that have
/// never been scheduled (no `next_review`) are not part of the due set;
/// they surface through the unseen pool instead.
pub fn due_items(
    progress: &[ItemProgress],
    now: DateTime<Utc>,
    ranking: DueRanking,
) -> Vec<ItemProgress> {
    let mut due: Vec<ItemProgress> = progress
        .iter()
        .filter(|p| p.next_review.is_some() && model::is_due(p, now))
        .cloned()
        .collect();

    match ranking {
        DueRanking::OverdueDate => due.sort_by_key(|p| p.next_review),
        DueRanking::PriorityScore => due.sort_by(|a, b| {
            priority_of(Some(b), now).total_cmp(&priority_of(Some(a), now))
        }),
    }

    due
}
