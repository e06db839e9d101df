//! Review scheduling: computes the next review date and interval for an
//! item from its memory state and the latest answer.
//!
//! Three regimes, chosen by the item's history:
//! 1. first answer: memory parameters seeded from the configured initials
//! 2. learning: fixed steps walked through until graduation
//! 3. review: interval derived from stability at the desired retention

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model;
use crate::types::{ItemProgress, ReviewUpdate, SchedulerParams};

/// Scheduler with validated parameters.
#[derive(Debug, Clone)]
pub struct ReviewScheduler {
    params: SchedulerParams,
}

impl ReviewScheduler {
    /// Build a scheduler, rejecting invalid parameters. Bad tuning is a
    /// programmer error and fails construction rather than surfacing later
    /// as nonsense intervals.
    pub fn new(params: SchedulerParams) -> Result<Self> {
        if !(params.desired_retention > 0.0 && params.desired_retention < 1.0) {
            return Err(Error::RetentionOutOfRange(params.desired_retention));
        }
        let [first, second] = params.learning_steps;
        if first < 1 || second <= first {
            return Err(Error::InvalidLearningSteps(params.learning_steps));
        }
        if params.min_interval < 1 || params.max_interval < params.min_interval {
            return Err(Error::InvalidIntervalBounds {
                min: params.min_interval,
                max: params.max_interval,
            });
        }
        if params.graduation_interval <= second {
            return Err(Error::InvalidGraduationInterval);
        }
        if params.initial_stability_good <= 0.0 || params.initial_stability_again <= 0.0 {
            return Err(Error::InvalidStabilitySeed);
        }
        for seed in [params.initial_difficulty_good, params.initial_difficulty_again] {
            if !(model::MIN_DIFFICULTY..=model::MAX_DIFFICULTY).contains(&seed) {
                return Err(Error::InvalidDifficultySeed);
            }
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &SchedulerParams {
        &self.params
    }

    /// Compute the scheduling result for one answer.
    ///
    /// `progress` is the state before this answer, `None` for an item never
    /// answered by this learner. The returned phase is recomputed from the
    /// new interval and seen-count.
    pub fn next_review(
        &self,
        progress: Option<&ItemProgress>,
        was_correct: bool,
        now: DateTime<Utc>,
    ) -> ReviewUpdate {
        let times_seen = progress.map(|p| p.times_seen).unwrap_or(0);

        let (stability, difficulty, interval) = match progress {
            Some(prior) => match self.resolve_memory(prior) {
                Some((stability, difficulty)) if self.in_learning(prior) => {
                    self.learning_step(prior, stability, difficulty, was_correct)
                }
                Some((stability, difficulty)) => {
                    self.review_step(stability, difficulty, was_correct)
                }
                None => self.first_answer(was_correct),
            },
            None => self.first_answer(was_correct),
        };

        let interval = interval.clamp(self.params.min_interval, self.params.max_interval);
        ReviewUpdate {
            next_review: now + Duration::days(interval),
            interval,
            stability,
            difficulty,
            phase: model::phase_from_interval(interval, times_seen + 1),
        }
    }

    /// Full state transition for one answer: scheduling plus counters.
    /// This is the single mutation consumed by callers; the result is what
    /// gets persisted.
    pub fn apply(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        progress: Option<&ItemProgress>,
        was_correct: bool,
        now: DateTime<Utc>,
    ) -> ItemProgress {
        let update = self.next_review(progress, was_correct, now);
        let (times_seen, times_correct, lapses) = progress
            .map(|p| (p.times_seen, p.times_correct, p.lapses))
            .unwrap_or((0, 0, 0));

        ItemProgress {
            user_id,
            question_id,
            times_seen: times_seen + 1,
            times_correct: times_correct + u32::from(was_correct),
            lapses: if was_correct { lapses } else { lapses + 1 },
            stability: Some(update.stability),
            difficulty: Some(update.difficulty),
            // native parameters supersede the legacy representation
            ease_factor: None,
            interval: update.interval,
            next_review: Some(update.next_review),
            last_reviewed: Some(now),
        }
    }

    /// Resolve the memory parameters of an existing record, filling gaps on
    /// legacy rows from the ease/interval conversions. `None` means the
    /// record has no usable memory trace and schedules as a first answer.
    fn resolve_memory(&self, progress: &ItemProgress) -> Option<(f64, f64)> {
        if progress.times_seen == 0 {
            return None;
        }
        let difficulty = progress
            .difficulty
            .or_else(|| progress.ease_factor.map(model::difficulty_from_ease));
        let stability = progress.stability.or_else(|| {
            progress.ease_factor.map(|_| {
                model::stability_from_interval(progress.interval, self.params.desired_retention)
            })
        });
        match (stability, difficulty) {
            (Some(s), Some(d)) => Some((s.max(model::MIN_STABILITY), d)),
            (Some(s), None) => Some((
                s.max(model::MIN_STABILITY),
                self.params.initial_difficulty_good,
            )),
            _ => None,
        }
    }

    fn in_learning(&self, progress: &ItemProgress) -> bool {
        let [_, last_step] = self.params.learning_steps;
        progress.times_seen <= 3 && progress.interval <= last_step
    }

    fn first_answer(&self, was_correct: bool) -> (f64, f64, i64) {
        if was_correct {
            (
                self.params.initial_stability_good,
                self.params.initial_difficulty_good,
                self.params.learning_steps[0],
            )
        } else {
            (
                self.params.initial_stability_again,
                self.params.initial_difficulty_again,
                self.params.min_interval,
            )
        }
    }

    fn learning_step(
        &self,
        prior: &ItemProgress,
        stability: f64,
        difficulty: f64,
        was_correct: bool,
    ) -> (f64, f64, i64) {
        let difficulty = model::next_difficulty(difficulty, was_correct);
        if was_correct {
            let stability =
                model::next_stability_correct(stability, difficulty, self.params.desired_retention);
            let [first_step, second_step] = self.params.learning_steps;
            let interval = if prior.interval <= first_step {
                second_step
            } else {
                self.params.graduation_interval
            };
            (stability, difficulty, interval)
        } else {
            let stability = model::next_stability_incorrect(stability, difficulty);
            (stability, difficulty, self.params.min_interval)
        }
    }

    fn review_step(&self, stability: f64, difficulty: f64, was_correct: bool) -> (f64, f64, i64) {
        let difficulty = model::next_difficulty(difficulty, was_correct);
        let stability = if was_correct {
            model::next_stability_correct(stability, difficulty, self.params.desired_retention)
        } else {
            model::next_stability_incorrect(stability, difficulty)
        };
        let interval = model::interval_from_stability(stability, self.params.desired_retention);
        (stability, difficulty, interval)
    }
}

impl Default for ReviewScheduler {
    fn default() -> Self {
        Self::new(SchedulerParams::default()).expect("default parameters are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemoryPhase;
    use chrono::Duration;

    fn scheduler() -> ReviewScheduler {
        ReviewScheduler::default()
    }

    fn seen_progress(times_seen: u32, interval: i64, stability: f64, difficulty: f64) -> ItemProgress {
        ItemProgress {
            times_seen,
            times_correct: times_seen,
            stability: Some(stability),
            difficulty: Some(difficulty),
            interval,
            ..ItemProgress::new(Uuid::new_v4(), Uuid::new_v4())
        }
    }

    #[test]
    fn rejects_retention_outside_unit_interval() {
        for retention in [0.0, 1.0, 1.5, -0.1] {
            let params = SchedulerParams {
                desired_retention: retention,
                ..SchedulerParams::default()
            };
            assert!(ReviewScheduler::new(params).is_err());
        }
    }

    #[test]
    fn rejects_descending_learning_steps() {
        let params = SchedulerParams {
            learning_steps: [3, 1],
            ..SchedulerParams::default()
        };
        assert!(ReviewScheduler::new(params).is_err());
    }

    #[test]
    fn rejects_inverted_interval_bounds() {
        let params = SchedulerParams {
            min_interval: 10,
            max_interval: 5,
            ..SchedulerParams::default()
        };
        assert!(ReviewScheduler::new(params).is_err());
    }

    #[test]
    fn first_answer_correct_seeds_learning() {
        let now = Utc::now();
        let update = scheduler().next_review(None, true, now);

        assert_eq!(update.stability, 2.4);
        assert_eq!(update.difficulty, 5.0);
        assert_eq!(update.interval, 1);
        assert_eq!(update.phase, MemoryPhase::Learning);
        assert_eq!(update.next_review, now + Duration::days(1));
    }

    #[test]
    fn first_answer_incorrect_seeds_hard_item() {
        let now = Utc::now();
        let update = scheduler().next_review(None, false, now);

        assert_eq!(update.stability, 0.4);
        assert_eq!(update.difficulty, 7.0);
        assert_eq!(update.interval, 1);
        assert_eq!(update.phase, MemoryPhase::Learning);
    }

    #[test]
    fn learning_advances_through_steps_then_graduates() {
        let now = Utc::now();
        let sched = scheduler();

        // after the first step, a correct answer moves to the second step
        let at_first = seen_progress(1, 1, 2.4, 5.0);
        let update = sched.next_review(Some(&at_first), true, now);
        assert_eq!(update.interval, 3);

        // from the second step, a correct answer graduates
        let at_second = seen_progress(2, 3, update.stability, update.difficulty);
        let update = sched.next_review(Some(&at_second), true, now);
        assert_eq!(update.interval, 7);
        assert_eq!(update.phase, MemoryPhase::Review);
    }

    #[test]
    fn learning_failure_resets_to_min_interval() {
        let now = Utc::now();
        let at_second = seen_progress(2, 3, 3.0, 5.0);
        let update = scheduler().next_review(Some(&at_second), false, now);

        assert_eq!(update.interval, 1);
        assert!(update.stability < 3.0);
        assert!(update.difficulty > 5.0);
    }

    #[test]
    fn graduated_item_masters_on_long_stability() {
        let now = Utc::now();
        let graduated = seen_progress(10, 40, 40.0, 5.0);
        let update = scheduler().next_review(Some(&graduated), true, now);

        assert!(update.stability >= 44.0);
        assert!(update.interval > 30);
        assert_eq!(update.phase, MemoryPhase::Mastered);
    }

    #[test]
    fn review_failure_shrinks_interval() {
        let now = Utc::now();
        let graduated = seen_progress(10, 40, 40.0, 5.0);
        let update = scheduler().next_review(Some(&graduated), false, now);

        assert!(update.stability < 40.0);
        assert!(update.interval < 40);
        assert!(update.difficulty > 5.0);
    }

    #[test]
    fn interval_clamped_to_configured_maximum() {
        let now = Utc::now();
        let long_lived = seen_progress(50, 365, 2000.0, 2.0);
        let update = scheduler().next_review(Some(&long_lived), true, now);

        assert_eq!(update.interval, 365);
        assert_eq!(update.next_review, now + Duration::days(365));
    }

    #[test]
    fn next_review_always_now_plus_interval() {
        let now = Utc::now();
        let sched = scheduler();
        for (progress, was_correct) in [
            (None, true),
            (None, false),
            (Some(seen_progress(1, 1, 2.4, 5.0)), true),
            (Some(seen_progress(5, 14, 14.0, 6.0)), false),
        ] {
            let update = sched.next_review(progress.as_ref(), was_correct, now);
            assert_eq!(update.next_review, now + Duration::days(update.interval));
        }
    }

    #[test]
    fn legacy_ease_record_schedules_without_migration() {
        let now = Utc::now();
        let legacy = ItemProgress {
            times_seen: 8,
            times_correct: 6,
            ease_factor: Some(2.1),
            interval: 12,
            ..ItemProgress::new(Uuid::new_v4(), Uuid::new_v4())
        };

        let update = scheduler().next_review(Some(&legacy), true, now);

        // converted stability (12 days at r=0.9) grows by at least 10%
        assert!(update.stability >= 12.0 * 1.1 - 1e-9);
        assert!(update.interval > 12);
        assert!((0.0..=10.0).contains(&update.difficulty));
    }

    #[test]
    fn apply_increments_counters_and_stamps_review_time() {
        let now = Utc::now();
        let user = Uuid::new_v4();
        let question = Uuid::new_v4();
        let sched = scheduler();

        let first = sched.apply(user, question, None, true, now);
        assert_eq!(first.times_seen, 1);
        assert_eq!(first.times_correct, 1);
        assert_eq!(first.lapses, 0);
        assert_eq!(first.last_reviewed, Some(now));
        assert_eq!(first.next_review, Some(now + Duration::days(first.interval)));

        let later = now + Duration::days(1);
        let second = sched.apply(user, question, Some(&first), false, later);
        assert_eq!(second.times_seen, 2);
        assert_eq!(second.times_correct, 1);
        assert_eq!(second.lapses, 1);
        assert_eq!(second.last_reviewed, Some(later));
    }

    #[test]
    fn apply_drops_legacy_ease_once_native_fields_exist() {
        let now = Utc::now();
        let legacy = ItemProgress {
            times_seen: 4,
            times_correct: 3,
            ease_factor: Some(1.9),
            interval: 9,
            ..ItemProgress::new(Uuid::new_v4(), Uuid::new_v4())
        };

        let next = scheduler().apply(legacy.user_id, legacy.question_id, Some(&legacy), true, now);

        assert!(next.ease_factor.is_none());
        assert!(next.stability.is_some());
        assert!(next.difficulty.is_some());
    }
}
