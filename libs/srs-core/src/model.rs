//! Memory model: phase classification and the stability/difficulty update
//! rules.
//!
//! Pure functions over [`ItemProgress`]. The two memory parameters follow
//! the DSR family of models:
//! - Stability (S): days until recall probability decays to the desired
//!   retention threshold
//! - Difficulty (D): 0-10 scalar, higher = harder
//!
//! Legacy records that only carry a 1.3-3.0 ease factor are converted to
//! these parameters on the fly; no migration pass is required.

use chrono::{DateTime, Utc};

use crate::types::{ItemProgress, MemoryPhase};

/// Stability never drops below this many days.
pub const MIN_STABILITY: f64 = 0.4;

/// Difficulty bounds.
pub const MIN_DIFFICULTY: f64 = 0.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

/// A correct answer never grows stability by less than this factor.
pub const MIN_STABILITY_GROWTH: f64 = 1.1;

/// Legacy ease factor bounds (SM-2 heritage).
pub const MIN_EASE: f64 = 1.3;
pub const MAX_EASE: f64 = 3.0;

/// Grades on the five-point answer scale. A plain correct answer rates
/// Good, an incorrect one rates Again; the in-between grades are not
/// produced by the binary outcome but anchor the difficulty formula.
const GRADE_AGAIN: f64 = 1.0;
const GRADE_GOOD: f64 = 4.0;
const GRADE_MIDPOINT: f64 = 3.0;
const DIFFICULTY_STEP: f64 = 0.3;

/// Classify an item's memory phase from its progress.
///
/// The phase is always derived, never trusted from storage:
/// - no history -> New
/// - seen at most twice with a short interval -> Learning
/// - interval beyond 30 days -> Mastered
/// - otherwise -> Review
pub fn phase_of(progress: Option<&ItemProgress>) -> MemoryPhase {
    match progress {
        None => MemoryPhase::New,
        Some(p) if p.times_seen == 0 => MemoryPhase::New,
        Some(p) => phase_from_interval(p.interval, p.times_seen),
    }
}

/// Phase for a freshly computed interval and seen-count.
pub fn phase_from_interval(interval: i64, times_seen: u32) -> MemoryPhase {
    if times_seen <= 2 && interval <= 3 {
        MemoryPhase::Learning
    } else if interval > 30 {
        MemoryPhase::Mastered
    } else {
        MemoryPhase::Review
    }
}

/// Whether an item is due for review. Items without a scheduled review are
/// always due.
pub fn is_due(progress: &ItemProgress, now: DateTime<Utc>) -> bool {
    match progress.next_review {
        None => true,
        Some(next) => next <= now,
    }
}

/// Difficulty update for one answer.
///
/// D' = D - 0.3 * (grade - 3), clamped to [0, 10]. Correct answers lower
/// difficulty, incorrect answers raise it.
pub fn next_difficulty(difficulty: f64, was_correct: bool) -> f64 {
    let grade = if was_correct { GRADE_GOOD } else { GRADE_AGAIN };
    let next = difficulty - DIFFICULTY_STEP * (grade - GRADE_MIDPOINT);
    next.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Stability update after a successful recall.
///
/// factor = e^0.1 * (11 - D) * S^-0.2 * (e^(0.05 * (1 - r)) - 1)
/// S' = S * max(1.1, factor)
///
/// A correct answer never shrinks stability; it grows by at least 10%.
pub fn next_stability_correct(stability: f64, difficulty: f64, desired_retention: f64) -> f64 {
    let factor = 0.1_f64.exp()
        * (11.0 - difficulty)
        * stability.powf(-0.2)
        * ((0.05 * (1.0 - desired_retention)).exp() - 1.0);
    stability * factor.max(MIN_STABILITY_GROWTH)
}

/// Stability update after a lapse.
///
/// S' = S * max(1, D)^-0.3, floored at 0.4 days. Failure degrades or at
/// best preserves stability.
pub fn next_stability_incorrect(stability: f64, difficulty: f64) -> f64 {
    (stability * difficulty.max(1.0).powf(-0.3)).max(MIN_STABILITY)
}

/// Map a legacy SM-2 ease factor onto the difficulty scale. The mapping is
/// linear and direction-inverting: ease 3.0 -> difficulty 0, ease 1.3 ->
/// difficulty 10.
pub fn difficulty_from_ease(ease: f64) -> f64 {
    let span = MAX_EASE - MIN_EASE;
    ((MAX_EASE - ease) / span * MAX_DIFFICULTY).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Inverse of [`difficulty_from_ease`].
pub fn ease_from_difficulty(difficulty: f64) -> f64 {
    let span = MAX_EASE - MIN_EASE;
    (MAX_EASE - difficulty / MAX_DIFFICULTY * span).clamp(MIN_EASE, MAX_EASE)
}

/// Recover a stability from a stored interval by inverting the interval
/// formula at the desired retention.
pub fn stability_from_interval(interval: i64, desired_retention: f64) -> f64 {
    let spread = 9.0 * (1.0 / desired_retention - 1.0);
    (interval.max(1) as f64 / spread).max(MIN_STABILITY)
}

/// Optimal interval for a stability at the desired retention:
/// I = round(S * 9 * (1/r - 1)). Unclamped; the scheduler applies the
/// configured bounds.
pub fn interval_from_stability(stability: f64, desired_retention: f64) -> i64 {
    (stability * 9.0 * (1.0 / desired_retention - 1.0)).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn progress(times_seen: u32, interval: i64) -> ItemProgress {
        ItemProgress {
            times_seen,
            times_correct: times_seen,
            interval,
            ..ItemProgress::new(Uuid::new_v4(), Uuid::new_v4())
        }
    }

    #[test]
    fn no_history_is_new() {
        assert_eq!(phase_of(None), MemoryPhase::New);
        assert_eq!(phase_of(Some(&progress(0, 0))), MemoryPhase::New);
    }

    #[test]
    fn phase_boundaries() {
        // interval 3 keeps a twice-seen item in learning; 4 does not
        assert_eq!(phase_from_interval(3, 2), MemoryPhase::Learning);
        assert_eq!(phase_from_interval(4, 2), MemoryPhase::Review);

        // seen-count boundary at a short interval
        assert_eq!(phase_from_interval(3, 2), MemoryPhase::Learning);
        assert_eq!(phase_from_interval(3, 3), MemoryPhase::Review);

        // mastery starts strictly above 30 days
        assert_eq!(phase_from_interval(30, 5), MemoryPhase::Review);
        assert_eq!(phase_from_interval(31, 5), MemoryPhase::Mastered);
    }

    #[test]
    fn due_when_no_next_review() {
        let p = progress(1, 1);
        assert!(is_due(&p, Utc::now()));
    }

    #[test]
    fn due_only_once_next_review_passes() {
        let now = Utc::now();
        let mut p = progress(1, 1);

        p.next_review = Some(now + Duration::hours(1));
        assert!(!is_due(&p, now));

        p.next_review = Some(now);
        assert!(is_due(&p, now));

        p.next_review = Some(now - Duration::days(2));
        assert!(is_due(&p, now));
    }

    #[test]
    fn correct_answer_lowers_difficulty() {
        assert!(next_difficulty(5.0, true) < 5.0);
    }

    #[test]
    fn incorrect_answer_raises_difficulty() {
        assert!(next_difficulty(5.0, false) > 5.0);
    }

    #[test]
    fn difficulty_stays_in_bounds_over_long_runs() {
        let mut d = 5.0;
        for _ in 0..1000 {
            d = next_difficulty(d, false);
            assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d));
        }
        for _ in 0..1000 {
            d = next_difficulty(d, true);
            assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d));
        }
    }

    #[test]
    fn correct_answer_grows_stability_at_least_ten_percent() {
        for &s in &[MIN_STABILITY, 1.0, 5.0, 40.0, 200.0] {
            for &d in &[0.0, 3.0, 5.0, 10.0] {
                let next = next_stability_correct(s, d, 0.9);
                assert!(
                    next >= s * MIN_STABILITY_GROWTH - 1e-9,
                    "stability {s} difficulty {d} grew to {next}"
                );
            }
        }
    }

    #[test]
    fn incorrect_answer_never_grows_stability() {
        for &s in &[MIN_STABILITY, 1.0, 5.0, 40.0, 200.0] {
            for &d in &[0.0, 1.0, 5.0, 10.0] {
                let next = next_stability_incorrect(s, d);
                assert!(next <= s + 1e-9);
                assert!(next >= MIN_STABILITY);
            }
        }
    }

    #[test]
    fn failed_easy_item_keeps_its_stability() {
        // difficulty below 1 collapses the exponent base to 1
        let next = next_stability_incorrect(5.0, 0.5);
        assert!((next - 5.0).abs() < 1e-9);
    }

    #[test]
    fn stability_floor_holds_after_repeated_lapses() {
        let mut s = 2.0;
        for _ in 0..50 {
            s = next_stability_incorrect(s, 10.0);
        }
        assert!((s - MIN_STABILITY).abs() < 1e-9);
    }

    #[test]
    fn ease_conversion_endpoints() {
        assert!((difficulty_from_ease(MAX_EASE) - MIN_DIFFICULTY).abs() < 1e-9);
        assert!((difficulty_from_ease(MIN_EASE) - MAX_DIFFICULTY).abs() < 1e-9);
        assert!((ease_from_difficulty(MIN_DIFFICULTY) - MAX_EASE).abs() < 1e-9);
        assert!((ease_from_difficulty(MAX_DIFFICULTY) - MIN_EASE).abs() < 1e-9);
    }

    #[test]
    fn ease_conversion_round_trips() {
        for &ease in &[1.3, 1.8, 2.5, 3.0] {
            let back = ease_from_difficulty(difficulty_from_ease(ease));
            assert!((back - ease).abs() < 1e-9);
        }
    }

    #[test]
    fn interval_conversion_is_identity_at_default_retention() {
        // at r = 0.9 the spread factor is exactly 1.0
        assert_eq!(interval_from_stability(44.0, 0.9), 44);
        assert!((stability_from_interval(44, 0.9) - 44.0).abs() < 1e-9);
    }

    #[test]
    fn interval_shrinks_as_retention_rises() {
        let relaxed = interval_from_stability(10.0, 0.8);
        let strict = interval_from_stability(10.0, 0.95);
        assert!(strict < relaxed);
    }
}
