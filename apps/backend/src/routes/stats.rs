//! Dashboard statistics endpoints

use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;
use srs_core::stats;

/// GET /api/study/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<StatsResponse>> {
    let now = Utc::now();
    let today = now.date_naive();

    let progress: Vec<ItemProgress> = state
        .db
        .get_all_progress(auth.user_id)
        .await?
        .iter()
        .map(|row| row.to_core())
        .collect();

    let activity: Vec<DailyActivity> = state
        .db
        .get_daily_activity_since(auth.user_id, today - Duration::days(30))
        .await?
        .iter()
        .map(|row| row.to_core())
        .collect();

    Ok(Json(StatsResponse {
        summary: stats::StudySummary::from_progress(&progress, now),
        streak: stats::study_streak(&activity, today),
        recommended_level: stats::recommend_level(&progress),
    }))
}

/// GET /api/study/activity
///
/// Last seven days of activity, zero-filled for chart display.
pub async fn activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ActivityResponse>> {
    let today = Utc::now().date_naive();
    let week_ago = today - Duration::days(6);

    let recorded = state
        .db
        .get_daily_activity_since(auth.user_id, week_ago)
        .await?;

    let days = (0..7)
        .map(|offset| {
            let date = week_ago + Duration::days(offset);
            let entry = recorded.iter().find(|row| row.activity_date == date);
            DayActivity {
                date,
                answered: entry.map(|r| r.answered.max(0) as u32).unwrap_or(0),
                correct: entry.map(|r| r.correct.max(0) as u32).unwrap_or(0),
            }
        })
        .collect();

    Ok(Json(ActivityResponse { days }))
}
