//! Study endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;
use srs_core::SessionComposer;

/// GET /api/study/session
///
/// Compose one hybrid study session. Short candidate supply yields a
/// shorter session, never an error.
pub async fn session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SessionResponse>> {
    let mut plan = SessionPlan::new(query.total.unwrap_or(20));
    if let Some(ratio) = query.review_ratio {
        plan.review_ratio = ratio;
    }
    plan.topic = query.topic;
    plan.level = query.level;

    let items = SessionComposer::new()
        .compose(state.db.as_ref(), auth.user_id, &plan)
        .await?;

    let review_count = items.iter().filter(|item| item.is_review).count();
    Ok(Json(SessionResponse {
        requested: plan.total_questions,
        review_count,
        new_count: items.len() - review_count,
        items,
    }))
}

/// POST /api/study/answer
///
/// Apply one outcome to the learner's memory trace. The outcome is
/// consumed exactly once; the response carries the updated state.
pub async fn answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    let applied = state
        .progress
        .submit_answer(auth.user_id, payload.question_id, payload.was_correct)
        .await?;

    let phase = srs_core::model::phase_of(Some(&applied.progress));
    Ok(Json(AnswerResponse {
        progress: applied.progress,
        phase,
        saved: applied.saved,
    }))
}

/// POST /api/study/complete
///
/// Fold a finished session into today's activity aggregate.
pub async fn complete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<CompleteSessionRequest>,
) -> Result<Json<CompleteSessionResponse>> {
    let recorded = state
        .progress
        .complete_session(auth.user_id, payload.answered, payload.correct)
        .await;

    Ok(Json(CompleteSessionResponse { recorded }))
}
