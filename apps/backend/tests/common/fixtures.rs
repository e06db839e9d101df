//! Test data builders for integration tests.

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use temario_backend::db::Database;
use temario_backend::models::DbQuestion;

/// Build a question row for the bank.
pub fn question(topic: &str, level: Option<i32>) -> DbQuestion {
    DbQuestion {
        id: Uuid::new_v4(),
        topic: Some(topic.to_string()),
        prompt: format!("sample prompt {}", Uuid::new_v4()),
        choices: json!(["option a", "option b", "option c", "option d"]),
        correct_choice: 0,
        explanation: Some("because option a".to_string()),
        level,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Seed `count` active questions under one topic; returns their ids.
pub async fn seed_questions(db: &Database, topic: &str, count: usize) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let q = question(topic, Some(3));
        let inserted = db.insert_question(&q).await.expect("insert question");
        ids.push(inserted.id);
    }
    ids
}

/// Make a question overdue for a user by answering it and backdating the
/// next review.
pub async fn make_overdue(db: &Database, user_id: Uuid, question_id: Uuid, days_overdue: i64) {
    let overdue_at = Utc::now() - Duration::days(days_overdue);
    sqlx::query(
        r#"
        INSERT INTO question_progress (user_id, question_id, times_seen, times_correct,
                                       stability, difficulty, interval_days,
                                       next_review, last_reviewed)
        VALUES ($1, $2, 3, 2, 5.0, 5.0, 5, $3, $4)
        ON CONFLICT (user_id, question_id) DO UPDATE SET next_review = EXCLUDED.next_review
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .bind(overdue_at)
    .bind(overdue_at - Duration::days(5))
    .execute(db.pool())
    .await
    .expect("seed overdue progress");
}

/// JSON body for POST /api/study/answer.
pub fn answer_request(question_id: Uuid, was_correct: bool) -> serde_json::Value {
    json!({
        "question_id": question_id,
        "was_correct": was_correct,
    })
}

/// JSON body for POST /api/study/complete.
pub fn complete_request(answered: u32, correct: u32) -> serde_json::Value {
    json!({
        "answered": answered,
        "correct": correct,
    })
}
