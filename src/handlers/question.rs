// src/handlers/question.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{
        ActiveQuestionResponse, CreateQuestionRequest, Question, QuestionOption, QuestionSummary,
    },
    state::AppState,
    targeting::{self, TargetSpec},
};

async fn fetch_options(pool: &PgPool, question_id: i64) -> Result<Vec<QuestionOption>, AppError> {
    let options = sqlx::query_as(
        "SELECT id, question_id, label, text, is_correct \
         FROM question_options WHERE question_id = $1 ORDER BY label",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;
    Ok(options)
}

/// Lists all questions with their options and answer counts.
/// Stale active questions are expired before listing.
pub async fn list_questions(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    Question::expire_stale(&pool).await?;

    let questions: Vec<Question> = sqlx::query_as(
        "SELECT id, text, question_type, correct_answer, points, time_limit_seconds, \
                status, target_groups, accept_late, sent_at, expires_at, created_at \
         FROM questions ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await?;

    let mut summaries = Vec::with_capacity(questions.len());
    for q in questions {
        let options = fetch_options(&pool, q.id).await?;

        let (answer_count, correct_count): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_correct) \
             FROM answers WHERE question_id = $1",
        )
        .bind(q.id)
        .fetch_one(&pool)
        .await?;

        summaries.push(QuestionSummary {
            id: q.id,
            text: q.text,
            question_type: q.question_type,
            correct_answer: q.correct_answer,
            points: q.points,
            time_limit_seconds: q.time_limit_seconds,
            status: q.status,
            target_groups: q.target_groups.0,
            accept_late: q.accept_late,
            options,
            answer_count,
            correct_count,
            sent_at: q.sent_at,
            expires_at: q.expires_at,
            created_at: q.created_at,
        });
    }

    Ok(Json(serde_json::json!({ "questions": summaries })))
}

/// Creates a new question in DRAFT status.
pub async fn create_question(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.question_type == "mcq" && payload.correct_answer.trim().is_empty() {
        return Err(AppError::BadRequest(
            "An MCQ question requires a correct answer".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO questions \
         (text, question_type, correct_answer, points, time_limit_seconds, target_groups, accept_late) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(&payload.text)
    .bind(&payload.question_type)
    .bind(&payload.correct_answer)
    .bind(payload.points)
    .bind(payload.time_limit_seconds)
    .bind(sqlx::types::Json(&payload.target_groups))
    .bind(payload.accept_late)
    .fetch_one(&mut *tx)
    .await?;

    if payload.question_type == "mcq" {
        for opt in &payload.options {
            sqlx::query(
                "INSERT INTO question_options (question_id, label, text, is_correct) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(&opt.label)
            .bind(&opt.text)
            .bind(opt.is_correct)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Deletes a question by ID (options and answers cascade).
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Builds the outbound message for a question: the body, the rendered MCQ
/// options, the reply instruction and the time budget.
pub(crate) fn build_question_message(question: &Question, options: &[QuestionOption]) -> String {
    let mut msg = format!("Quiz question:\n\n{}\n", question.text);

    if question.question_type == "mcq" {
        msg.push('\n');
        for opt in options {
            msg.push_str(&format!("  {}) {}\n", opt.label, opt.text));
        }
        msg.push_str("\nReply with the letter of your answer (e.g. A)\n");
    } else {
        msg.push_str("\nReply with your answer in a single message\n");
    }

    msg.push_str(&format!(
        "You have {} seconds to answer",
        question.time_limit_seconds
    ));
    msg
}

/// Activates a question and dispatches it to the targeted participants.
///
/// Fails if the question is already active or no recipients resolve; in
/// both cases no state changes. Delivery itself is detached work: the
/// response confirms activation, per-recipient failures are only logged.
pub async fn send_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let pool = &state.pool;
    Question::expire_stale(pool).await?;

    let question = Question::find(pool, id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if question.status == "active" {
        return Err(AppError::Conflict(
            "Question is already active".to_string(),
        ));
    }

    let options = fetch_options(pool, question.id).await?;
    let message = build_question_message(&question, &options);

    let specs = TargetSpec::parse_all(&question.target_groups.0);
    let phones = targeting::resolve_phones(pool, &specs).await?;
    if phones.is_empty() {
        return Err(AppError::BadRequest(
            "No participants matched the question targets".to_string(),
        ));
    }

    let sent_at = Utc::now();
    let expires_at = sent_at + Duration::seconds(i64::from(question.time_limit_seconds));

    sqlx::query(
        "UPDATE questions SET status = 'active', sent_at = $1, expires_at = $2 WHERE id = $3",
    )
    .bind(sent_at)
    .bind(expires_at)
    .bind(question.id)
    .execute(pool)
    .await?;

    let queued_count = phones.len();
    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        let total = phones.len();
        for (i, phone) in phones.iter().enumerate() {
            dispatcher.send_message(phone, &message).await;
            tracing::debug!("Question {} dispatch {}/{}", id, i + 1, total);
        }
        tracing::info!("Question {} dispatch finished: {} recipients", id, total);
    });

    Ok(Json(serde_json::json!({
        "queued_count": queued_count,
        "expires_at": expires_at,
    })))
}

/// Forces a question to EXPIRED regardless of time remaining.
pub async fn expire_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE questions SET status = 'expired' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "status": "expired" })))
}

/// Returns the currently active question, if any, for the messaging channel
/// to route incoming replies. Stale state is expired first.
pub async fn get_active_question(
    State(pool): State<PgPool>,
) -> Result<impl IntoResponse, AppError> {
    Question::expire_stale(&pool).await?;

    let active: Option<Question> = sqlx::query_as(
        "SELECT id, text, question_type, correct_answer, points, time_limit_seconds, \
                status, target_groups, accept_late, sent_at, expires_at, created_at \
         FROM questions WHERE status = 'active' ORDER BY sent_at DESC LIMIT 1",
    )
    .fetch_optional(&pool)
    .await?;

    let response = match active {
        None => ActiveQuestionResponse::none(),
        Some(q) => ActiveQuestionResponse {
            has_active: true,
            question_id: Some(q.id),
            question_type: Some(q.question_type),
            expires_at: q.expires_at,
        },
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json as SqlJson;

    fn question(question_type: &str, text: &str, time_limit_seconds: i32) -> Question {
        Question {
            id: 1,
            text: text.to_string(),
            question_type: question_type.to_string(),
            correct_answer: "A".to_string(),
            points: 10,
            time_limit_seconds,
            status: "draft".to_string(),
            target_groups: SqlJson(vec!["all".to_string()]),
            accept_late: false,
            sent_at: None,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    fn option(label: &str, text: &str) -> QuestionOption {
        QuestionOption {
            id: 0,
            question_id: 1,
            label: label.to_string(),
            text: text.to_string(),
            is_correct: false,
        }
    }

    #[test]
    fn mcq_message_renders_options_and_instruction() {
        let q = question("mcq", "Capital of Egypt?", 60);
        let opts = vec![option("A", "Cairo"), option("B", "Alexandria")];

        let msg = build_question_message(&q, &opts);
        assert!(msg.contains("Capital of Egypt?"));
        assert!(msg.contains("A) Cairo"));
        assert!(msg.contains("B) Alexandria"));
        assert!(msg.contains("Reply with the letter"));
        assert!(msg.contains("60 seconds"));
    }

    #[test]
    fn completion_message_asks_for_free_text() {
        let q = question("completion", "Event name?", 90);

        let msg = build_question_message(&q, &[]);
        assert!(msg.contains("Event name?"));
        assert!(msg.contains("Reply with your answer"));
        assert!(!msg.contains("letter"));
        assert!(msg.contains("90 seconds"));
    }
}
