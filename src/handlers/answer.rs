// src/handlers/answer.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        answer::{AnswerDetail, ParticipantAnswer, SubmitAnswerRequest, SubmitAnswerResponse},
        question::Question,
        ticket::DirectoryTicket,
    },
    scoring,
    state::AppState,
    utils::phone::canonicalize_phone,
};

/// Accepts an answer from the messaging channel.
///
/// The write path is idempotent: one Answer row per (question, ticket),
/// enforced by the duplicate pre-check and, under concurrent duplicate
/// submissions, by the unique index - the losing writer gets the same
/// "already answered" outcome instead of a duplicate row.
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let pool = &state.pool;
    Question::expire_stale(pool).await?;

    let Some(question) = Question::find(pool, payload.question_id).await? else {
        return Ok(Json(SubmitAnswerResponse::rejected("Question not found")));
    };

    let phone = canonicalize_phone(&payload.phone, &state.config.phone_country_code);
    let Some(ticket) = DirectoryTicket::find_active_by_phone(pool, &phone).await? else {
        return Ok(Json(SubmitAnswerResponse::rejected(
            "No active ticket found for this participant",
        )));
    };

    let already_answered: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM answers WHERE question_id = $1 AND ticket_id = $2")
            .bind(question.id)
            .bind(ticket.id)
            .fetch_optional(pool)
            .await?;
    if already_answered.is_some() {
        return Ok(Json(SubmitAnswerResponse::rejected("Already answered")));
    }

    let is_late = question
        .expires_at
        .is_some_and(|expires_at| Utc::now() > expires_at);
    if is_late && !question.accept_late {
        return Ok(Json(SubmitAnswerResponse::rejected(
            "Time is up for this question",
        )));
    }

    let evaluation = scoring::evaluate(
        state.scorer.as_ref(),
        &payload.answer_text,
        &question.correct_answer,
        &question.question_type,
        state.config.similarity_threshold,
    );

    // late answers are recorded but never rewarded
    let points_earned = if evaluation.is_correct && !is_late {
        question.points
    } else {
        0
    };

    let insert = sqlx::query(
        "INSERT INTO answers \
         (question_id, ticket_id, phone, answer_text, is_correct, similarity_score, points_earned, is_late) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(question.id)
    .bind(ticket.id)
    .bind(&phone)
    .bind(&payload.answer_text)
    .bind(evaluation.is_correct)
    .bind(evaluation.similarity_score)
    .bind(points_earned)
    .bind(is_late)
    .execute(pool)
    .await;

    if let Err(e) = insert {
        // the losing side of a concurrent duplicate submission
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return Ok(Json(SubmitAnswerResponse::rejected("Already answered")));
            }
        }
        return Err(e.into());
    }

    if !payload.sender_name.is_empty()
        && ticket.guest_name.as_deref().unwrap_or("").is_empty()
    {
        DirectoryTicket::set_guest_name_if_empty(pool, ticket.id, &payload.sender_name).await?;
    }

    let mut message = if evaluation.is_correct {
        format!("Correct! +{} points", points_earned)
    } else {
        format!(
            "Incorrect. The right answer was: {}",
            question.correct_answer
        )
    };
    if is_late {
        message.push_str("\n(Received after the time limit - not counted)");
    }

    tracing::info!(
        "Answer recorded: question={} ticket={} correct={} score={} late={}",
        question.id,
        ticket.id,
        evaluation.is_correct,
        evaluation.similarity_score,
        is_late
    );

    Ok(Json(SubmitAnswerResponse::recorded(
        message,
        evaluation.is_correct,
        evaluation.similarity_score,
        points_earned,
        is_late,
    )))
}

/// Lists all answers for a question, with summary counts.
pub async fn get_question_answers(
    State(pool): State<PgPool>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = Question::find(&pool, question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let answers: Vec<AnswerDetail> = sqlx::query_as(
        "SELECT a.id, t.guest_name, a.phone, a.answer_text, a.is_correct, \
                a.similarity_score, a.points_earned, a.is_late, a.answered_at \
         FROM answers a \
         LEFT JOIN tickets t ON t.id = a.ticket_id \
         WHERE a.question_id = $1 \
         ORDER BY a.answered_at ASC",
    )
    .bind(question_id)
    .fetch_all(&pool)
    .await?;

    let correct = answers.iter().filter(|a| a.is_correct).count();

    Ok(Json(serde_json::json!({
        "question": {
            "id": question.id,
            "text": question.text,
            "correct_answer": question.correct_answer,
            "question_type": question.question_type,
        },
        "total": answers.len(),
        "correct": correct,
        "answers": answers,
    })))
}

/// Lists all answers of one participant, with the running point total.
pub async fn get_participant_results(
    State(pool): State<PgPool>,
    Path(ticket_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = DirectoryTicket::find_by_id(&pool, ticket_id)
        .await?
        .ok_or(AppError::NotFound("Participant not found".to_string()))?;

    let answers: Vec<ParticipantAnswer> = sqlx::query_as(
        "SELECT q.text AS question_text, q.question_type, a.answer_text, a.is_correct, \
                a.similarity_score, a.points_earned, a.is_late, a.answered_at \
         FROM answers a \
         JOIN questions q ON q.id = a.question_id \
         WHERE a.ticket_id = $1 \
         ORDER BY a.answered_at ASC",
    )
    .bind(ticket_id)
    .fetch_all(&pool)
    .await?;

    let total_points: i64 = answers.iter().map(|a| i64::from(a.points_earned)).sum();

    Ok(Json(serde_json::json!({
        "participant": {
            "ticket_id": ticket.id,
            "guest_name": ticket.guest_name,
            "phone": ticket.phone,
            "ticket_type": ticket.ticket_type,
        },
        "total_points": total_points,
        "answers": answers,
    })))
}
