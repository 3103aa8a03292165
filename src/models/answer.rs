// src/models/answer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'answers' table in the database.
///
/// At most one row exists per (question_id, ticket_id); the unique index
/// enforces it even under concurrent duplicate submissions. Rows are written
/// once and never mutated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,

    /// The answering participant's ticket in the external directory.
    pub ticket_id: i64,

    pub phone: String,

    /// Raw submitted text, kept as received.
    pub answer_text: String,

    pub is_correct: bool,

    /// 0-100; always 100 for exact/MCQ matches.
    pub similarity_score: f64,

    pub points_earned: i32,
    pub is_late: bool,
    pub answered_at: DateTime<Utc>,
}

/// DTO for an answer arriving from the messaging channel.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 20))]
    pub phone: String,

    pub question_id: i64,

    #[validate(length(min = 1, max = 2000))]
    pub answer_text: String,

    /// Display name reported by the channel; propagated to the ticket when
    /// the directory has none yet.
    #[serde(default)]
    pub sender_name: String,
}

/// Outcome relayed back through the messaging channel.
///
/// Domain rejections (unknown question, no ticket, duplicate, expired) are
/// reported with `success: false` and a descriptive message rather than an
/// HTTP error, so the channel can forward the message to the participant.
#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_late: Option<bool>,
}

impl SubmitAnswerResponse {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            is_correct: None,
            similarity_score: None,
            points_earned: None,
            is_late: None,
        }
    }

    pub fn recorded(
        message: String,
        is_correct: bool,
        similarity_score: f64,
        points_earned: i32,
        is_late: bool,
    ) -> Self {
        Self {
            success: true,
            message,
            is_correct: Some(is_correct),
            similarity_score: Some(similarity_score),
            points_earned: Some(points_earned),
            is_late: Some(is_late),
        }
    }
}

/// Answer row joined with the guest name, as listed per question.
#[derive(Debug, Serialize, FromRow)]
pub struct AnswerDetail {
    pub id: i64,
    pub guest_name: Option<String>,
    pub phone: String,
    pub answer_text: String,
    pub is_correct: bool,
    pub similarity_score: f64,
    pub points_earned: i32,
    pub is_late: bool,
    pub answered_at: DateTime<Utc>,
}

/// Answer row joined with its question, as listed per participant.
#[derive(Debug, Serialize, FromRow)]
pub struct ParticipantAnswer {
    pub question_text: String,
    pub question_type: String,
    pub answer_text: String,
    pub is_correct: bool,
    pub similarity_score: f64,
    pub points_earned: i32,
    pub is_late: bool,
    pub answered_at: DateTime<Utc>,
}
