// src/models/question.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The text content of the question.
    pub text: String,

    /// Question type: 'mcq' or 'completion'.
    pub question_type: String,

    /// The choice letter for MCQ questions, free text for completion.
    pub correct_answer: String,

    pub points: i32,
    pub time_limit_seconds: i32,

    /// Lifecycle status: 'draft', 'active' or 'expired'.
    pub status: String,

    /// Targeting specifiers, e.g. ["all"] or ["VIP", "group:5"].
    /// Stored as a JSON array in the database.
    pub target_groups: Json<Vec<String>>,

    /// Whether answers arriving after expiry are still recorded.
    pub accept_late: bool,

    pub sent_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, text, question_type, correct_answer, points, time_limit_seconds, \
                    status, target_groups, accept_late, sent_at, expires_at, created_at \
             FROM questions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Flips every stale ACTIVE question to EXPIRED.
    ///
    /// The single place the time-based transition happens; every read/write
    /// entry point that cares about freshness calls it first. Idempotent:
    /// concurrent callers racing on the same stale question both succeed.
    pub async fn expire_stale(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE questions SET status = 'expired' \
             WHERE status = 'active' AND expires_at < NOW()",
        )
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!("Expired {} stale question(s)", result.rows_affected());
        }
        Ok(result.rows_affected())
    }
}

/// Represents the 'question_options' table (MCQ choices).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,

    /// Single choice letter, unique within the question.
    pub label: String,

    pub text: String,
    pub is_correct: bool,
}

/// Option payload inside a question-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOptionRequest {
    pub label: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,

    #[validate(custom(function = validate_question_type))]
    pub question_type: String,

    #[validate(length(max = 500))]
    pub correct_answer: String,

    #[serde(default = "default_points")]
    #[validate(range(min = 0))]
    pub points: i32,

    #[serde(default = "default_time_limit")]
    #[validate(range(min = 1))]
    pub time_limit_seconds: i32,

    #[serde(default = "default_target_groups")]
    pub target_groups: Vec<String>,

    #[serde(default)]
    pub accept_late: bool,

    /// MCQ choices; ignored for completion questions.
    #[serde(default)]
    #[validate(custom(function = validate_options))]
    pub options: Vec<CreateOptionRequest>,
}

fn default_points() -> i32 {
    1
}

fn default_time_limit() -> i32 {
    60
}

fn default_target_groups() -> Vec<String> {
    vec!["all".to_string()]
}

fn validate_question_type(question_type: &str) -> Result<(), validator::ValidationError> {
    match question_type {
        "mcq" | "completion" => Ok(()),
        _ => Err(validator::ValidationError::new("unknown_question_type")),
    }
}

fn validate_options(options: &[CreateOptionRequest]) -> Result<(), validator::ValidationError> {
    for opt in options {
        let mut chars = opt.label.chars();
        match (chars.next(), chars.next()) {
            (Some('A'..='D'), None) => {}
            _ => {
                return Err(validator::ValidationError::new(
                    "label_must_be_a_single_choice_letter",
                ));
            }
        }
        if opt.text.is_empty() || opt.text.len() > 500 {
            return Err(validator::ValidationError::new("option_text_length"));
        }
    }
    Ok(())
}

/// Question row enriched with options and answer counts, as listed to admins.
#[derive(Debug, Serialize)]
pub struct QuestionSummary {
    pub id: i64,
    pub text: String,
    pub question_type: String,
    pub correct_answer: String,
    pub points: i32,
    pub time_limit_seconds: i32,
    pub status: String,
    pub target_groups: Vec<String>,
    pub accept_late: bool,
    pub options: Vec<QuestionOption>,
    pub answer_count: i64,
    pub correct_count: i64,
    pub sent_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Response for the channel-wide "what's active now" query.
#[derive(Debug, Serialize)]
pub struct ActiveQuestionResponse {
    pub has_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ActiveQuestionResponse {
    pub fn none() -> Self {
        Self {
            has_active: false,
            question_id: None,
            question_type: None,
            expires_at: None,
        }
    }
}
