// src/models/group.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'quiz_groups' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizGroup {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Group member joined with its ticket and phone, as listed to admins.
#[derive(Debug, Serialize, FromRow)]
pub struct GroupMemberDetail {
    pub ticket_id: i64,
    pub guest_name: Option<String>,
    pub phone: String,
    pub ticket_type: String,
}

/// Group with resolved membership.
#[derive(Debug, Serialize)]
pub struct GroupDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub member_count: usize,
    pub members: Vec<GroupMemberDetail>,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating or updating a group; the membership list replaces the
/// existing one wholesale.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertGroupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub ticket_ids: Vec<i64>,
}
