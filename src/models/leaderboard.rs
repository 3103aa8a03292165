// src/models/leaderboard.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::prelude::FromRow;

/// Raw per-ticket aggregation over all answers.
#[derive(Debug, FromRow)]
pub struct ScoreAggregate {
    pub ticket_id: i64,
    pub total_points: i64,
    pub total_answers: i64,
    pub correct_answers: i64,

    /// Earliest answer of the participant; the deterministic tiebreak for
    /// equal point totals.
    pub first_answered_at: DateTime<Utc>,
}

/// Ranked leaderboard row as returned to clients.
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub ticket_id: i64,
    pub guest_name: String,
    pub phone: String,
    pub ticket_type: String,
    pub total_points: i64,
    pub total_answers: i64,
    pub correct_answers: i64,
}
