// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        leaderboard::{LeaderboardEntry, ScoreAggregate},
        ticket::DirectoryTicket,
    },
    targeting::{self, TargetSpec},
};

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// Optional filter with the targeting vocabulary: "all", "VIP",
    /// "Student" or "group:<id>".
    pub group: Option<String>,
}

/// Computes the ranked leaderboard.
///
/// Points, answer counts and correct counts are aggregated per ticket over
/// all answers; the group filter excludes tickets after aggregation. Ties
/// on points break on the earliest first answer, then ticket id, and ranks
/// are assigned on the filtered list.
pub async fn get_leaderboard(
    State(pool): State<PgPool>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = match params.group.as_deref() {
        None | Some("all") => None,
        Some(raw) => match TargetSpec::parse(raw) {
            Some(TargetSpec::All) => None,
            Some(spec) => Some(spec),
            // user-composed filters never error; an unknown one selects nobody
            None => {
                return Ok(Json(serde_json::json!({ "leaderboard": [] })));
            }
        },
    };

    let aggregates: Vec<ScoreAggregate> = sqlx::query_as(
        "SELECT a.ticket_id, \
                COALESCE(SUM(a.points_earned), 0)::BIGINT AS total_points, \
                COUNT(a.id) AS total_answers, \
                COUNT(a.id) FILTER (WHERE a.is_correct) AS correct_answers, \
                MIN(a.answered_at) AS first_answered_at \
         FROM answers a \
         GROUP BY a.ticket_id",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to aggregate leaderboard: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let mut rows: Vec<(ScoreAggregate, DirectoryTicket)> = Vec::new();
    for agg in aggregates {
        let Some(ticket) = DirectoryTicket::find_by_id(&pool, agg.ticket_id).await? else {
            continue;
        };

        match filter {
            Some(TargetSpec::ByType(kind)) if ticket.ticket_type != kind.as_str() => continue,
            Some(TargetSpec::ByGroup(group_id)) => {
                if !targeting::is_group_member(&pool, group_id, ticket.id).await? {
                    continue;
                }
            }
            _ => {}
        }

        rows.push((agg, ticket));
    }

    rows.sort_by(|(a, _), (b, _)| {
        b.total_points
            .cmp(&a.total_points)
            .then(a.first_answered_at.cmp(&b.first_answered_at))
            .then(a.ticket_id.cmp(&b.ticket_id))
    });

    let leaderboard: Vec<LeaderboardEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, (agg, ticket))| {
            let guest_name = match ticket.guest_name.as_deref() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => ticket.phone.clone(),
            };
            LeaderboardEntry {
                rank: (i + 1) as i64,
                ticket_id: agg.ticket_id,
                guest_name,
                phone: ticket.phone,
                ticket_type: ticket.ticket_type,
                total_points: agg.total_points,
                total_answers: agg.total_answers,
                correct_answers: agg.correct_answers,
            }
        })
        .collect();

    Ok(Json(serde_json::json!({ "leaderboard": leaderboard })))
}
