// src/handlers/group.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::group::{GroupDetail, GroupMemberDetail, QuizGroup, UpsertGroupRequest},
};

async fn fetch_members(pool: &PgPool, group_id: i64) -> Result<Vec<GroupMemberDetail>, AppError> {
    let members = sqlx::query_as(
        "SELECT t.id AS ticket_id, t.guest_name, c.phone, t.ticket_type \
         FROM quiz_group_members m \
         JOIN tickets t ON t.id = m.ticket_id \
         JOIN customers c ON c.id = t.customer_id \
         WHERE m.group_id = $1 \
         ORDER BY t.id",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;
    Ok(members)
}

/// Lists all quiz groups with their resolved members.
pub async fn list_groups(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let groups: Vec<QuizGroup> = sqlx::query_as(
        "SELECT id, name, description, created_at FROM quiz_groups ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await?;

    let mut details = Vec::with_capacity(groups.len());
    for g in groups {
        let members = fetch_members(&pool, g.id).await?;
        details.push(GroupDetail {
            id: g.id,
            name: g.name,
            description: g.description,
            member_count: members.len(),
            members,
            created_at: g.created_at,
        });
    }

    Ok(Json(serde_json::json!({ "groups": details })))
}

/// Creates a quiz group with its initial membership.
pub async fn create_group(
    State(pool): State<PgPool>,
    Json(payload): Json<UpsertGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO quiz_groups (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(&mut *tx)
    .await?;

    for ticket_id in &payload.ticket_ids {
        sqlx::query("INSERT INTO quiz_group_members (group_id, ticket_id) VALUES ($1, $2)")
            .bind(id)
            .bind(ticket_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Updates a group's name/description and replaces its membership.
pub async fn update_group(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpsertGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut tx = pool.begin().await?;

    let result = sqlx::query("UPDATE quiz_groups SET name = $1, description = $2 WHERE id = $3")
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Group not found".to_string()));
    }

    // membership is replaced wholesale
    sqlx::query("DELETE FROM quiz_group_members WHERE group_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for ticket_id in &payload.ticket_ids {
        sqlx::query("INSERT INTO quiz_group_members (group_id, ticket_id) VALUES ($1, $2)")
            .bind(id)
            .bind(ticket_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(StatusCode::OK)
}

/// Deletes a group; membership rows cascade.
pub async fn delete_group(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM quiz_groups WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete group: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Group not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
