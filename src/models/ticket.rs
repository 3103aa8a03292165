// src/models/ticket.rs

use serde::Serialize;
use sqlx::{PgPool, prelude::FromRow};

/// Read-only view over the external participant directory.
///
/// Tickets and customers are owned by the surrounding ticketing system; the
/// engine only resolves participants by phone or ticket id and, as its one
/// write-through, fills in a missing guest name first reported by the
/// messaging channel.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DirectoryTicket {
    pub id: i64,
    pub ticket_type: String,
    pub status: String,
    pub guest_name: Option<String>,
    pub phone: String,
}

const SELECT_TICKET: &str = "SELECT t.id, t.ticket_type, t.status, t.guest_name, c.phone \
     FROM tickets t JOIN customers c ON c.id = t.customer_id";

impl DirectoryTicket {
    /// Resolves a canonical phone number to an approved/activated ticket.
    pub async fn find_active_by_phone(
        pool: &PgPool,
        phone: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(&format!(
            "{SELECT_TICKET} WHERE c.phone = $1 \
             AND LOWER(t.status) IN ('approved', 'activated') \
             ORDER BY t.id LIMIT 1"
        ))
        .bind(phone)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, ticket_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(&format!("{SELECT_TICKET} WHERE t.id = $1"))
            .bind(ticket_id)
            .fetch_optional(pool)
            .await
    }

    /// Propagates a display name onto a ticket that has none yet.
    pub async fn set_guest_name_if_empty(
        pool: &PgPool,
        ticket_id: i64,
        name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tickets SET guest_name = $1 \
             WHERE id = $2 AND (guest_name IS NULL OR guest_name = '')",
        )
        .bind(name)
        .bind(ticket_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
