// src/targeting.rs

use std::collections::HashSet;

use sqlx::PgPool;

/// Ticket types the directory distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketKind {
    Vip,
    Student,
}

impl TicketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketKind::Vip => "VIP",
            TicketKind::Student => "Student",
        }
    }
}

/// A parsed targeting specifier.
///
/// Specifier strings are user-composed ("all", "VIP", "Student",
/// "group:<id>") and parsed once at the API boundary; a malformed specifier
/// parses to `None` and contributes nothing rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    All,
    ByType(TicketKind),
    ByGroup(i64),
}

impl TargetSpec {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec {
            "all" => Some(TargetSpec::All),
            "VIP" => Some(TargetSpec::ByType(TicketKind::Vip)),
            "Student" => Some(TargetSpec::ByType(TicketKind::Student)),
            other => other
                .strip_prefix("group:")?
                .parse::<i64>()
                .ok()
                .map(TargetSpec::ByGroup),
        }
    }

    /// Parses a list of specifiers, silently dropping malformed entries.
    pub fn parse_all(specs: &[String]) -> Vec<Self> {
        specs.iter().filter_map(|s| TargetSpec::parse(s)).collect()
    }
}

const ACTIVE_STATUS_FILTER: &str = "LOWER(t.status) IN ('approved', 'activated')";

/// Expands targeting specifiers into the set of recipient phone numbers.
///
/// "all" and ticket-type specifiers are restricted to approved/activated,
/// non-hidden tickets; custom-group membership is authoritative and not
/// re-filtered. The set union deduplicates tickets matched by more than one
/// specifier, and tickets without a phone contribute nothing.
pub async fn resolve_phones(
    pool: &PgPool,
    specs: &[TargetSpec],
) -> Result<HashSet<String>, sqlx::Error> {
    let mut phones: HashSet<String> = HashSet::new();

    for spec in specs {
        let rows: Vec<(String,)> = match spec {
            TargetSpec::All => {
                sqlx::query_as(&format!(
                    "SELECT c.phone FROM tickets t \
                     JOIN customers c ON c.id = t.customer_id \
                     WHERE {ACTIVE_STATUS_FILTER} AND t.is_hidden = FALSE"
                ))
                .fetch_all(pool)
                .await?
            }
            TargetSpec::ByType(kind) => {
                sqlx::query_as(&format!(
                    "SELECT c.phone FROM tickets t \
                     JOIN customers c ON c.id = t.customer_id \
                     WHERE t.ticket_type = $1 \
                       AND {ACTIVE_STATUS_FILTER} AND t.is_hidden = FALSE"
                ))
                .bind(kind.as_str())
                .fetch_all(pool)
                .await?
            }
            TargetSpec::ByGroup(group_id) => {
                sqlx::query_as(
                    "SELECT c.phone FROM quiz_group_members m \
                     JOIN tickets t ON t.id = m.ticket_id \
                     JOIN customers c ON c.id = t.customer_id \
                     WHERE m.group_id = $1",
                )
                .bind(group_id)
                .fetch_all(pool)
                .await?
            }
        };

        phones.extend(rows.into_iter().map(|(p,)| p).filter(|p| !p.is_empty()));
    }

    Ok(phones)
}

/// Whether a ticket belongs to a quiz group; used by the leaderboard filter.
pub async fn is_group_member(
    pool: &PgPool,
    group_id: i64,
    ticket_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM quiz_group_members WHERE group_id = $1 AND ticket_id = $2)",
    )
    .bind(group_id)
    .bind(ticket_id)
    .fetch_one(pool)
    .await
}
