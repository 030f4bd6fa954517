//! SeaORM adapter for event storage.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, NotSet,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::entities::{events, tickets};

pub mod dto;

pub use dto::{EventCreate, EventUpdate};

/// Ticket tallies for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromQueryResult)]
pub struct TicketCounts {
    pub event_id: i64,
    pub purchased: i64,
    pub entered: i64,
}

pub async fn list_events<C: ConnectionTrait>(conn: &C) -> Result<Vec<events::Model>, sea_orm::DbErr> {
    events::Entity::find()
        .order_by_asc(events::Column::Date)
        .order_by_asc(events::Column::Id)
        .all(conn)
        .await
}

pub async fn find_event_by_id<C: ConnectionTrait>(
    conn: &C,
    event_id: i64,
) -> Result<Option<events::Model>, sea_orm::DbErr> {
    events::Entity::find_by_id(event_id).one(conn).await
}

pub async fn create_event<C: ConnectionTrait>(
    conn: &C,
    dto: EventCreate,
) -> Result<events::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let event_active = events::ActiveModel {
        id: NotSet,
        name: Set(dto.name),
        location: Set(dto.location),
        date: Set(dto.date),
        created_at: Set(now),
        updated_at: Set(now),
    };

    event_active.insert(conn).await
}

/// Apply a partial update. Returns `None` when the event does not exist.
pub async fn update_event<C: ConnectionTrait>(
    conn: &C,
    event_id: i64,
    dto: EventUpdate,
) -> Result<Option<events::Model>, sea_orm::DbErr> {
    let Some(existing) = find_event_by_id(conn, event_id).await? else {
        return Ok(None);
    };

    let mut event_active: events::ActiveModel = existing.into();
    if let Some(name) = dto.name {
        event_active.name = Set(name);
    }
    if let Some(location) = dto.location {
        event_active.location = Set(location);
    }
    if let Some(date) = dto.date {
        event_active.date = Set(date);
    }
    event_active.updated_at = Set(time::OffsetDateTime::now_utc());

    event_active.update(conn).await.map(Some)
}

/// Delete an event; its tickets go with it through the FK cascade.
/// Returns the number of rows removed (0 or 1).
pub async fn delete_event<C: ConnectionTrait>(conn: &C, event_id: i64) -> Result<u64, sea_orm::DbErr> {
    let result = events::Entity::delete_by_id(event_id).exec(conn).await?;
    Ok(result.rows_affected)
}

fn counts_query() -> Select<tickets::Entity> {
    tickets::Entity::find()
        .select_only()
        .column(tickets::Column::EventId)
        .column_as(Expr::col(tickets::Column::Id).count(), "purchased")
        .column_as(
            Expr::cust("COALESCE(SUM(CASE WHEN entered THEN 1 ELSE 0 END), 0)"),
            "entered",
        )
        .group_by(tickets::Column::EventId)
}

/// Purchased/entered ticket counts for the given events, keyed by event id.
/// Events without tickets are absent from the map.
pub async fn ticket_counts<C: ConnectionTrait>(
    conn: &C,
    event_ids: &[i64],
) -> Result<HashMap<i64, TicketCounts>, sea_orm::DbErr> {
    if event_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = counts_query()
        .filter(tickets::Column::EventId.is_in(event_ids.iter().copied()))
        .into_model::<TicketCounts>()
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(|row| (row.event_id, row)).collect())
}

/// Counts for every event that has tickets. Grouped in one pass with no id
/// list, so it does not grow with the number of events.
pub async fn all_ticket_counts<C: ConnectionTrait>(
    conn: &C,
) -> Result<HashMap<i64, TicketCounts>, sea_orm::DbErr> {
    let rows = counts_query()
        .into_model::<TicketCounts>()
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(|row| (row.event_id, row)).collect())
}
