//! SeaORM adapter for ticket storage.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::{events, tickets};

pub mod dto;

pub use dto::TicketCreate;

/// A ticket row together with its event, if the event still exists.
pub type TicketWithEvent = (tickets::Model, Option<events::Model>);

pub async fn list_tickets_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
) -> Result<Vec<TicketWithEvent>, sea_orm::DbErr> {
    tickets::Entity::find()
        .filter(tickets::Column::UserId.eq(user_id))
        .find_also_related(events::Entity)
        .order_by_desc(tickets::Column::CreatedAt)
        .order_by_desc(tickets::Column::Id)
        .all(conn)
        .await
}

pub async fn find_ticket_for_user<C: ConnectionTrait>(
    conn: &C,
    ticket_id: i64,
    user_id: i64,
) -> Result<Option<TicketWithEvent>, sea_orm::DbErr> {
    tickets::Entity::find_by_id(ticket_id)
        .filter(tickets::Column::UserId.eq(user_id))
        .find_also_related(events::Entity)
        .one(conn)
        .await
}

pub async fn create_ticket<C: ConnectionTrait>(
    conn: &C,
    dto: TicketCreate,
) -> Result<tickets::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let ticket_active = tickets::ActiveModel {
        id: NotSet,
        event_id: Set(dto.event_id),
        user_id: Set(dto.user_id),
        entered: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };

    ticket_active.insert(conn).await
}

/// Flip `entered` to true only if it is currently false.
///
/// Returns the number of rows changed: 1 on success, 0 when the ticket does
/// not exist for this owner or has already been entered.
pub async fn mark_entered<C: ConnectionTrait>(
    conn: &C,
    ticket_id: i64,
    user_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = tickets::Entity::update_many()
        .col_expr(tickets::Column::Entered, Expr::value(true))
        .col_expr(
            tickets::Column::UpdatedAt,
            Expr::value(time::OffsetDateTime::now_utc()),
        )
        .filter(tickets::Column::Id.eq(ticket_id))
        .filter(tickets::Column::UserId.eq(user_id))
        .filter(tickets::Column::Entered.eq(false))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}
