//! Ticket repository. Every query is scoped to the owning user.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use super::events::Event;
use crate::adapters::events_sea as events_adapter;
use crate::adapters::tickets_sea::{self as tickets_adapter, TicketCreate, TicketWithEvent};
use crate::entities::tickets;
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

/// Ticket domain model with its event embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub user_id: i64,
    pub entered: bool,
    pub event: Event,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

impl Ticket {
    fn from_parts(model: tickets::Model, event: Event) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            entered: model.entered,
            event,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// The user's tickets, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Ticket>, DomainError>;
    /// `None` if the ticket does not exist or belongs to someone else.
    async fn find_for_user(&self, ticket_id: i64, user_id: i64)
        -> Result<Option<Ticket>, DomainError>;
    /// Fails with `NotFound(Event)` when the event does not exist.
    async fn create(&self, user_id: i64, event_id: i64) -> Result<Ticket, DomainError>;
    /// Mark a ticket as entered. Succeeds at most once per ticket.
    async fn mark_entered(&self, ticket_id: i64, owner_id: i64) -> Result<Ticket, DomainError>;
}

#[derive(Clone)]
pub struct SeaTicketRepository {
    db: DatabaseConnection,
}

impl SeaTicketRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn hydrate(&self, rows: Vec<TicketWithEvent>) -> Result<Vec<Ticket>, DomainError> {
        let mut event_ids: Vec<i64> = rows.iter().map(|(t, _)| t.event_id).collect();
        event_ids.sort_unstable();
        event_ids.dedup();
        let counts = events_adapter::ticket_counts(&self.db, &event_ids).await?;

        let mut out = Vec::with_capacity(rows.len());
        for (ticket, event) in rows {
            // The FK cascades on event deletion, so a missing event means a
            // broken row rather than a normal state.
            let Some(event) = event else {
                return Err(DomainError::infra(
                    InfraErrorKind::Other("DataCorruption".into()),
                    format!("Ticket {} references a missing event", ticket.id),
                ));
            };
            let event = Event::from_parts(event, counts.get(&ticket.event_id));
            out.push(Ticket::from_parts(ticket, event));
        }
        Ok(out)
    }

    async fn load_one(
        &self,
        ticket_id: i64,
        user_id: i64,
    ) -> Result<Option<Ticket>, DomainError> {
        let Some(row) = tickets_adapter::find_ticket_for_user(&self.db, ticket_id, user_id).await?
        else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.into_iter().next())
    }
}

fn ticket_not_found(ticket_id: i64) -> DomainError {
    DomainError::not_found(NotFoundKind::Ticket, format!("Ticket {ticket_id} not found"))
}

#[async_trait]
impl TicketRepository for SeaTicketRepository {
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Ticket>, DomainError> {
        let rows = tickets_adapter::list_tickets_for_user(&self.db, user_id).await?;
        self.hydrate(rows).await
    }

    async fn find_for_user(
        &self,
        ticket_id: i64,
        user_id: i64,
    ) -> Result<Option<Ticket>, DomainError> {
        self.load_one(ticket_id, user_id).await
    }

    async fn create(&self, user_id: i64, event_id: i64) -> Result<Ticket, DomainError> {
        let event_missing = || {
            DomainError::not_found(NotFoundKind::Event, format!("Event {event_id} not found"))
        };

        if events_adapter::find_event_by_id(&self.db, event_id)
            .await?
            .is_none()
        {
            return Err(event_missing());
        }

        // The event can still vanish between the check and the insert; the
        // FK then reports it and we surface the same error.
        let model = match tickets_adapter::create_ticket(&self.db, TicketCreate { event_id, user_id })
            .await
        {
            Ok(model) => model,
            Err(e) => {
                return Err(match DomainError::from(e) {
                    DomainError::NotFound(_, _) => event_missing(),
                    other => other,
                })
            }
        };

        self.load_one(model.id, user_id)
            .await?
            .ok_or_else(event_missing)
    }

    async fn mark_entered(&self, ticket_id: i64, owner_id: i64) -> Result<Ticket, DomainError> {
        let changed = tickets_adapter::mark_entered(&self.db, ticket_id, owner_id).await?;

        let ticket = self
            .load_one(ticket_id, owner_id)
            .await?
            .ok_or_else(|| ticket_not_found(ticket_id))?;

        if changed == 0 {
            return Err(DomainError::conflict(
                ConflictKind::TicketAlreadyEntered,
                format!("Ticket {ticket_id} has already been used for entry"),
            ));
        }
        Ok(ticket)
    }
}
