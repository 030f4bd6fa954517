//! Event repository: CRUD plus per-event ticket tallies.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::adapters::events_sea::{self as events_adapter, EventCreate, EventUpdate, TicketCounts};
use crate::entities::events;
use crate::errors::domain::DomainError;

/// Event domain model, including derived ticket counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub date: time::OffsetDateTime,
    pub total_tickets_purchased: i64,
    pub total_tickets_entered: i64,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

impl Event {
    pub(crate) fn from_parts(model: events::Model, counts: Option<&TicketCounts>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            location: model.location,
            date: model.date,
            total_tickets_purchased: counts.map_or(0, |c| c.purchased),
            total_tickets_entered: counts.map_or(0, |c| c.entered),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Fields for a new event. Validated by the handler before it gets here.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub date: time::OffsetDateTime,
}

/// Partial event update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub name: Option<String>,
    pub location: Option<String>,
    pub date: Option<time::OffsetDateTime>,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events, soonest first.
    async fn list(&self) -> Result<Vec<Event>, DomainError>;
    async fn find(&self, id: i64) -> Result<Option<Event>, DomainError>;
    async fn create(&self, new: NewEvent) -> Result<Event, DomainError>;
    /// Returns `None` when no event has this id.
    async fn update(&self, id: i64, changes: EventChanges) -> Result<Option<Event>, DomainError>;
    /// Returns `false` when no event has this id.
    async fn delete(&self, id: i64) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct SeaEventRepository {
    db: DatabaseConnection,
}

impl SeaEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_counts(&self, model: events::Model) -> Result<Event, DomainError> {
        let counts = events_adapter::ticket_counts(&self.db, &[model.id]).await?;
        let entry = counts.get(&model.id);
        Ok(Event::from_parts(model, entry))
    }
}

#[async_trait]
impl EventRepository for SeaEventRepository {
    async fn list(&self) -> Result<Vec<Event>, DomainError> {
        let models = events_adapter::list_events(&self.db).await?;
        let counts = events_adapter::all_ticket_counts(&self.db).await?;

        Ok(models
            .into_iter()
            .map(|model| {
                let entry = counts.get(&model.id);
                Event::from_parts(model, entry)
            })
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Event>, DomainError> {
        match events_adapter::find_event_by_id(&self.db, id).await? {
            Some(model) => self.with_counts(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn create(&self, new: NewEvent) -> Result<Event, DomainError> {
        let dto = EventCreate {
            name: new.name,
            location: new.location,
            date: new.date,
        };
        let model = events_adapter::create_event(&self.db, dto).await?;
        Ok(Event::from_parts(model, None))
    }

    async fn update(&self, id: i64, changes: EventChanges) -> Result<Option<Event>, DomainError> {
        let dto = EventUpdate {
            name: changes.name,
            location: changes.location,
            date: changes.date,
        };
        if dto.is_empty() {
            return self.find(id).await;
        }
        match events_adapter::update_event(&self.db, id, dto).await? {
            Some(model) => self.with_counts(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let removed = events_adapter::delete_event(&self.db, id).await?;
        Ok(removed > 0)
    }
}
