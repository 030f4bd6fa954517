//! DTOs for events_sea adapter.

use time::OffsetDateTime;

/// DTO for creating a new event.
#[derive(Debug, Clone)]
pub struct EventCreate {
    pub name: String,
    pub location: String,
    pub date: OffsetDateTime,
}

/// DTO for a partial event update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub date: Option<OffsetDateTime>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.location.is_none() && self.date.is_none()
    }
}
