//! DTOs for tickets_sea adapter.

/// DTO for issuing a ticket to a user.
#[derive(Debug, Clone, Copy)]
pub struct TicketCreate {
    pub event_id: i64,
    pub user_id: i64,
}
