//! Repository traits for the domain layer and their SeaORM implementations.
//!
//! Each `Sea*Repository` holds a clone of the shared `DatabaseConnection`
//! (an internally pooled handle) and delegates to `crate::adapters`.

pub mod auth;
pub mod events;
pub mod tickets;

pub use auth::{AuthRepository, SeaAuthRepository, User};
pub use events::{Event, EventChanges, EventRepository, NewEvent, SeaEventRepository};
pub use tickets::{SeaTicketRepository, Ticket, TicketRepository};
