pub mod events;
pub mod tickets;
pub mod users;

pub use events::Entity as Events;
pub use tickets::Entity as Tickets;
pub use users::Entity as Users;
