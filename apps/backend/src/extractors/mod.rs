pub mod current_user;
pub mod path_id;

pub use current_user::CurrentUser;
pub use path_id::{EventId, TicketId};
