pub mod auth_protected;
pub mod cors;
pub mod request_log;
pub mod request_trace;

pub use auth_protected::AuthProtected;
pub use cors::cors_middleware;
pub use request_log::RequestLog;
pub use request_trace::RequestTrace;
