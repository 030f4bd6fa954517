use tracing::warn;

use crate::logging::pii::Redacted;
use crate::middleware::request_trace::trace_id;

/// Log a failed login attempt.
pub fn login_failed(reason: &str, email: &str) {
    warn!(
        event = "SECURITY_LOGIN_FAILED",
        trace_id = %trace_id(),
        email = %Redacted(email),
        reason,
        "Authentication failure"
    );
}

/// Log a request rejected by the auth gate.
pub fn gate_rejected(reason: &str, path: &str) {
    warn!(
        event = "SECURITY_GATE_REJECTED",
        trace_id = %trace_id(),
        path,
        reason,
        "Protected route rejected request"
    );
}
