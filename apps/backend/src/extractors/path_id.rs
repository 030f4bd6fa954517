//! Typed `{id}` path segments.
//!
//! `web::Path<i64>` would reject bad ids with actix's plain-text 404; these
//! extractors answer with a Problem Details 400 and a resource-specific code.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Database ids are strictly positive.
pub fn require_positive(id: i64, code: ErrorCode, what: &str) -> Result<i64, AppError> {
    if id > 0 {
        Ok(id)
    } else {
        Err(AppError::bad_request(code, format!("Invalid {what} id: {id}")))
    }
}

pub fn parse_id(raw: &str, code: ErrorCode, what: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(id) => require_positive(id, code, what),
        Err(_) => Err(AppError::bad_request(
            code,
            format!("Invalid {what} id: {raw}"),
        )),
    }
}

fn id_from_path(req: &HttpRequest, code: ErrorCode, what: &str) -> Result<i64, AppError> {
    let raw = req
        .match_info()
        .get("id")
        .ok_or_else(|| AppError::bad_request(code, format!("Missing {what} id")))?;
    parse_id(raw, code, what)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventId(pub i64);

impl FromRequest for EventId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(id_from_path(req, ErrorCode::InvalidEventId, "event").map(EventId))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketId(pub i64);

impl FromRequest for TicketId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(id_from_path(req, ErrorCode::InvalidTicketId, "ticket").map(TicketId))
    }
}
