use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::events::EventResponse;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::path_id::require_positive;
use crate::extractors::{CurrentUser, TicketId};
use crate::repos::Ticket;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub event_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ValidateTicketRequest {
    pub ticket_id: i64,
    pub owner_id: i64,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: i64,
    pub user_id: i64,
    pub entered: bool,
    pub event: EventResponse,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            user_id: ticket.user_id,
            entered: ticket.entered,
            event: ticket.event.into(),
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

async fn list_tickets(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tickets = app_state.tickets.list_for_user(user.id).await?;
    let body: Vec<TicketResponse> = tickets.into_iter().map(TicketResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

async fn create_ticket(
    user: CurrentUser,
    body: web::Json<CreateTicketRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let event_id = require_positive(body.event_id, ErrorCode::InvalidEventId, "event")?;
    let ticket = app_state.tickets.create(user.id, event_id).await?;
    Ok(HttpResponse::Created().json(TicketResponse::from(ticket)))
}

async fn get_ticket(
    user: CurrentUser,
    id: TicketId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ticket = app_state
        .tickets
        .find_for_user(id.0, user.id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::TicketNotFound, format!("Ticket {} not found", id.0))
        })?;
    Ok(HttpResponse::Ok().json(TicketResponse::from(ticket)))
}

/// Door check: mark a presented ticket as used.
///
/// The ticket is identified by id and owner together, as encoded in the
/// ticket's QR payload.
async fn validate_ticket(
    _user: CurrentUser,
    body: web::Json<ValidateTicketRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ticket_id = require_positive(body.ticket_id, ErrorCode::InvalidTicketId, "ticket")?;
    let ticket = app_state
        .tickets
        .mark_entered(ticket_id, body.owner_id)
        .await?;
    Ok(HttpResponse::Ok().json(TicketResponse::from(ticket)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_tickets))
            .route(web::post().to(create_ticket)),
    )
    .service(web::resource("/validate").route(web::post().to(validate_ticket)))
    .service(web::resource("/{id}").route(web::get().to(get_ticket)));
}
