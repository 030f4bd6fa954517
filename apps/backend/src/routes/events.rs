use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{CurrentUser, EventId};
use crate::repos::{Event, EventChanges, NewEvent};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: i64,
    pub name: String,
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub total_tickets_purchased: i64,
    pub total_tickets_entered: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            name: event.name,
            location: event.location,
            date: event.date,
            total_tickets_purchased: event.total_tickets_purchased,
            total_tickets_entered: event.total_tickets_entered,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Trimmed value of a required text field, or a validation error if blank.
fn required_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid(
            ErrorCode::ValidationError,
            format!("{field} must not be empty"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Dates are stored in UTC so ordering does not depend on the client's offset.
fn to_utc(date: OffsetDateTime) -> OffsetDateTime {
    date.to_offset(UtcOffset::UTC)
}

fn event_not_found(id: i64) -> AppError {
    AppError::not_found(ErrorCode::EventNotFound, format!("Event {id} not found"))
}

async fn list_events(
    _user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let events = app_state.events.list().await?;
    let body: Vec<EventResponse> = events.into_iter().map(EventResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

async fn create_event(
    _user: CurrentUser,
    body: web::Json<CreateEventRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let new = NewEvent {
        name: required_text("name", &body.name)?,
        location: required_text("location", &body.location)?,
        date: to_utc(body.date),
    };

    let event = app_state.events.create(new).await?;
    Ok(HttpResponse::Created().json(EventResponse::from(event)))
}

async fn get_event(
    _user: CurrentUser,
    id: EventId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let event = app_state
        .events
        .find(id.0)
        .await?
        .ok_or_else(|| event_not_found(id.0))?;
    Ok(HttpResponse::Ok().json(EventResponse::from(event)))
}

async fn update_event(
    _user: CurrentUser,
    id: EventId,
    body: web::Json<UpdateEventRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let changes = EventChanges {
        name: body
            .name
            .as_deref()
            .map(|v| required_text("name", v))
            .transpose()?,
        location: body
            .location
            .as_deref()
            .map(|v| required_text("location", v))
            .transpose()?,
        date: body.date.map(to_utc),
    };

    let event = app_state
        .events
        .update(id.0, changes)
        .await?
        .ok_or_else(|| event_not_found(id.0))?;
    Ok(HttpResponse::Ok().json(EventResponse::from(event)))
}

async fn delete_event(
    _user: CurrentUser,
    id: EventId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if !app_state.events.delete(id.0).await? {
        return Err(event_not_found(id.0));
    }
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_events))
            .route(web::post().to(create_event)),
    )
    .service(
        web::resource("/{id}")
            .route(web::get().to(get_event))
            .route(web::put().to(update_event))
            .route(web::delete().to(delete_event)),
    );
}
