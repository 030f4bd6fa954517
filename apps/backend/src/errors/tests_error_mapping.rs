// Unit tests for error mapping - pure domain logic without HTTP or database dependencies
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::errors::ErrorCode;
use crate::AppError;

#[test]
fn maps_validation_to_400() {
    let app: AppError = DomainError::validation("bad field").into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
    assert_eq!(app.status().as_u16(), 400);
}

#[test]
fn maps_conflicts() {
    let unique: AppError = DomainError::conflict(ConflictKind::UniqueEmail, "email exists").into();
    assert_eq!(unique.code().as_str(), "UNIQUE_EMAIL");
    assert_eq!(unique.status().as_u16(), 409);

    let entered: AppError =
        DomainError::conflict(ConflictKind::TicketAlreadyEntered, "used").into();
    assert_eq!(entered.code().as_str(), "TICKET_ALREADY_ENTERED");

    let other: AppError = DomainError::conflict(ConflictKind::Other("X".into()), "x").into();
    assert_eq!(other.code(), ErrorCode::Conflict);
    assert_eq!(other.status().as_u16(), 409);
}

#[test]
fn maps_not_found_kinds() {
    let cases = [
        (NotFoundKind::Event, "EVENT_NOT_FOUND"),
        (NotFoundKind::Ticket, "TICKET_NOT_FOUND"),
        (NotFoundKind::User, "USER_NOT_FOUND"),
        (NotFoundKind::Other("Row".into()), "NOT_FOUND"),
    ];
    for (kind, code) in cases {
        let app: AppError = DomainError::not_found(kind, "missing").into();
        assert_eq!(app.code().as_str(), code);
        assert_eq!(app.status().as_u16(), 404);
    }
}

#[test]
fn maps_infra_failures() {
    let unavailable: AppError =
        DomainError::infra(InfraErrorKind::DbUnavailable, "pool exhausted").into();
    assert_eq!(unavailable.code(), ErrorCode::DbUnavailable);
    assert_eq!(unavailable.status().as_u16(), 503);

    let timeout: AppError = DomainError::infra(InfraErrorKind::Timeout, "slow").into();
    assert_eq!(timeout.code(), ErrorCode::DbTimeout);
    assert_eq!(timeout.status().as_u16(), 504);

    let other: AppError = DomainError::infra(InfraErrorKind::Other("Io".into()), "boom").into();
    assert_eq!(other.code(), ErrorCode::DbError);
    assert_eq!(other.status().as_u16(), 500);
}
