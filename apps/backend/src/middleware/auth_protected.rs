//! Auth gate for protected scopes.
//!
//! Wrap a scope with `AuthProtected` and every route inside requires
//! `Authorization: Bearer <jwt>` for a user that still exists. On success
//! the caller is stored in request extensions as [`CurrentUser`]; on failure
//! the request is answered here and never reaches a handler.

use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::logging::security;
use crate::state::app_state::AppState;

pub struct AuthProtected;

impl<S, B> Transform<S, ServiceRequest> for AuthProtected
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthProtectedMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthProtectedMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthProtectedMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthProtectedMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match authorize(&req).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    security::gate_rejected(err.code().as_str(), req.path());
                    Ok(req.error_response(err).map_into_right_body())
                }
            }
        })
    }
}

async fn authorize(req: &ServiceRequest) -> Result<CurrentUser, AppError> {
    let token = bearer_token(req.headers().get(header::AUTHORIZATION))?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::internal("AppState not available"))?;

    state.auth.authenticate(&token).await.map_err(|err| {
        // Fail closed: if the user lookup cannot run, nobody gets in.
        if err.status().is_server_error() {
            AppError::db_unavailable("Unable to verify credentials")
        } else {
            err
        }
    })
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(value: Option<&header::HeaderValue>) -> Result<String, AppError> {
    let raw = value
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::unauthorized_missing_bearer)?;

    match raw.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("Bearer") => {
            let token = token.trim();
            if token.is_empty() || token.contains(' ') {
                Err(AppError::unauthorized_missing_bearer())
            } else {
                Ok(token.to_string())
            }
        }
        _ => Err(AppError::unauthorized_missing_bearer()),
    }
}
