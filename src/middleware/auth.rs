use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::modules::auth::model::{Claims, PrincipalKind, Role};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the bearer token and exposes the authenticated
/// principal's claims. Claims carry the principal kind, effective role, and
/// department/course affiliation needed for scoped authorization.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn kind(&self) -> Result<PrincipalKind, AppError> {
        PrincipalKind::parse(&self.0.user_type)
    }

    pub fn role(&self) -> Result<Role, AppError> {
        Role::parse(&self.0.role)
    }

    pub fn department_id(&self) -> Option<Uuid> {
        self.0.department_id
    }

    pub fn course_id(&self) -> Option<Uuid> {
        self.0.course_id
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

fn claims_from_parts(parts: &mut Parts, state: &AppState) -> Result<Claims, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

    verify_token(token, &state.jwt_config)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;
        Ok(AuthUser(claims))
    }
}

/// Extractor for endpoints that serve both anonymous and authenticated
/// viewers (form listing). A missing or malformed header yields `None`
/// rather than a rejection; an invalid token is still rejected.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<Claims>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let has_bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|v| v.starts_with("Bearer "));

        if !has_bearer {
            return Ok(OptionalAuthUser(None));
        }

        let claims = claims_from_parts(parts, state)?;
        Ok(OptionalAuthUser(Some(claims)))
    }
}
