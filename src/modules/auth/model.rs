//! Authentication models: JWT claims, the unified principal identity, and
//! login/registration DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::errors::AppError;

/// The kind of record a principal resolves to in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Admin,
    Teacher,
    Student,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Admin => "admin",
            PrincipalKind::Teacher => "teacher",
            PrincipalKind::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "admin" => Ok(PrincipalKind::Admin),
            "teacher" => Ok(PrincipalKind::Teacher),
            "student" => Ok(PrincipalKind::Student),
            _ => Err(AppError::internal_error(format!(
                "Invalid principal kind: {}",
                s
            ))),
        }
    }
}

/// Effective role of an authenticated actor, across all principal kinds.
///
/// The organizational hierarchy is admin > principal > hod > tutor; students
/// sit outside the staff hierarchy entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Principal,
    Hod,
    Tutor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Principal => "principal",
            Role::Hod => "hod",
            Role::Tutor => "tutor",
            Role::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "admin" => Ok(Role::Admin),
            "principal" => Ok(Role::Principal),
            "hod" => Ok(Role::Hod),
            "tutor" => Ok(Role::Tutor),
            "student" => Ok(Role::Student),
            _ => Err(AppError::internal_error(format!("Invalid role: {}", s))),
        }
    }
}

/// Resolved identity of an authenticated principal, independent of which
/// table the record lives in. This is what gets baked into token claims and
/// what authorization decisions are made against.
#[derive(Debug, Clone)]
pub struct PrincipalIdentity {
    pub id: Uuid,
    pub email: String,
    pub kind: PrincipalKind,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
}

/// JWT claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub user_type: String,
    pub role: String,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user_type: PrincipalKind,
    pub user_role: Role,
    pub user: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
