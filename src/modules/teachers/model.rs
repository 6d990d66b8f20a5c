use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub employee_id: String,
    pub role: String,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Teacher row joined with affiliation names for listing and profiles.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TeacherWithNames {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub employee_id: String,
    pub role: String,
    pub department_id: Option<Uuid>,
    pub department_name: Option<String>,
    pub course_id: Option<Uuid>,
    pub course_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 15))]
    pub phone_number: String,
    #[validate(length(min = 1, max = 20))]
    pub employee_id: String,
    pub role: String,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTeacherDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 15))]
    pub phone_number: Option<String>,
    pub department_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TeacherFilterParams {
    pub role: Option<String>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeachersResponse {
    pub teachers: Vec<TeacherWithNames>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherCreatedResponse {
    pub message: String,
    pub teacher_id: Uuid,
    pub employee_id: String,
}
