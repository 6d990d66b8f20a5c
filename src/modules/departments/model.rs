use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: String,
    pub is_active: bool,
    pub created_by_role: String,
    pub created_at: DateTime<Utc>,
}

/// Department with the creator's display name resolved from the directory.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DepartmentWithCreator {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: String,
    pub is_active: bool,
    pub created_by_role: String,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDepartmentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 10))]
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDepartmentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentsResponse {
    pub departments: Vec<DepartmentWithCreator>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentCreatedResponse {
    pub message: String,
    pub department_id: Uuid,
    pub code: String,
}
