use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub college_id: String,
    pub department_id: Uuid,
    pub course_id: Uuid,
    pub approval_status: String,
    pub approved_at: Option<DateTime<Utc>>,
    pub academic_year_start: Option<NaiveDate>,
    pub academic_year_end: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student row joined with department and course names.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct StudentWithNames {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub college_id: String,
    pub department_id: Uuid,
    pub department_name: String,
    pub course_id: Uuid,
    pub course_name: String,
    pub approval_status: String,
    pub approved_at: Option<DateTime<Utc>>,
    pub academic_year_start: Option<NaiveDate>,
    pub academic_year_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 15))]
    pub phone_number: String,
    pub address: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub college_id: String,
    pub course_id: Uuid,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewStudentDto {
    /// "approve" or "reject"
    pub action: String,
    pub academic_year_start: Option<NaiveDate>,
    pub academic_year_end: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentsResponse {
    pub students: Vec<StudentWithNames>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentRegisteredResponse {
    pub message: String,
    pub student_id: Uuid,
    pub college_id: String,
}
