use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::Role;
use crate::utils::errors::AppError;

use super::model::{Course, CourseWithNames, CreateCourseDto, UpdateCourseDto};

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db))]
    pub async fn list_courses(
        db: &PgPool,
        department_id: Option<Uuid>,
    ) -> Result<Vec<CourseWithNames>, AppError> {
        let courses = sqlx::query_as::<_, CourseWithNames>(
            "SELECT c.id, c.name, c.code, c.department_id, d.name AS department_name,
                    c.description, c.is_active, c.created_by_role,
                    COALESCE(a.name, t.name) AS created_by_name, c.created_at
             FROM courses c
             JOIN departments d ON d.id = c.department_id
             LEFT JOIN admins a ON c.created_by_role = 'admin' AND a.id = c.created_by_id
             LEFT JOIN teachers t ON c.created_by_role <> 'admin' AND t.id = c.created_by_id
             WHERE c.is_active AND ($1::uuid IS NULL OR c.department_id = $1)
             ORDER BY c.code",
        )
        .bind(department_id)
        .fetch_all(db)
        .await?;

        Ok(courses)
    }

    #[instrument(skip(db, dto))]
    pub async fn create_course(
        db: &PgPool,
        auth_user: &AuthUser,
        dto: CreateCourseDto,
    ) -> Result<Course, AppError> {
        let role = auth_user.role()?;
        match role {
            Role::Admin | Role::Principal => {}
            Role::Hod => {
                // HOD may only add courses to their own department.
                if auth_user.department_id() != Some(dto.department) {
                    return Err(AppError::forbidden(
                        "HOD can only create courses in their own department",
                    ));
                }
            }
            _ => return Err(AppError::forbidden("Access denied")),
        }

        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (name, code, department_id, description, created_by_role, created_by_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, name, code, department_id, description, is_active, created_by_role, created_at",
        )
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(dto.department)
        .bind(dto.description.unwrap_or_default())
        .bind(role.as_str())
        .bind(auth_user.user_id()?)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::validation(format!(
                        "Course with code {} already exists",
                        dto.code
                    ));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found("Department not found");
                }
            }
            AppError::database(e)
        })?;

        Ok(course)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_course(
        db: &PgPool,
        auth_user: &AuthUser,
        id: Uuid,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        let existing = sqlx::query_as::<_, Course>(
            "SELECT id, name, code, department_id, description, is_active, created_by_role, created_at
             FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

        let role = auth_user.role()?;
        let allowed = match role {
            Role::Admin | Role::Principal => true,
            Role::Hod => auth_user.department_id() == Some(existing.department_id),
            _ => false,
        };
        if !allowed {
            return Err(AppError::forbidden("Access denied"));
        }

        let course = sqlx::query_as::<_, Course>(
            "UPDATE courses
             SET name = $1, code = $2, description = $3, is_active = $4
             WHERE id = $5
             RETURNING id, name, code, department_id, description, is_active, created_by_role, created_at",
        )
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.code.unwrap_or(existing.code))
        .bind(dto.description.unwrap_or(existing.description))
        .bind(dto.is_active.unwrap_or(existing.is_active))
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(course)
    }
}
