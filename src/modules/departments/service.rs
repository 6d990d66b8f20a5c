use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::Role;
use crate::utils::errors::AppError;

use super::model::{
    CreateDepartmentDto, Department, DepartmentWithCreator, UpdateDepartmentDto,
};

pub struct DepartmentService;

impl DepartmentService {
    #[instrument(skip(db))]
    pub async fn list_departments(db: &PgPool) -> Result<Vec<DepartmentWithCreator>, AppError> {
        let departments = sqlx::query_as::<_, DepartmentWithCreator>(
            "SELECT d.id, d.name, d.code, d.description, d.is_active,
                    d.created_by_role, COALESCE(a.name, t.name) AS created_by_name,
                    d.created_at
             FROM departments d
             LEFT JOIN admins a ON d.created_by_role = 'admin' AND a.id = d.created_by_id
             LEFT JOIN teachers t ON d.created_by_role <> 'admin' AND t.id = d.created_by_id
             WHERE d.is_active
             ORDER BY d.code",
        )
        .fetch_all(db)
        .await?;

        Ok(departments)
    }

    #[instrument(skip(db, dto))]
    pub async fn create_department(
        db: &PgPool,
        auth_user: &AuthUser,
        dto: CreateDepartmentDto,
    ) -> Result<Department, AppError> {
        let role = auth_user.role()?;
        if role != Role::Admin && role != Role::Principal {
            return Err(AppError::forbidden("Access denied"));
        }

        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name, code, description, created_by_role, created_by_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, code, description, is_active, created_by_role, created_at",
        )
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(dto.description.unwrap_or_default())
        .bind(role.as_str())
        .bind(auth_user.user_id()?)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::validation(format!(
                        "Department with code {} already exists",
                        dto.code
                    ));
                }
            }
            AppError::database(e)
        })?;

        Ok(department)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_department(
        db: &PgPool,
        auth_user: &AuthUser,
        id: Uuid,
        dto: UpdateDepartmentDto,
    ) -> Result<Department, AppError> {
        let role = auth_user.role()?;
        if role != Role::Admin && role != Role::Principal {
            return Err(AppError::forbidden("Access denied"));
        }

        let existing = sqlx::query_as::<_, Department>(
            "SELECT id, name, code, description, is_active, created_by_role, created_at
             FROM departments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Department not found"))?;

        let department = sqlx::query_as::<_, Department>(
            "UPDATE departments
             SET name = $1, code = $2, description = $3, is_active = $4
             WHERE id = $5
             RETURNING id, name, code, description, is_active, created_by_role, created_at",
        )
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.code.unwrap_or(existing.code))
        .bind(dto.description.unwrap_or(existing.description))
        .bind(dto.is_active.unwrap_or(existing.is_active))
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(department)
    }
}
