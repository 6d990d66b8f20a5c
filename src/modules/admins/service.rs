use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

use super::model::{Admin, CreateAdminDto, UpdateAdminDto};

const ADMIN_COLUMNS: &str = "id, name, email, is_superuser, is_active, created_at, updated_at";

pub struct AdminService;

impl AdminService {
    /// One-time bootstrap: registers the first admin with superuser rights.
    /// Disabled as soon as any admin record exists.
    #[instrument(skip(db, dto))]
    pub async fn register_first_admin(
        db: &PgPool,
        dto: CreateAdminDto,
    ) -> Result<Admin, AppError> {
        let admin_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM admins)")
            .fetch_one(db)
            .await?;

        if admin_exists {
            return Err(AppError::forbidden(
                "Admin registration is disabled. Contact existing admin.",
            ));
        }

        Self::insert_admin(db, dto, true).await
    }

    #[instrument(skip(db, dto))]
    pub async fn create_admin(db: &PgPool, dto: CreateAdminDto) -> Result<Admin, AppError> {
        Self::insert_admin(db, dto, false).await
    }

    async fn insert_admin(
        db: &PgPool,
        dto: CreateAdminDto,
        is_superuser: bool,
    ) -> Result<Admin, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let admin = sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (name, email, password, is_superuser)
             VALUES ($1, $2, $3, $4)
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(is_superuser)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::validation(format!(
                        "Admin with email {} already exists",
                        dto.email
                    ));
                }
            }
            AppError::database(e)
        })?;

        Ok(admin)
    }

    #[instrument(skip(db))]
    pub async fn list_admins(db: &PgPool) -> Result<Vec<Admin>, AppError> {
        let admins = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE is_active ORDER BY created_at"
        ))
        .fetch_all(db)
        .await?;

        Ok(admins)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_admin(
        db: &PgPool,
        id: Uuid,
        dto: UpdateAdminDto,
    ) -> Result<Admin, AppError> {
        let existing = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

        let password = dto.password.map(|p| hash_password(&p)).transpose()?;

        let admin = sqlx::query_as::<_, Admin>(&format!(
            "UPDATE admins
             SET name = $1, email = $2, password = COALESCE($3, password), updated_at = NOW()
             WHERE id = $4
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.email.unwrap_or(existing.email))
        .bind(password)
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(admin)
    }

    #[instrument(skip(db))]
    pub async fn deactivate_admin(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE admins SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }

        Ok(())
    }
}
