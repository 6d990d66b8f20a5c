use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::role_hierarchy_level;
use crate::modules::auth::model::Role;
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

use super::model::{CreateTeacherDto, Teacher, TeacherWithNames, UpdateTeacherDto};

const TEACHER_COLUMNS: &str = "id, name, email, phone_number, employee_id, role, \
     department_id, course_id, is_active, created_at, updated_at";

const TEACHER_WITH_NAMES: &str = "SELECT t.id, t.name, t.email, t.phone_number, t.employee_id, t.role,
            t.department_id, d.name AS department_name,
            t.course_id, c.name AS course_name,
            t.is_active, t.created_at
     FROM teachers t
     LEFT JOIN departments d ON d.id = t.department_id
     LEFT JOIN courses c ON c.id = t.course_id";

/// Resolved affiliation for a teacher role. A tutor's department is
/// always derived from their course, never taken from the request.
struct Affiliation {
    department_id: Option<Uuid>,
    course_id: Option<Uuid>,
}

pub struct TeacherService;

impl TeacherService {
    /// Whether `manager` may create or modify a teacher holding `target_role`.
    /// Admins manage everyone; otherwise the manager must sit strictly above
    /// the target in the hierarchy, and an HOD only within their department.
    fn can_manage_role(manager: Role, target_role: Role) -> bool {
        match manager {
            Role::Admin => true,
            Role::Principal | Role::Hod => {
                role_hierarchy_level(manager) > role_hierarchy_level(target_role)
            }
            _ => false,
        }
    }

    async fn resolve_affiliation(
        db: &PgPool,
        role: Role,
        department_id: Option<Uuid>,
        course_id: Option<Uuid>,
    ) -> Result<Affiliation, AppError> {
        match role {
            Role::Principal => Ok(Affiliation {
                department_id: None,
                course_id: None,
            }),
            Role::Hod => {
                let department_id = department_id
                    .ok_or_else(|| AppError::validation("Department is required for HOD"))?;
                Ok(Affiliation {
                    department_id: Some(department_id),
                    course_id: None,
                })
            }
            Role::Tutor => {
                let course_id = course_id
                    .ok_or_else(|| AppError::validation("Course is required for tutor"))?;

                let department_id = sqlx::query_scalar::<_, Uuid>(
                    "SELECT department_id FROM courses WHERE id = $1 AND is_active",
                )
                .bind(course_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found("Course not found"))?;

                Ok(Affiliation {
                    department_id: Some(department_id),
                    course_id: Some(course_id),
                })
            }
            _ => Err(AppError::validation("Invalid teacher role")),
        }
    }

    async fn check_single_principal(db: &PgPool, exclude: Option<Uuid>) -> Result<(), AppError> {
        let existing = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM teachers
                WHERE role = 'principal' AND is_active AND ($1::uuid IS NULL OR id <> $1)
             )",
        )
        .bind(exclude)
        .fetch_one(db)
        .await?;

        if existing {
            return Err(AppError::validation("An active principal already exists"));
        }

        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn create_teacher(
        db: &PgPool,
        auth_user: &AuthUser,
        dto: CreateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let manager_role = auth_user.role()?;
        let target_role = Role::parse(&dto.role)
            .map_err(|_| AppError::validation("Invalid teacher role"))?;

        if !matches!(target_role, Role::Principal | Role::Hod | Role::Tutor) {
            return Err(AppError::validation("Invalid teacher role"));
        }
        if !Self::can_manage_role(manager_role, target_role) {
            return Err(AppError::forbidden("Access denied"));
        }

        let affiliation =
            Self::resolve_affiliation(db, target_role, dto.department_id, dto.course_id).await?;

        // HOD may only add tutors within their own department.
        if manager_role == Role::Hod && affiliation.department_id != auth_user.department_id() {
            return Err(AppError::forbidden(
                "HOD can only add tutors in their own department",
            ));
        }

        if target_role == Role::Principal {
            Self::check_single_principal(db, None).await?;
        }

        let hashed_password = hash_password(&dto.password)?;

        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            "INSERT INTO teachers (name, email, phone_number, employee_id, role,
                                   department_id, course_id, password)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {TEACHER_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.phone_number)
        .bind(&dto.employee_id)
        .bind(target_role.as_str())
        .bind(affiliation.department_id)
        .bind(affiliation.course_id)
        .bind(&hashed_password)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::validation(
                        "Teacher with this email or employee ID already exists",
                    );
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found("Department not found");
                }
            }
            AppError::database(e)
        })?;

        Ok(teacher)
    }

    #[instrument(skip(db))]
    pub async fn list_teachers(
        db: &PgPool,
        auth_user: &AuthUser,
        role_filter: Option<String>,
        department_filter: Option<Uuid>,
    ) -> Result<Vec<TeacherWithNames>, AppError> {
        if let Some(role) = role_filter.as_deref() {
            Role::parse(role).map_err(|_| AppError::validation("Invalid role filter"))?;
        }

        // HODs only see teachers in their own department.
        let department_filter = match auth_user.role()? {
            Role::Admin | Role::Principal => department_filter,
            Role::Hod => auth_user.department_id(),
            _ => return Err(AppError::forbidden("Access denied")),
        };

        let teachers = sqlx::query_as::<_, TeacherWithNames>(&format!(
            "{TEACHER_WITH_NAMES}
             WHERE t.is_active
               AND ($1::varchar IS NULL OR t.role = $1)
               AND ($2::uuid IS NULL OR t.department_id = $2)
             ORDER BY t.name"
        ))
        .bind(role_filter)
        .bind(department_filter)
        .fetch_all(db)
        .await?;

        Ok(teachers)
    }

    /// Detail view for a single teacher, scoped the same way as the
    /// listing. HODs only see teachers in their own department.
    #[instrument(skip(db))]
    pub async fn get_teacher(
        db: &PgPool,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<TeacherWithNames, AppError> {
        let teacher = sqlx::query_as::<_, TeacherWithNames>(&format!(
            "{TEACHER_WITH_NAMES} WHERE t.id = $1 AND t.is_active"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

        match auth_user.role()? {
            Role::Admin | Role::Principal => {}
            Role::Hod => {
                if teacher.department_id.is_none()
                    || teacher.department_id != auth_user.department_id()
                {
                    return Err(AppError::forbidden("Access denied"));
                }
            }
            _ => return Err(AppError::forbidden("Access denied")),
        }

        Ok(teacher)
    }

    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, teacher_id: Uuid) -> Result<TeacherWithNames, AppError> {
        let teacher = sqlx::query_as::<_, TeacherWithNames>(&format!(
            "{TEACHER_WITH_NAMES} WHERE t.id = $1"
        ))
        .bind(teacher_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

        Ok(teacher)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        auth_user: &AuthUser,
        id: Uuid,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let existing = Self::fetch_teacher(db, id).await?;
        Self::check_manage_target(auth_user, &existing)?;

        let target_role = Role::parse(&existing.role)?;
        let affiliation = Self::resolve_affiliation(
            db,
            target_role,
            dto.department_id.or(existing.department_id),
            dto.course_id.or(existing.course_id),
        )
        .await?;

        let password = dto.password.map(|p| hash_password(&p)).transpose()?;

        let teacher = sqlx::query_as::<_, Teacher>(&format!(
            "UPDATE teachers
             SET name = $1, email = $2, phone_number = $3,
                 department_id = $4, course_id = $5,
                 password = COALESCE($6, password), updated_at = NOW()
             WHERE id = $7
             RETURNING {TEACHER_COLUMNS}"
        ))
        .bind(dto.name.unwrap_or(existing.name))
        .bind(dto.email.unwrap_or(existing.email))
        .bind(dto.phone_number.unwrap_or(existing.phone_number))
        .bind(affiliation.department_id)
        .bind(affiliation.course_id)
        .bind(password)
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(teacher)
    }

    #[instrument(skip(db))]
    pub async fn deactivate_teacher(
        db: &PgPool,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<(), AppError> {
        let existing = Self::fetch_teacher(db, id).await?;
        Self::check_manage_target(auth_user, &existing)?;

        sqlx::query("UPDATE teachers SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    async fn fetch_teacher(db: &PgPool, id: Uuid) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(&format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
    }

    fn check_manage_target(auth_user: &AuthUser, target: &Teacher) -> Result<(), AppError> {
        let manager_role = auth_user.role()?;
        let target_role = Role::parse(&target.role)?;

        if !Self::can_manage_role(manager_role, target_role) {
            return Err(AppError::forbidden("Access denied"));
        }
        if manager_role == Role::Hod && target.department_id != auth_user.department_id() {
            return Err(AppError::forbidden("Access denied"));
        }

        Ok(())
    }
}
