use chrono::{NaiveDate, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::verify_password;

use super::model::{LoginResponse, PrincipalIdentity, PrincipalKind, Role};

/// One row of the unified directory lookup, spanning the admin, teacher,
/// and student tables.
#[derive(Debug, FromRow)]
struct DirectoryRow {
    id: Uuid,
    name: String,
    email: String,
    password: String,
    kind: String,
    role: String,
    department_id: Option<Uuid>,
    course_id: Option<Uuid>,
    is_active: bool,
    approval_status: Option<String>,
    academic_year_start: Option<NaiveDate>,
    academic_year_end: Option<NaiveDate>,
}

impl DirectoryRow {
    /// Whether today falls inside the stamped academic year window.
    /// Staff rows carry no window and are always considered active.
    fn academic_year_active(&self) -> bool {
        let today = Utc::now().date_naive();
        let started = self.academic_year_start.is_none_or(|start| start <= today);
        let not_ended = self.academic_year_end.is_none_or(|end| today <= end);
        started && not_ended
    }
}

pub struct AuthService;

impl AuthService {
    /// Single login endpoint for every principal kind. The email is looked
    /// up across all three directories; admins win on a (misconfigured)
    /// email collision, then teachers, then students.
    #[instrument(skip(db, jwt_config, password))]
    pub async fn login(
        db: &PgPool,
        jwt_config: &JwtConfig,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AppError> {
        let row = sqlx::query_as::<_, DirectoryRow>(
            "SELECT id, name, email, password, 'admin' AS kind, 'admin' AS role,
                    NULL::uuid AS department_id, NULL::uuid AS course_id,
                    is_active, NULL::varchar AS approval_status,
                    NULL::date AS academic_year_start, NULL::date AS academic_year_end,
                    0 AS ord
             FROM admins WHERE email = $1
             UNION ALL
             SELECT id, name, email, password, 'teacher' AS kind, role,
                    department_id, course_id,
                    is_active, NULL::varchar AS approval_status,
                    NULL::date AS academic_year_start, NULL::date AS academic_year_end,
                    1 AS ord
             FROM teachers WHERE email = $1
             UNION ALL
             SELECT id, name, email, password, 'student' AS kind, 'student' AS role,
                    department_id, course_id,
                    is_active, approval_status,
                    academic_year_start, academic_year_end, 2 AS ord
             FROM students WHERE email = $1
             ORDER BY ord
             LIMIT 1",
        )
        .bind(email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        if !verify_password(password, &row.password)? {
            return Err(AppError::unauthorized("Invalid credentials"));
        }
        if !row.is_active {
            return Err(AppError::forbidden("Account is deactivated"));
        }
        // Students cannot sign in until a staff member approves them, and
        // an approved account lapses once its academic year window ends.
        if let Some(status) = row.approval_status.as_deref() {
            match status {
                "approved" => {}
                "rejected" => {
                    return Err(AppError::forbidden(
                        "Your registration was rejected. Contact your department.",
                    ));
                }
                _ => {
                    return Err(AppError::forbidden(
                        "Account pending approval. Contact your tutor.",
                    ));
                }
            }
            if !row.academic_year_active() {
                return Err(AppError::forbidden(
                    "Academic year has ended. Contact administration.",
                ));
            }
        }

        let identity = PrincipalIdentity {
            id: row.id,
            email: row.email.clone(),
            kind: PrincipalKind::parse(&row.kind)?,
            role: Role::parse(&row.role)?,
            department_id: row.department_id,
            course_id: row.course_id,
        };

        let token = create_access_token(&identity, jwt_config)?;

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
            user_type: identity.kind,
            user_role: identity.role,
            user: json!({
                "id": row.id,
                "name": row.name,
                "email": row.email,
                "role": identity.role,
                "department_id": row.department_id,
                "course_id": row.course_id,
                "academic_year_active": row.academic_year_active(),
            }),
        })
    }
}
