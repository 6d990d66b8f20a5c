use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::Role;
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

use super::model::{RegisterStudentDto, ReviewStudentDto, Student, StudentWithNames};

const STUDENT_COLUMNS: &str = "id, name, email, phone_number, address, college_id, \
     department_id, course_id, approval_status, approved_at, \
     academic_year_start, academic_year_end, is_active, created_at, updated_at";

const STUDENT_WITH_NAMES: &str = "SELECT s.id, s.name, s.email, s.phone_number, s.address, s.college_id,
            s.department_id, d.name AS department_name,
            s.course_id, c.name AS course_name,
            s.approval_status, s.approved_at,
            s.academic_year_start, s.academic_year_end, s.created_at
     FROM students s
     JOIN departments d ON d.id = s.department_id
     JOIN courses c ON c.id = s.course_id";

/// Scope a staff member may see students through: tutors their course,
/// HODs their department, principals and admins everything.
enum StudentScope {
    All,
    Department(Uuid),
    Course(Uuid),
}

pub struct StudentService;

impl StudentService {
    /// Self-registration. New students land in `pending` until a staff
    /// member approves them; the department is derived from the course.
    #[instrument(skip(db, dto))]
    pub async fn register_student(
        db: &PgPool,
        dto: RegisterStudentDto,
    ) -> Result<Student, AppError> {
        let department_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT department_id FROM courses WHERE id = $1 AND is_active",
        )
        .bind(dto.course_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))?;

        let hashed_password = hash_password(&dto.password)?;

        let student = sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO students (name, email, phone_number, address, college_id,
                                   department_id, course_id, password)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.phone_number)
        .bind(dto.address.unwrap_or_default())
        .bind(&dto.college_id)
        .bind(department_id)
        .bind(dto.course_id)
        .bind(&hashed_password)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::validation(
                        "Student with this email or college ID already exists",
                    );
                }
            }
            AppError::database(e)
        })?;

        Ok(student)
    }

    fn scope_for(auth_user: &AuthUser) -> Result<StudentScope, AppError> {
        match auth_user.role()? {
            Role::Admin | Role::Principal => Ok(StudentScope::All),
            Role::Hod => auth_user
                .department_id()
                .map(StudentScope::Department)
                .ok_or_else(|| AppError::forbidden("Access denied")),
            Role::Tutor => auth_user
                .course_id()
                .map(StudentScope::Course)
                .ok_or_else(|| AppError::forbidden("Access denied")),
            _ => Err(AppError::forbidden("Access denied")),
        }
    }

    async fn list_by_status(
        db: &PgPool,
        auth_user: &AuthUser,
        status: &str,
    ) -> Result<Vec<StudentWithNames>, AppError> {
        let (department_filter, course_filter) = match Self::scope_for(auth_user)? {
            StudentScope::All => (None, None),
            StudentScope::Department(id) => (Some(id), None),
            StudentScope::Course(id) => (None, Some(id)),
        };

        let students = sqlx::query_as::<_, StudentWithNames>(&format!(
            "{STUDENT_WITH_NAMES}
             WHERE s.is_active AND s.approval_status = $1
               AND ($2::uuid IS NULL OR s.department_id = $2)
               AND ($3::uuid IS NULL OR s.course_id = $3)
             ORDER BY s.created_at"
        ))
        .bind(status)
        .bind(department_filter)
        .bind(course_filter)
        .fetch_all(db)
        .await?;

        Ok(students)
    }

    #[instrument(skip(db))]
    pub async fn list_pending(
        db: &PgPool,
        auth_user: &AuthUser,
    ) -> Result<Vec<StudentWithNames>, AppError> {
        Self::list_by_status(db, auth_user, "pending").await
    }

    #[instrument(skip(db))]
    pub async fn list_approved(
        db: &PgPool,
        auth_user: &AuthUser,
    ) -> Result<Vec<StudentWithNames>, AppError> {
        Self::list_by_status(db, auth_user, "approved").await
    }

    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, student_id: Uuid) -> Result<StudentWithNames, AppError> {
        let student = sqlx::query_as::<_, StudentWithNames>(&format!(
            "{STUDENT_WITH_NAMES} WHERE s.id = $1"
        ))
        .bind(student_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

        Ok(student)
    }

    /// Approve or reject a pending registration. Tutors may list pending
    /// students in their course but only HOD and above can review them.
    #[instrument(skip(db, dto))]
    pub async fn review_student(
        db: &PgPool,
        auth_user: &AuthUser,
        student_id: Uuid,
        dto: ReviewStudentDto,
    ) -> Result<Student, AppError> {
        let approve = match dto.action.as_str() {
            "approve" => true,
            "reject" => false,
            _ => return Err(AppError::validation("Action must be approve or reject")),
        };

        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(student_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;

        let in_scope = match auth_user.role()? {
            Role::Admin | Role::Principal => true,
            Role::Hod => auth_user.department_id() == Some(student.department_id),
            _ => {
                return Err(AppError::forbidden(
                    "Only HOD and above can review student registrations",
                ));
            }
        };
        if !in_scope {
            return Err(AppError::forbidden("Access denied"));
        }

        // Only a pending registration may be reviewed. Approval stamps the
        // academic year window; a rejection leaves those columns alone.
        let updated = if approve {
            let (year_start, year_end) = match (dto.academic_year_start, dto.academic_year_end) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    return Err(AppError::validation(
                        "Academic year start and end dates are required to approve",
                    ));
                }
            };
            if year_end <= year_start {
                return Err(AppError::validation(
                    "Academic year end must be after the start",
                ));
            }

            sqlx::query_as::<_, Student>(&format!(
                "UPDATE students
                 SET approval_status = 'approved', approved_at = NOW(),
                     academic_year_start = $1, academic_year_end = $2,
                     updated_at = NOW()
                 WHERE id = $3 AND approval_status = 'pending'
                 RETURNING {STUDENT_COLUMNS}"
            ))
            .bind(year_start)
            .bind(year_end)
            .bind(student_id)
            .fetch_optional(db)
            .await?
        } else {
            sqlx::query_as::<_, Student>(&format!(
                "UPDATE students
                 SET approval_status = 'rejected', updated_at = NOW()
                 WHERE id = $1 AND approval_status = 'pending'
                 RETURNING {STUDENT_COLUMNS}"
            ))
            .bind(student_id)
            .fetch_optional(db)
            .await?
        };

        updated.ok_or_else(|| {
            AppError::invalid_state("Student registration has already been reviewed")
        })
    }
}
