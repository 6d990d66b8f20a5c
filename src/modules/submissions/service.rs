use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::Role;
use crate::modules::forms::model::FormField;
use crate::modules::forms::service::FormService;
use crate::utils::errors::AppError;

use super::model::{
    FormSubmission, ReviewAction, ReviewerRule, ReviewerScope, SubmissionStage, SubmissionView,
};

const SUBMISSION_COLUMNS: &str = "id, form_id, student_id, data, status, submitted_at, \
     tutor_reviewed_by, tutor_reviewed_at, tutor_comments, \
     hod_reviewed_by, hod_reviewed_at, hod_comments, \
     principal_reviewed_by, principal_reviewed_at, principal_comments";

const SUBMISSION_VIEW: &str = "SELECT fs.id, fs.form_id AS form, f.title AS form_title,
            fs.student_id AS student, s.name AS student_name, s.college_id AS student_college_id,
            fs.data, fs.status, fs.submitted_at,
            fs.tutor_reviewed_by, fs.tutor_reviewed_at, fs.tutor_comments,
            fs.hod_reviewed_by, fs.hod_reviewed_at, fs.hod_comments,
            fs.principal_reviewed_by, fs.principal_reviewed_at, fs.principal_comments
     FROM form_submissions fs
     JOIN forms f ON f.id = fs.form_id
     JOIN students s ON s.id = fs.student_id";

/// Affiliation of the submitting student, used to resolve reviewers.
#[derive(Debug, FromRow)]
struct StudentAffiliation {
    department_id: Uuid,
    course_id: Uuid,
}

pub struct SubmissionService;

impl SubmissionService {
    /// A required field must be present and non-empty. Fields are checked
    /// in field order so the first error reported is the first field on
    /// the form.
    fn validate_required_fields(
        fields: &[FormField],
        data: &Map<String, Value>,
    ) -> Result<(), AppError> {
        for field in fields {
            if !field.is_required {
                continue;
            }
            let empty = match data.get(&field.label) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            };
            if empty {
                return Err(AppError::validation(format!(
                    "{} is required",
                    field.label
                )));
            }
        }
        Ok(())
    }

    /// Resubmission appends: a student may hold multiple independent
    /// submissions against the same form.
    #[instrument(skip(db, data))]
    pub async fn submit(
        db: &PgPool,
        auth_user: &AuthUser,
        form_id: Uuid,
        data: Map<String, Value>,
    ) -> Result<FormSubmission, AppError> {
        if auth_user.role()? != Role::Student {
            return Err(AppError::forbidden("Only students can submit forms"));
        }

        let form = FormService::get_active_form(db, form_id).await?;
        Self::validate_required_fields(&form.fields, &data)?;

        let submission = sqlx::query_as::<_, FormSubmission>(&format!(
            "INSERT INTO form_submissions (form_id, student_id, data)
             VALUES ($1, $2, $3)
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(form_id)
        .bind(auth_user.user_id()?)
        .bind(Value::Object(data))
        .fetch_one(db)
        .await?;

        info!(submission_id = %submission.id, form_id = %form_id, "form submitted");

        Ok(submission)
    }

    #[instrument(skip(db))]
    pub async fn list_my_submissions(
        db: &PgPool,
        auth_user: &AuthUser,
    ) -> Result<Vec<SubmissionView>, AppError> {
        if auth_user.role()? != Role::Student {
            return Err(AppError::forbidden("Access denied"));
        }

        let submissions = sqlx::query_as::<_, SubmissionView>(&format!(
            "{SUBMISSION_VIEW} WHERE fs.student_id = $1 ORDER BY fs.submitted_at DESC"
        ))
        .bind(auth_user.user_id()?)
        .fetch_all(db)
        .await?;

        Ok(submissions)
    }

    /// Submissions awaiting the caller. Admins see everything; each
    /// teacher role sees the submissions parked at their stage within
    /// their scope.
    #[instrument(skip(db))]
    pub async fn list_for_reviewer(
        db: &PgPool,
        auth_user: &AuthUser,
    ) -> Result<Vec<SubmissionView>, AppError> {
        let (status, department_filter, course_filter) = match auth_user.role()? {
            Role::Admin => (None, None, None),
            Role::Principal => (Some("pending_principal"), None, None),
            Role::Hod => {
                let dept = auth_user
                    .department_id()
                    .ok_or_else(|| AppError::forbidden("Access denied"))?;
                (Some("pending_hod"), Some(dept), None)
            }
            Role::Tutor => {
                let course = auth_user
                    .course_id()
                    .ok_or_else(|| AppError::forbidden("Access denied"))?;
                (Some("pending_tutor"), None, Some(course))
            }
            _ => return Err(AppError::forbidden("Access denied")),
        };

        let submissions = sqlx::query_as::<_, SubmissionView>(&format!(
            "{SUBMISSION_VIEW}
             WHERE ($1::varchar IS NULL OR fs.status = $1)
               AND ($2::uuid IS NULL OR s.department_id = $2)
               AND ($3::uuid IS NULL OR s.course_id = $3)
             ORDER BY fs.submitted_at"
        ))
        .bind(status)
        .bind(department_filter)
        .bind(course_filter)
        .fetch_all(db)
        .await?;

        Ok(submissions)
    }

    #[instrument(skip(db))]
    pub async fn get_submission(
        db: &PgPool,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<SubmissionView, AppError> {
        let submission = sqlx::query_as::<_, SubmissionView>(&format!(
            "{SUBMISSION_VIEW} WHERE fs.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Submission not found"))?;

        // Students may only read their own submissions.
        if auth_user.role()? == Role::Student && submission.student != auth_user.user_id()? {
            return Err(AppError::forbidden("Access denied"));
        }

        Ok(submission)
    }

    /// The single teacher authorized to act at a pending stage, matched
    /// against the submitting student's affiliation per the rule table.
    async fn resolve_reviewer(
        db: &PgPool,
        rule: &ReviewerRule,
        student: &StudentAffiliation,
    ) -> Result<Uuid, AppError> {
        let scope_id = match rule.scope {
            ReviewerScope::StudentCourse => Some(student.course_id),
            ReviewerScope::StudentDepartment => Some(student.department_id),
            ReviewerScope::Any => None,
        };
        let scope_column = match rule.scope {
            ReviewerScope::StudentCourse => "course_id",
            ReviewerScope::StudentDepartment => "department_id",
            ReviewerScope::Any => "id",
        };

        let reviewer_id = sqlx::query_scalar::<_, Uuid>(&format!(
            "SELECT id FROM teachers
             WHERE role = $1 AND is_active AND ($2::uuid IS NULL OR {scope_column} = $2)
             LIMIT 1"
        ))
        .bind(rule.role.as_str())
        .bind(scope_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(rule.missing_message))?;

        Ok(reviewer_id)
    }

    /// Apply a review decision. The stage write is a compare-and-swap on
    /// the stage observed at read time; a racing reviewer loses with
    /// `InvalidState` rather than overwriting.
    #[instrument(skip(db, comments))]
    pub async fn review(
        db: &PgPool,
        auth_user: &AuthUser,
        submission_id: Uuid,
        action: &str,
        comments: Option<String>,
    ) -> Result<SubmissionStage, AppError> {
        let submission = sqlx::query_as::<_, FormSubmission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM form_submissions WHERE id = $1"
        ))
        .bind(submission_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Submission not found"))?;

        let action = ReviewAction::parse(action)?;

        let stage = SubmissionStage::parse(&submission.status)?;
        let next_stage = stage.transition(action)?;

        let rule = stage
            .reviewer_rule()
            .ok_or_else(|| AppError::invalid_state("Submission has already been finalized"))?;

        let student = sqlx::query_as::<_, StudentAffiliation>(
            "SELECT department_id, course_id FROM students WHERE id = $1",
        )
        .bind(submission.student_id)
        .fetch_one(db)
        .await?;

        let required_reviewer = Self::resolve_reviewer(db, &rule, &student).await?;

        // Identity match is by exact id, not role.
        if auth_user.user_id()? != required_reviewer {
            return Err(AppError::forbidden(
                "You are not the assigned reviewer for this submission",
            ));
        }

        // Audit slot and stage change land in one conditional write.
        let prefix = stage
            .audit_prefix()
            .ok_or_else(|| AppError::invalid_state("Submission has already been finalized"))?;

        let result = sqlx::query(&format!(
            "UPDATE form_submissions
             SET status = $1,
                 {prefix}_reviewed_by = $2,
                 {prefix}_reviewed_at = NOW(),
                 {prefix}_comments = $3
             WHERE id = $4 AND status = $5"
        ))
        .bind(next_stage.as_str())
        .bind(required_reviewer)
        .bind(comments.unwrap_or_default())
        .bind(submission_id)
        .bind(stage.as_str())
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::invalid_state(
                "Submission was reviewed concurrently. Refresh and try again.",
            ));
        }

        info!(
            submission_id = %submission_id,
            from = stage.as_str(),
            to = next_stage.as_str(),
            "submission reviewed"
        );

        Ok(next_stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(label: &str, required: bool) -> FormField {
        FormField {
            id: Uuid::new_v4(),
            form_id: Uuid::new_v4(),
            label: label.to_string(),
            field_type: "text".to_string(),
            is_required: required,
            placeholder: String::new(),
            options: serde_json::json!([]),
            field_order: 0,
        }
    }

    fn data(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_required_field_present() {
        let fields = vec![field("Reason", true)];
        let data = data(&[("Reason", Value::String("leave".into()))]);
        assert!(SubmissionService::validate_required_fields(&fields, &data).is_ok());
    }

    #[test]
    fn test_required_field_missing() {
        let fields = vec![field("Reason", true)];
        let err = SubmissionService::validate_required_fields(&fields, &data(&[])).unwrap_err();
        assert!(err.message().contains("Reason"));
    }

    #[test]
    fn test_required_field_blank_string_rejected() {
        let fields = vec![field("Reason", true)];
        let data = data(&[("Reason", Value::String("   ".into()))]);
        assert!(SubmissionService::validate_required_fields(&fields, &data).is_err());
    }

    #[test]
    fn test_optional_field_may_be_absent() {
        let fields = vec![field("Notes", false)];
        assert!(SubmissionService::validate_required_fields(&fields, &data(&[])).is_ok());
    }

    #[test]
    fn test_errors_reported_in_field_order() {
        let mut first = field("First", true);
        first.field_order = 0;
        let mut second = field("Second", true);
        second.field_order = 1;

        let err = SubmissionService::validate_required_fields(&[first, second], &data(&[]))
            .unwrap_err();
        assert!(err.message().contains("First"));
    }
}
