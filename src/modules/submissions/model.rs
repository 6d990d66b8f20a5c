//! Submission entities and the approval state machine.
//!
//! The stage transition table and the per-stage reviewer rules are the
//! two authoritative data structures of the workflow. Everything else in
//! the module derives from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::auth::model::Role;
use crate::utils::errors::AppError;

/// Position of a submission in the three-tier approval chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStage {
    PendingTutor,
    PendingHod,
    PendingPrincipal,
    Approved,
    Rejected,
}

impl SubmissionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStage::PendingTutor => "pending_tutor",
            SubmissionStage::PendingHod => "pending_hod",
            SubmissionStage::PendingPrincipal => "pending_principal",
            SubmissionStage::Approved => "approved",
            SubmissionStage::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "pending_tutor" => Ok(SubmissionStage::PendingTutor),
            "pending_hod" => Ok(SubmissionStage::PendingHod),
            "pending_principal" => Ok(SubmissionStage::PendingPrincipal),
            "approved" => Ok(SubmissionStage::Approved),
            "rejected" => Ok(SubmissionStage::Rejected),
            _ => Err(AppError::internal_error(format!(
                "Invalid submission stage: {}",
                s
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionStage::Approved | SubmissionStage::Rejected)
    }

    /// Stage transition table. Approval walks the chain one stage at a
    /// time; rejection is terminal from any pending stage.
    pub fn transition(&self, action: ReviewAction) -> Result<SubmissionStage, AppError> {
        match (self, action) {
            (SubmissionStage::Approved | SubmissionStage::Rejected, _) => Err(
                AppError::invalid_state("Submission has already been finalized"),
            ),
            (SubmissionStage::PendingTutor, ReviewAction::Approve) => {
                Ok(SubmissionStage::PendingHod)
            }
            (SubmissionStage::PendingHod, ReviewAction::Approve) => {
                Ok(SubmissionStage::PendingPrincipal)
            }
            (SubmissionStage::PendingPrincipal, ReviewAction::Approve) => {
                Ok(SubmissionStage::Approved)
            }
            (_, ReviewAction::Reject) => Ok(SubmissionStage::Rejected),
        }
    }

    /// The reviewer rule for a pending stage: which teacher role reviews
    /// it, and how that teacher is matched to the submitting student.
    pub fn reviewer_rule(&self) -> Option<ReviewerRule> {
        match self {
            SubmissionStage::PendingTutor => Some(ReviewerRule {
                role: Role::Tutor,
                scope: ReviewerScope::StudentCourse,
                missing_message: "Course tutor not found",
            }),
            SubmissionStage::PendingHod => Some(ReviewerRule {
                role: Role::Hod,
                scope: ReviewerScope::StudentDepartment,
                missing_message: "Department HOD not found",
            }),
            SubmissionStage::PendingPrincipal => Some(ReviewerRule {
                role: Role::Principal,
                scope: ReviewerScope::Any,
                missing_message: "Principal not found",
            }),
            _ => None,
        }
    }

    /// The audit column prefix written when this pending stage is vacated.
    pub fn audit_prefix(&self) -> Option<&'static str> {
        match self {
            SubmissionStage::PendingTutor => Some("tutor"),
            SubmissionStage::PendingHod => Some("hod"),
            SubmissionStage::PendingPrincipal => Some("principal"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            _ => Err(AppError::validation("Action must be approve or reject")),
        }
    }
}

/// How the required reviewer is matched against the submitting student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewerScope {
    StudentCourse,
    StudentDepartment,
    Any,
}

#[derive(Debug, Clone, Copy)]
pub struct ReviewerRule {
    pub role: Role,
    pub scope: ReviewerScope,
    pub missing_message: &'static str,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FormSubmission {
    pub id: Uuid,
    pub form_id: Uuid,
    pub student_id: Uuid,
    pub data: serde_json::Value,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub tutor_reviewed_by: Option<Uuid>,
    pub tutor_reviewed_at: Option<DateTime<Utc>>,
    pub tutor_comments: String,
    pub hod_reviewed_by: Option<Uuid>,
    pub hod_reviewed_at: Option<DateTime<Utc>>,
    pub hod_comments: String,
    pub principal_reviewed_by: Option<Uuid>,
    pub principal_reviewed_at: Option<DateTime<Utc>>,
    pub principal_comments: String,
}

/// API shape of a submission, joined with form and student identity.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct SubmissionView {
    pub id: Uuid,
    pub form: Uuid,
    pub form_title: String,
    pub student: Uuid,
    pub student_name: String,
    pub student_college_id: String,
    pub data: serde_json::Value,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub tutor_reviewed_by: Option<Uuid>,
    pub tutor_reviewed_at: Option<DateTime<Utc>>,
    pub tutor_comments: String,
    pub hod_reviewed_by: Option<Uuid>,
    pub hod_reviewed_at: Option<DateTime<Utc>>,
    pub hod_comments: String,
    pub principal_reviewed_by: Option<Uuid>,
    pub principal_reviewed_at: Option<DateTime<Utc>>,
    pub principal_comments: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitFormDto {
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewSubmissionDto {
    /// "approve" or "reject"
    pub action: String,
    pub comments: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionsResponse {
    pub submissions: Vec<SubmissionView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionCreatedResponse {
    pub message: String,
    pub submission_id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub message: String,
    pub status: String,
}
