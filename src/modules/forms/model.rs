use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const FIELD_TYPES: &[&str] = &[
    "text", "textarea", "number", "email", "date", "select", "radio", "checkbox", "file",
];

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// NULL means the form is visible to every department.
    pub department_id: Option<Uuid>,
    pub is_active: bool,
    pub created_by_role: String,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FormField {
    pub id: Uuid,
    pub form_id: Uuid,
    pub label: String,
    pub field_type: String,
    pub is_required: bool,
    pub placeholder: String,
    pub options: serde_json::Value,
    pub field_order: i32,
}

/// A form together with its ordered field list.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormWithFields {
    #[serde(flatten)]
    pub form: Form,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFormFieldDto {
    #[validate(length(min = 1, max = 200))]
    pub label: String,
    pub field_type: String,
    #[serde(default)]
    pub is_required: bool,
    pub placeholder: Option<String>,
    pub options: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFormDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub department_id: Option<Uuid>,
    #[validate(length(min = 1), nested)]
    pub fields: Vec<CreateFormFieldDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFormDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    /// An absent key keeps the current department; an explicit `null`
    /// clears it and makes the form visible to every department.
    #[serde(default, deserialize_with = "explicit_nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub department_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    /// Replaces the whole field list when present.
    #[validate(length(min = 1), nested)]
    pub fields: Option<Vec<CreateFormFieldDto>>,
}

/// Maps a present key (value or `null`) to `Some(..)` so the update
/// handler can tell "leave unchanged" apart from "set to NULL".
fn explicit_nullable<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormsResponse {
    pub forms: Vec<FormWithFields>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormCreatedResponse {
    pub message: String,
    pub form_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_requires_at_least_one_field() {
        let dto: CreateFormDto = serde_json::from_value(serde_json::json!({
            "title": "Empty Form",
            "fields": []
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_department_absent_vs_null() {
        let dto: UpdateFormDto =
            serde_json::from_value(serde_json::json!({"title": "Renamed"})).unwrap();
        assert_eq!(dto.department_id, None);

        let dto: UpdateFormDto =
            serde_json::from_value(serde_json::json!({"department_id": null})).unwrap();
        assert_eq!(dto.department_id, Some(None));

        let id = Uuid::new_v4();
        let dto: UpdateFormDto =
            serde_json::from_value(serde_json::json!({"department_id": id})).unwrap();
        assert_eq!(dto.department_id, Some(Some(id)));
    }
}
