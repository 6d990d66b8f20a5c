use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::{Claims, Role};
use crate::utils::errors::AppError;

use super::model::{
    CreateFormDto, CreateFormFieldDto, FIELD_TYPES, Form, FormField, FormWithFields, UpdateFormDto,
};

const FORM_COLUMNS: &str =
    "id, title, description, department_id, is_active, created_by_role, created_by_id, created_at";

const FIELD_COLUMNS: &str =
    "id, form_id, label, field_type, is_required, placeholder, options, field_order";

pub struct FormService;

impl FormService {
    /// Whether `actor` may update or delete `form`. Admins manage every
    /// form; a principal manages their own and any HOD-created form; an
    /// HOD manages only forms they created themselves.
    pub fn can_manage_form(actor: &AuthUser, actor_role: Role, form: &Form) -> bool {
        let actor_id = actor.user_id().ok();
        match actor_role {
            Role::Admin => true,
            Role::Principal => {
                form.created_by_role == "hod" || Some(form.created_by_id) == actor_id
            }
            Role::Hod => {
                form.created_by_role == "hod" && Some(form.created_by_id) == actor_id
            }
            _ => false,
        }
    }

    fn validate_fields(fields: &[CreateFormFieldDto]) -> Result<(), AppError> {
        for field in fields {
            if !FIELD_TYPES.contains(&field.field_type.as_str()) {
                return Err(AppError::validation(format!(
                    "Invalid field type: {}",
                    field.field_type
                )));
            }
        }
        Ok(())
    }

    async fn insert_fields(
        tx: &mut Transaction<'_, Postgres>,
        form_id: Uuid,
        fields: &[CreateFormFieldDto],
    ) -> Result<(), AppError> {
        for (order, field) in fields.iter().enumerate() {
            sqlx::query(
                "INSERT INTO form_fields (form_id, label, field_type, is_required,
                                          placeholder, options, field_order)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(form_id)
            .bind(&field.label)
            .bind(&field.field_type)
            .bind(field.is_required)
            .bind(field.placeholder.as_deref().unwrap_or_default())
            .bind(field.options.clone().unwrap_or_else(|| serde_json::json!([])))
            .bind(order as i32)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn create_form(
        db: &PgPool,
        auth_user: &AuthUser,
        dto: CreateFormDto,
    ) -> Result<Form, AppError> {
        let role = auth_user.role()?;

        // HOD-created forms are pinned to the HOD's own department.
        let department_id = match role {
            Role::Admin | Role::Principal => dto.department_id,
            Role::Hod => {
                let own = auth_user.department_id();
                if dto.department_id.is_some() && dto.department_id != own {
                    return Err(AppError::validation(
                        "HOD can only create forms for their own department",
                    ));
                }
                if own.is_none() {
                    return Err(AppError::validation(
                        "HOD can only create forms for their own department",
                    ));
                }
                own
            }
            _ => return Err(AppError::forbidden("Access denied")),
        };

        Self::validate_fields(&dto.fields)?;

        let mut tx = db.begin().await?;

        let form = sqlx::query_as::<_, Form>(&format!(
            "INSERT INTO forms (title, description, department_id, created_by_role, created_by_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {FORM_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(dto.description.unwrap_or_default())
        .bind(department_id)
        .bind(role.as_str())
        .bind(auth_user.user_id()?)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_fields(&mut tx, form.id, &dto.fields).await?;

        tx.commit().await?;

        Ok(form)
    }

    /// Visibility filter: anonymous viewers and admins/principals see all
    /// active forms; HODs, tutors, and students see department-matching
    /// and department-less forms.
    #[instrument(skip(db, viewer))]
    pub async fn list_forms(
        db: &PgPool,
        viewer: Option<&Claims>,
    ) -> Result<Vec<FormWithFields>, AppError> {
        let department_filter = match viewer {
            None => None,
            Some(claims) => match Role::parse(&claims.role)? {
                Role::Admin | Role::Principal => None,
                _ => claims.department_id,
            },
        };

        let forms = sqlx::query_as::<_, Form>(&format!(
            "SELECT {FORM_COLUMNS} FROM forms
             WHERE is_active
               AND ($1::uuid IS NULL OR department_id = $1 OR department_id IS NULL)
             ORDER BY created_at DESC"
        ))
        .bind(department_filter)
        .fetch_all(db)
        .await?;

        let mut result = Vec::with_capacity(forms.len());
        for form in forms {
            let fields = Self::fetch_fields(db, form.id).await?;
            result.push(FormWithFields { form, fields });
        }

        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn get_active_form(db: &PgPool, id: Uuid) -> Result<FormWithFields, AppError> {
        let form = sqlx::query_as::<_, Form>(&format!(
            "SELECT {FORM_COLUMNS} FROM forms WHERE id = $1 AND is_active"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Form not found"))?;

        let fields = Self::fetch_fields(db, form.id).await?;

        Ok(FormWithFields { form, fields })
    }

    pub async fn fetch_fields(db: &PgPool, form_id: Uuid) -> Result<Vec<FormField>, AppError> {
        let fields = sqlx::query_as::<_, FormField>(&format!(
            "SELECT {FIELD_COLUMNS} FROM form_fields WHERE form_id = $1 ORDER BY field_order"
        ))
        .bind(form_id)
        .fetch_all(db)
        .await?;

        Ok(fields)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_form(
        db: &PgPool,
        auth_user: &AuthUser,
        id: Uuid,
        dto: UpdateFormDto,
    ) -> Result<Form, AppError> {
        let existing = Self::fetch_form(db, id).await?;

        let role = auth_user.role()?;
        if !Self::can_manage_form(auth_user, role, &existing) {
            return Err(AppError::forbidden("Access denied"));
        }

        // An absent department_id keeps the current value; an explicit
        // null clears it. HOD forms stay pinned to the HOD's department.
        let department_id = match dto.department_id {
            Some(value) => value,
            None => existing.department_id,
        };
        if role == Role::Hod && department_id != auth_user.department_id() {
            return Err(AppError::validation(
                "HOD can only manage forms for their own department",
            ));
        }

        if let Some(fields) = &dto.fields {
            Self::validate_fields(fields)?;
        }

        let mut tx = db.begin().await?;

        let form = sqlx::query_as::<_, Form>(&format!(
            "UPDATE forms
             SET title = $1, description = $2, department_id = $3, is_active = $4
             WHERE id = $5
             RETURNING {FORM_COLUMNS}"
        ))
        .bind(dto.title.unwrap_or(existing.title))
        .bind(dto.description.unwrap_or(existing.description))
        .bind(department_id)
        .bind(dto.is_active.unwrap_or(existing.is_active))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(fields) = &dto.fields {
            sqlx::query("DELETE FROM form_fields WHERE form_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_fields(&mut tx, id, fields).await?;
        }

        tx.commit().await?;

        Ok(form)
    }

    #[instrument(skip(db))]
    pub async fn delete_form(db: &PgPool, auth_user: &AuthUser, id: Uuid) -> Result<(), AppError> {
        let existing = Self::fetch_form(db, id).await?;

        if !Self::can_manage_form(auth_user, auth_user.role()?, &existing) {
            return Err(AppError::forbidden("Access denied"));
        }

        sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    async fn fetch_form(db: &PgPool, id: Uuid) -> Result<Form, AppError> {
        sqlx::query_as::<_, Form>(&format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Form not found"))
    }
}
