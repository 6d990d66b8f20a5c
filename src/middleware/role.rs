//! Role-based authorization middleware.
//!
//! Route-level gating uses layer functions (`require_admin`,
//! `require_staff`); finer decisions that depend on the target record
//! (department scoping, form ownership, reviewer identity) live in the
//! services and use the check helpers here.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<Role>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    let user_role = auth_user.role()?;

    if !allowed_roles.contains(&user_role) {
        return Err(AppError::forbidden("Access denied"));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Admin-only routes.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, vec![Role::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Staff routes: admin plus any teacher role.
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![Role::Admin, Role::Principal, Role::Hod, Role::Tutor],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[Role]) -> Result<(), AppError> {
    let user_role = auth_user.role()?;

    if !allowed_roles.contains(&user_role) {
        return Err(AppError::forbidden("Access denied"));
    }

    Ok(())
}

/// Hierarchy level of a role (higher number = more privileges).
pub fn role_hierarchy_level(role: Role) -> u8 {
    match role {
        Role::Admin => 4,
        Role::Principal => 3,
        Role::Hod => 2,
        Role::Tutor => 1,
        Role::Student => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(role_hierarchy_level(Role::Admin) > role_hierarchy_level(Role::Principal));
        assert!(role_hierarchy_level(Role::Principal) > role_hierarchy_level(Role::Hod));
        assert!(role_hierarchy_level(Role::Hod) > role_hierarchy_level(Role::Tutor));
        assert!(role_hierarchy_level(Role::Tutor) > role_hierarchy_level(Role::Student));
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [
            Role::Admin,
            Role::Principal,
            Role::Hod,
            Role::Tutor,
            Role::Student,
        ] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
        assert!(Role::parse("registrar").is_err());
    }
}
