//! Ownership and role rules. Pure functions over an identity and a record.

use crate::models::{Identity, Role, Todo};
use crate::utils::errors::{AppError, AppResult};

/// Owners and admins may read and mutate a todo.
pub fn can_access_todo(identity: &Identity, todo: &Todo) -> bool {
    identity.id == todo.user_id || identity.role == Role::Admin
}

/// Checks a role change requested by `acting`. Whether `acting` is an admin
/// at all is decided by [`ensure_admin`] at the route gate.
pub fn can_change_role(acting: &Identity, target_user_id: i64, new_role: &str) -> AppResult<Role> {
    let role: Role = new_role.parse()?;
    if acting.id == target_user_id && role != Role::Admin {
        return Err(AppError::SelfDemotion);
    }
    Ok(role)
}

pub fn ensure_admin(identity: &Identity) -> AppResult<()> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You do not have permission to access this resource",
        ))
    }
}
