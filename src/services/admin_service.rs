use tracing::info;

use crate::auth::policy::{can_change_role, ensure_admin};
use crate::models::{Identity, PublicUser, Todo};
use crate::services::todo_service;
use crate::utils::context::AppContext;
use crate::utils::errors::{AppError, AppResult};

pub async fn list_users(app: &AppContext, identity: &Identity) -> AppResult<Vec<PublicUser>> {
    ensure_admin(identity)?;
    let users = app.store.list_users().await?;
    Ok(users.into_iter().map(PublicUser::from).collect())
}

pub async fn update_user_role(
    app: &AppContext,
    identity: &Identity,
    target_id: i64,
    role: &str,
) -> AppResult<PublicUser> {
    ensure_admin(identity)?;
    let role = can_change_role(identity, target_id, role)?;

    if app.store.get_user(target_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }
    let user = app
        .store
        .update_user_role(target_id, role)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    info!(target_id, %role, by = identity.id, "role changed");
    Ok(user.into())
}

pub async fn list_all_todos(app: &AppContext, identity: &Identity) -> AppResult<Vec<Todo>> {
    todo_service::list_all(app, identity).await
}
