use tracing::debug;

use crate::auth::policy::{can_access_todo, ensure_admin};
use crate::models::{Identity, NewTodo, Todo, TodoDraft};
use crate::utils::context::AppContext;
use crate::utils::errors::{AppError, AppResult};

pub async fn list(app: &AppContext, identity: &Identity) -> AppResult<Vec<Todo>> {
    app.store.list_todos(identity.id).await
}

pub async fn list_all(app: &AppContext, identity: &Identity) -> AppResult<Vec<Todo>> {
    ensure_admin(identity)?;
    app.store.list_all_todos().await
}

pub async fn create(app: &AppContext, identity: &Identity, draft: TodoDraft) -> AppResult<Todo> {
    let fields = draft.into_fields()?;

    // The owner must exist at creation time; the username is snapshotted from it.
    let owner = app
        .store
        .get_user(identity.id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    let todo = app
        .store
        .create_todo(NewTodo {
            fields,
            completed: false,
            user_id: owner.id,
            username: owner.username,
        })
        .await?;
    debug!(todo_id = todo.id, user_id = todo.user_id, "todo created");
    Ok(todo)
}

/// Loads a todo the caller may act on: `NotFound` first, then `Forbidden`.
async fn authorized(app: &AppContext, identity: &Identity, id: i64, action: &str) -> AppResult<Todo> {
    let todo = app
        .store
        .get_todo(id)
        .await?
        .ok_or_else(|| AppError::not_found("Todo not found"))?;
    if !can_access_todo(identity, &todo) {
        return Err(AppError::Forbidden(format!(
            "You do not have permission to {action} this todo"
        )));
    }
    Ok(todo)
}

pub async fn get(app: &AppContext, identity: &Identity, id: i64) -> AppResult<Todo> {
    authorized(app, identity, id, "access").await
}

pub async fn update(
    app: &AppContext,
    identity: &Identity,
    id: i64,
    draft: TodoDraft,
) -> AppResult<Todo> {
    let fields = draft.into_fields()?;
    authorized(app, identity, id, "update").await?;
    app.store
        .update_todo(id, fields)
        .await?
        .ok_or_else(|| AppError::not_found("Todo not found"))
}

pub async fn delete(app: &AppContext, identity: &Identity, id: i64) -> AppResult<()> {
    authorized(app, identity, id, "delete").await?;
    app.store.delete_todo(id).await?;
    debug!(todo_id = id, by = identity.id, "todo deleted");
    Ok(())
}

pub async fn toggle(app: &AppContext, identity: &Identity, id: i64) -> AppResult<Todo> {
    authorized(app, identity, id, "update").await?;
    app.store
        .toggle_todo(id)
        .await?
        .ok_or_else(|| AppError::not_found("Todo not found"))
}
