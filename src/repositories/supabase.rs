use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::Storage;
use crate::db::{SupabaseClient, SupabaseError};
use crate::models::{NewTodo, NewUser, Role, Todo, TodoFields, User};
use crate::utils::errors::{AppError, AppResult};

const USERS: &str = "users";
const TODOS: &str = "todos";
const USER_COLUMNS: &str = "id,username,email,password,role";
const TODO_COLUMNS: &str = "id,title,description,dueDate,category,completed,userId,username";
// unique indexes from migrations/0001_init.sql
const USERNAME_INDEX: &str = "users_username_key";
const EMAIL_INDEX: &str = "users_email_key";

impl From<SupabaseError> for AppError {
    fn from(e: SupabaseError) -> Self {
        match e {
            // unique index violation
            SupabaseError::Status { status: 409, body } => {
                let constraint = violated_constraint(&body);
                if constraint.contains(USERNAME_INDEX) {
                    AppError::Conflict("Username already exists".into())
                } else if constraint.contains(EMAIL_INDEX) {
                    AppError::Conflict("Email already exists".into())
                } else {
                    AppError::Conflict("Record already exists".into())
                }
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// The `message` of a PostgREST error body, which names the index but not
/// the offending value. Falls back to the raw body.
fn violated_constraint(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Persistent backend: Postgres behind PostgREST. Ids come from identity
/// columns and uniqueness from indexes on the lowercased username/email
/// (`migrations/0001_init.sql`).
pub struct SupabaseStorage {
    client: SupabaseClient,
}

impl SupabaseStorage {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn rows<T: DeserializeOwned>(&self, table: &str, params: &[(&str, String)]) -> AppResult<Vec<T>> {
        let value = self.client.select(table, params).await?;
        decode_rows(value)
    }

    async fn first<T: DeserializeOwned>(&self, table: &str, params: &[(&str, String)]) -> AppResult<Option<T>> {
        Ok(self.rows(table, params).await?.into_iter().next())
    }
}

fn decode_rows<T: DeserializeOwned>(value: serde_json::Value) -> AppResult<Vec<T>> {
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        other => Err(AppError::Internal(format!("Expected array, got: {other}"))),
    }
}

fn single<T: DeserializeOwned>(value: serde_json::Value) -> AppResult<Option<T>> {
    Ok(decode_rows(value)?.into_iter().next())
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

#[async_trait(?Send)]
impl Storage for SupabaseStorage {
    async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        self.first(USERS, &[("select", USER_COLUMNS.into()), ("id", eq(id))])
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.first(
            USERS,
            &[("select", USER_COLUMNS.into()), ("username_key", eq(username.to_lowercase()))],
        )
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.first(
            USERS,
            &[("select", USER_COLUMNS.into()), ("email_key", eq(email.to_lowercase()))],
        )
        .await
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let value = self.client.insert(USERS, serde_json::to_value(&user)?).await?;
        single(value)?.ok_or_else(|| AppError::Internal("No user returned".into()))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.rows(USERS, &[("select", USER_COLUMNS.into()), ("order", "id.asc".into())])
            .await
    }

    async fn update_user_role(&self, id: i64, role: Role) -> AppResult<Option<User>> {
        let value = self
            .client
            .update(
                USERS,
                &[("id", eq(id)), ("select", USER_COLUMNS.into())],
                json!({ "role": role }),
            )
            .await?;
        single(value)
    }

    async fn create_todo(&self, todo: NewTodo) -> AppResult<Todo> {
        let value = self.client.insert(TODOS, serde_json::to_value(&todo)?).await?;
        single(value)?.ok_or_else(|| AppError::Internal("No todo returned".into()))
    }

    async fn list_todos(&self, user_id: i64) -> AppResult<Vec<Todo>> {
        self.rows(
            TODOS,
            &[
                ("select", TODO_COLUMNS.into()),
                ("userId", eq(user_id)),
                ("order", "id.asc".into()),
            ],
        )
        .await
    }

    async fn list_all_todos(&self) -> AppResult<Vec<Todo>> {
        self.rows(TODOS, &[("select", TODO_COLUMNS.into()), ("order", "id.asc".into())])
            .await
    }

    async fn get_todo(&self, id: i64) -> AppResult<Option<Todo>> {
        self.first(TODOS, &[("select", TODO_COLUMNS.into()), ("id", eq(id))])
            .await
    }

    async fn update_todo(&self, id: i64, fields: TodoFields) -> AppResult<Option<Todo>> {
        let value = self
            .client
            .update(
                TODOS,
                &[("id", eq(id)), ("select", TODO_COLUMNS.into())],
                serde_json::to_value(&fields)?,
            )
            .await?;
        single(value)
    }

    async fn delete_todo(&self, id: i64) -> AppResult<bool> {
        let value = self.client.delete(TODOS, &[("id", eq(id))]).await?;
        Ok(!decode_rows::<serde_json::Value>(value)?.is_empty())
    }

    async fn toggle_todo(&self, id: i64) -> AppResult<Option<Todo>> {
        // PostgREST has no in-place negation; read then write (last writer wins).
        let Some(todo) = self.get_todo(id).await? else {
            return Ok(None);
        };
        let value = self
            .client
            .update(
                TODOS,
                &[("id", eq(id)), ("select", TODO_COLUMNS.into())],
                json!({ "completed": !todo.completed }),
            )
            .await?;
        single(value)
    }
}
