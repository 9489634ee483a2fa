pub mod memory;
pub mod supabase;

use async_trait::async_trait;

use crate::models::{NewTodo, NewUser, Role, Todo, TodoFields, User};
use crate::utils::errors::AppResult;

pub use memory::MemoryStorage;
pub use supabase::SupabaseStorage;

/// User and todo persistence. Ids are assigned by the backend and are unique
/// under concurrent creates. Username and email lookups ignore case.
#[async_trait(?Send)]
pub trait Storage {
    async fn get_user(&self, id: i64) -> AppResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Fails with `Conflict` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
    async fn update_user_role(&self, id: i64, role: Role) -> AppResult<Option<User>>;

    async fn create_todo(&self, todo: NewTodo) -> AppResult<Todo>;
    async fn list_todos(&self, user_id: i64) -> AppResult<Vec<Todo>>;
    async fn list_all_todos(&self) -> AppResult<Vec<Todo>>;
    async fn get_todo(&self, id: i64) -> AppResult<Option<Todo>>;
    async fn update_todo(&self, id: i64, fields: TodoFields) -> AppResult<Option<Todo>>;

    /// Returns whether a record was removed; deleting a missing id is not an error.
    async fn delete_todo(&self, id: i64) -> AppResult<bool>;
    async fn toggle_todo(&self, id: i64) -> AppResult<Option<Todo>>;
}
