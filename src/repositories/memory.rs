use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;

use super::Storage;
use crate::models::{NewTodo, NewUser, Role, Todo, TodoFields, User};
use crate::utils::errors::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    todos: BTreeMap<i64, Todo>,
    last_user_id: i64,
    last_todo_id: i64,
}

/// Process-local backend. Everything happens under one lock, so id assignment
/// and the uniqueness checks are atomic.
#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instance shared by every request served from this isolate.
    pub fn shared() -> Arc<MemoryStorage> {
        static SHARED: OnceLock<Arc<MemoryStorage>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(MemoryStorage::new())).clone()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory storage lock poisoned".into()))
    }
}

fn same_key(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn find_user<'a>(tables: &'a Tables, pred: impl Fn(&User) -> bool) -> Option<&'a User> {
    tables.users.values().find(|u| pred(u))
}

#[async_trait(?Send)]
impl Storage for MemoryStorage {
    async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.lock()?;
        Ok(find_user(&tables, |u| same_key(&u.username, username)).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.lock()?;
        Ok(find_user(&tables, |u| same_key(&u.email, email)).cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.lock()?;
        if find_user(&tables, |u| same_key(&u.username, &user.username)).is_some() {
            return Err(AppError::Conflict("Username already exists".into()));
        }
        if find_user(&tables, |u| same_key(&u.email, &user.email)).is_some() {
            return Err(AppError::Conflict("Email already exists".into()));
        }

        tables.last_user_id += 1;
        let created = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            password: user.password,
            role: user.role,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    async fn update_user_role(&self, id: i64, role: Role) -> AppResult<Option<User>> {
        let mut tables = self.lock()?;
        Ok(tables.users.get_mut(&id).map(|u| {
            u.role = role;
            u.clone()
        }))
    }

    async fn create_todo(&self, todo: NewTodo) -> AppResult<Todo> {
        let mut tables = self.lock()?;
        tables.last_todo_id += 1;
        let created = Todo {
            id: tables.last_todo_id,
            title: todo.fields.title,
            description: todo.fields.description,
            due_date: todo.fields.due_date,
            category: todo.fields.category,
            completed: todo.completed,
            user_id: todo.user_id,
            username: todo.username,
        };
        tables.todos.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_todos(&self, user_id: i64) -> AppResult<Vec<Todo>> {
        Ok(self
            .lock()?
            .todos
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all_todos(&self) -> AppResult<Vec<Todo>> {
        Ok(self.lock()?.todos.values().cloned().collect())
    }

    async fn get_todo(&self, id: i64) -> AppResult<Option<Todo>> {
        Ok(self.lock()?.todos.get(&id).cloned())
    }

    async fn update_todo(&self, id: i64, fields: TodoFields) -> AppResult<Option<Todo>> {
        let mut tables = self.lock()?;
        Ok(tables.todos.get_mut(&id).map(|t| {
            t.apply(fields);
            t.clone()
        }))
    }

    async fn delete_todo(&self, id: i64) -> AppResult<bool> {
        Ok(self.lock()?.todos.remove(&id).is_some())
    }

    async fn toggle_todo(&self, id: i64) -> AppResult<Option<Todo>> {
        let mut tables = self.lock()?;
        Ok(tables.todos.get_mut(&id).map(|t| {
            t.completed = !t.completed;
            t.clone()
        }))
    }
}
