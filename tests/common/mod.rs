#![allow(dead_code)]

use std::sync::Arc;

use todo_worker::auth::password::PasswordService;
use todo_worker::auth::session::MemorySessionStore;
use todo_worker::models::{Identity, NewUser, RegisterUser, Role, TodoDraft};
use todo_worker::repositories::{MemoryStorage, Storage};
use todo_worker::services::auth_service;
use todo_worker::utils::config::Config;
use todo_worker::utils::context::AppContext;

/// Context over fresh memory backends with cheap password hashing.
pub fn app() -> AppContext {
    AppContext::new(
        Config::default(),
        Arc::new(MemoryStorage::new()),
        Arc::new(MemorySessionStore::new()),
        PasswordService::new(1024, 1).unwrap(),
    )
}

pub fn register_body(username: &str, email: &str, password: &str) -> RegisterUser {
    RegisterUser {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
    }
}

/// Registers a regular user and returns its identity.
pub async fn user(app: &AppContext, username: &str) -> Identity {
    let body = register_body(username, &format!("{username}@example.com"), "password123");
    let (user, _) = auth_service::register(app, body).await.unwrap();
    Identity {
        id: user.id,
        username: user.username,
        role: user.role,
    }
}

/// Inserts an admin straight into the store.
pub async fn admin(app: &AppContext, username: &str) -> Identity {
    let password = app.passwords.hash("password123").unwrap();
    let user = app
        .store
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password,
            role: Role::Admin,
        })
        .await
        .unwrap();
    Identity::from(&user)
}

pub fn draft(title: &str, category: &str) -> TodoDraft {
    TodoDraft {
        title: title.to_string(),
        description: None,
        due_date: None,
        category: category.to_string(),
    }
}
