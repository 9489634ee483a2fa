use tracing::{info, warn};

use crate::auth::session::Session;
use crate::models::{Identity, LoginUser, NewUser, PublicUser, RegisterUser, Role, User};
use crate::utils::context::AppContext;
use crate::utils::errors::{AppError, AppResult};

/// Accounts created on first start when seeding is enabled.
const DEFAULT_ACCOUNTS: [(&str, &str, &str, Role); 2] = [
    ("admin", "admin@example.com", "password", Role::Admin),
    ("user", "user@example.com", "password", Role::User),
];

/// Creates a `user`-role account and logs it in.
pub async fn register(app: &AppContext, body: RegisterUser) -> AppResult<(PublicUser, Session)> {
    body.check()?;

    if app.store.get_user_by_username(&body.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }
    if app.store.get_user_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".into()));
    }

    let password = app.passwords.hash(&body.password)?;
    let user = app
        .store
        .create_user(NewUser {
            username: body.username,
            email: body.email,
            password,
            role: Role::User,
        })
        .await?;

    let session = app.sessions.create(user.id, &user.username, app.config.session_ttl).await?;
    info!(user_id = user.id, username = %user.username, "registered");
    Ok((user.into(), session))
}

/// Verifies a username-or-email credential and opens a session.
pub async fn login(app: &AppContext, body: LoginUser) -> AppResult<(PublicUser, Session)> {
    body.check()?;

    let user = match app.store.get_user_by_username(&body.username).await? {
        Some(user) => Some(user),
        None => app.store.get_user_by_email(&body.username).await?,
    };
    let Some(user) = user.filter(|u| app.passwords.verify(&body.password, &u.password)) else {
        warn!(login = %body.username, "failed login");
        return Err(AppError::InvalidCredentials);
    };

    let session = app.sessions.create(user.id, &user.username, app.config.session_ttl).await?;
    info!(user_id = user.id, "logged in");
    Ok((user.into(), session))
}

pub async fn logout(app: &AppContext, token: Option<&str>) -> AppResult<()> {
    if let Some(token) = token {
        app.sessions.destroy(token).await?;
    }
    Ok(())
}

/// Resolves a session token to the identity of a still-existing user.
pub async fn resolve_identity(app: &AppContext, token: Option<&str>) -> AppResult<Identity> {
    let user = session_user(app, token).await?;
    Ok(Identity::from(&user))
}

pub async fn current_user(app: &AppContext, token: Option<&str>) -> AppResult<PublicUser> {
    Ok(session_user(app, token).await?.into())
}

// The user is re-read on every request so role changes apply immediately.
async fn session_user(app: &AppContext, token: Option<&str>) -> AppResult<User> {
    let token = token.ok_or(AppError::Unauthenticated)?;
    let session = app
        .sessions
        .get(token)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    app.store
        .get_user(session.user_id)
        .await?
        .filter(|user| user.username == session.username)
        .ok_or(AppError::Unauthenticated)
}

/// Creates the default admin and user accounts unless their usernames exist.
pub async fn seed_default_accounts(app: &AppContext) -> AppResult<()> {
    for (username, email, password, role) in DEFAULT_ACCOUNTS {
        if app.store.get_user_by_username(username).await?.is_some() {
            continue;
        }
        let password = app.passwords.hash(password)?;
        let created = app
            .store
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password,
                role,
            })
            .await;
        match created {
            Ok(user) => info!(user_id = user.id, %role, "seeded default account {username}"),
            // another isolate got there first
            Err(AppError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
