use worker::Request;

use crate::auth::policy;
use crate::models::Identity;
use crate::services::auth_service;
use crate::utils::context::AppContext;
use crate::utils::cookies::{self, SESSION_COOKIE};
use crate::utils::errors::AppResult;

/// Reads the session token from the `Cookie` header. `None` if missing or empty.
pub fn session_token(req: &Request) -> Option<String> {
    let header = req.headers().get("Cookie").ok().flatten()?;
    cookies::find(&header, SESSION_COOKIE).map(str::to_string)
}

/// Gate for session routes: `Unauthenticated` unless the token resolves.
pub async fn authenticate(app: &AppContext, token: Option<&str>) -> AppResult<Identity> {
    auth_service::resolve_identity(app, token).await
}

/// Gate for admin routes: additionally `Forbidden` for non-admins.
pub async fn require_admin(app: &AppContext, token: Option<&str>) -> AppResult<Identity> {
    let identity = authenticate(app, token).await?;
    policy::ensure_admin(&identity)?;
    Ok(identity)
}
