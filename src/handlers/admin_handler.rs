use worker::{Request, Response, Result, RouteContext};

use super::{parse_body, parse_id, reply, Reply};
use crate::middleware::auth::{self, session_token};
use crate::models::UpdateRole;
use crate::services::admin_service;
use crate::utils::context::AppContext;
use crate::utils::errors::AppResult;

pub(crate) async fn list_users_reply(app: &AppContext, token: Option<&str>) -> AppResult<Reply> {
    let identity = auth::require_admin(app, token).await?;
    let users = admin_service::list_users(app, &identity).await?;
    Reply::json(&users, 200)
}

pub(crate) async fn update_user_role_reply(
    app: &AppContext,
    token: Option<&str>,
    id: Option<&str>,
    body: &str,
) -> AppResult<Reply> {
    let identity = auth::require_admin(app, token).await?;
    let target_id = parse_id(id, "Invalid user ID")?;
    let body: UpdateRole = parse_body(body)?;
    let user = admin_service::update_user_role(app, &identity, target_id, &body.role).await?;
    Reply::json(&user, 200)
}

pub(crate) async fn list_todos_reply(app: &AppContext, token: Option<&str>) -> AppResult<Reply> {
    let identity = auth::require_admin(app, token).await?;
    let todos = admin_service::list_all_todos(app, &identity).await?;
    Reply::json(&todos, 200)
}

pub async fn list_users(req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    reply(list_users_reply(&ctx.data, token.as_deref()).await)
}

pub async fn update_user_role(mut req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    let body = req.text().await?;
    let id = ctx.param("id").map(String::as_str);
    reply(update_user_role_reply(&ctx.data, token.as_deref(), id, &body).await)
}

pub async fn list_todos(req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    reply(list_todos_reply(&ctx.data, token.as_deref()).await)
}
