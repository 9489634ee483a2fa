use worker::{Request, Response, Result, RouteContext};

use super::{parse_body, parse_id, reply, Reply};
use crate::middleware::auth::{self, session_token};
use crate::models::TodoDraft;
use crate::services::todo_service;
use crate::utils::context::AppContext;
use crate::utils::errors::AppResult;

const INVALID_ID: &str = "Invalid todo ID";

pub(crate) async fn list_reply(app: &AppContext, token: Option<&str>) -> AppResult<Reply> {
    let identity = auth::authenticate(app, token).await?;
    let todos = todo_service::list(app, &identity).await?;
    Reply::json(&todos, 200)
}

pub(crate) async fn create_reply(app: &AppContext, token: Option<&str>, body: &str) -> AppResult<Reply> {
    let identity = auth::authenticate(app, token).await?;
    let draft: TodoDraft = parse_body(body)?;
    let todo = todo_service::create(app, &identity, draft).await?;
    Reply::json(&todo, 201)
}

pub(crate) async fn get_reply(app: &AppContext, token: Option<&str>, id: Option<&str>) -> AppResult<Reply> {
    let identity = auth::authenticate(app, token).await?;
    let id = parse_id(id, INVALID_ID)?;
    let todo = todo_service::get(app, &identity, id).await?;
    Reply::json(&todo, 200)
}

pub(crate) async fn update_reply(
    app: &AppContext,
    token: Option<&str>,
    id: Option<&str>,
    body: &str,
) -> AppResult<Reply> {
    let identity = auth::authenticate(app, token).await?;
    let id = parse_id(id, INVALID_ID)?;
    let draft: TodoDraft = parse_body(body)?;
    let todo = todo_service::update(app, &identity, id, draft).await?;
    Reply::json(&todo, 200)
}

pub(crate) async fn delete_reply(app: &AppContext, token: Option<&str>, id: Option<&str>) -> AppResult<Reply> {
    let identity = auth::authenticate(app, token).await?;
    let id = parse_id(id, INVALID_ID)?;
    todo_service::delete(app, &identity, id).await?;
    Ok(Reply::message("Todo deleted successfully"))
}

pub(crate) async fn toggle_reply(app: &AppContext, token: Option<&str>, id: Option<&str>) -> AppResult<Reply> {
    let identity = auth::authenticate(app, token).await?;
    let id = parse_id(id, INVALID_ID)?;
    let todo = todo_service::toggle(app, &identity, id).await?;
    Reply::json(&todo, 200)
}

pub async fn list_todos(req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    reply(list_reply(&ctx.data, token.as_deref()).await)
}

pub async fn create_todo(mut req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    let body = req.text().await?;
    reply(create_reply(&ctx.data, token.as_deref(), &body).await)
}

pub async fn get_todo(req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    reply(get_reply(&ctx.data, token.as_deref(), ctx.param("id").map(String::as_str)).await)
}

pub async fn update_todo(mut req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    let body = req.text().await?;
    let id = ctx.param("id").map(String::as_str);
    reply(update_reply(&ctx.data, token.as_deref(), id, &body).await)
}

pub async fn delete_todo(req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    reply(delete_reply(&ctx.data, token.as_deref(), ctx.param("id").map(String::as_str)).await)
}

pub async fn toggle_todo(req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    reply(toggle_reply(&ctx.data, token.as_deref(), ctx.param("id").map(String::as_str)).await)
}
