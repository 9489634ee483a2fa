use worker::{Request, Response, Result, RouteContext};

use super::{parse_body, reply, Reply};
use crate::auth::session::Session;
use crate::middleware::auth::session_token;
use crate::models::{LoginUser, PublicUser, RegisterUser};
use crate::services::auth_service;
use crate::utils::context::AppContext;
use crate::utils::cookies;
use crate::utils::errors::AppResult;

fn with_session(app: &AppContext, user: &PublicUser, session: &Session, status: u16) -> AppResult<Reply> {
    let cookie =
        cookies::session_cookie(&session.token, app.config.session_ttl, app.config.cookie_secure);
    Ok(Reply::json(user, status)?.with_cookie(cookie))
}

pub(crate) async fn register_reply(app: &AppContext, body: &str) -> AppResult<Reply> {
    let body: RegisterUser = parse_body(body)?;
    let (user, session) = auth_service::register(app, body).await?;
    with_session(app, &user, &session, 201)
}

pub(crate) async fn login_reply(app: &AppContext, body: &str) -> AppResult<Reply> {
    let body: LoginUser = parse_body(body)?;
    let (user, session) = auth_service::login(app, body).await?;
    with_session(app, &user, &session, 200)
}

pub(crate) async fn logout_reply(app: &AppContext, token: Option<&str>) -> AppResult<Reply> {
    auth_service::logout(app, token).await?;
    Ok(Reply::message("Logged out successfully")
        .with_cookie(cookies::clear_session_cookie(app.config.cookie_secure)))
}

pub(crate) async fn current_user_reply(app: &AppContext, token: Option<&str>) -> AppResult<Reply> {
    let user = auth_service::current_user(app, token).await?;
    Reply::json(&user, 200)
}

pub async fn register(mut req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let body = req.text().await?;
    reply(register_reply(&ctx.data, &body).await)
}

pub async fn login(mut req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let body = req.text().await?;
    reply(login_reply(&ctx.data, &body).await)
}

pub async fn logout(req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    reply(logout_reply(&ctx.data, token.as_deref()).await)
}

pub async fn current_user(req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let token = session_token(&req);
    reply(current_user_reply(&ctx.data, token.as_deref()).await)
}
