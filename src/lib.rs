//! Multi-user todo API with session-cookie auth and admin roles, served from a
//! Cloudflare Worker.
//!
//! Users register, log in, and manage their own todos; admins see every todo
//! and promote or demote other users. Storage and session backends are picked
//! from Worker vars at startup (see [`utils::config::Config`]).

pub mod auth;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

use middleware::logging;
use utils::config::Config;
use utils::context::AppContext;
use utils::cors;
use std::sync::OnceLock;
use worker::*;

static CONFIG: OnceLock<Config> = OnceLock::new();

#[event(fetch)]
async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    logging::init(Config::log_level_from_env(&env));
    // Vars are fixed for the lifetime of an isolate.
    let config = CONFIG.get_or_init(|| Config::from_env(&env));

    // Handle CORS preflight (OPTIONS) requests
    if req.method() == Method::Options {
        return cors::handle_preflight(config);
    }

    let start = Date::now().as_millis();
    let app = match AppContext::from_env(&env, config.clone()).await {
        Ok(app) => app,
        Err(e) => {
            logging::log_error(&format!("startup: {e}"));
            return cors::add_headers(e.into_response()?, config);
        }
    };
    let request_id = app.request_id.clone();
    logging::log_request(&req, &request_id);

    let res = router(app).run(req, env).await?;

    logging::log_response(res.status_code(), &request_id, Date::now().as_millis() - start);
    cors::add_headers(res, config)
}

fn router(app: AppContext) -> Router<'static, AppContext> {
    use handlers::{admin_handler, auth_handler, health, todo_handler};

    Router::with_data(app)
        .get("/health", health::health_check)
        .post_async("/api/auth/register", auth_handler::register)
        .post_async("/api/auth/login", auth_handler::login)
        .post_async("/api/auth/logout", auth_handler::logout)
        .get_async("/api/user", auth_handler::current_user)
        .get_async("/api/todos", todo_handler::list_todos)
        .post_async("/api/todos", todo_handler::create_todo)
        .get_async("/api/todos/:id", todo_handler::get_todo)
        .put_async("/api/todos/:id", todo_handler::update_todo)
        .delete_async("/api/todos/:id", todo_handler::delete_todo)
        .patch_async("/api/todos/:id/toggle", todo_handler::toggle_todo)
        .get_async("/api/admin/users", admin_handler::list_users)
        .patch_async("/api/admin/users/:id/role", admin_handler::update_user_role)
        .get_async("/api/admin/todos", admin_handler::list_todos)
}
