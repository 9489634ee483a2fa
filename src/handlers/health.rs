use worker::{Request, Response, Result, RouteContext};

use crate::utils::context::AppContext;

pub fn health_check(_req: Request, ctx: RouteContext<AppContext>) -> Result<Response> {
    let mut res = Response::ok(format!("OK from {}", ctx.data.config.app_name))?;
    res.headers_mut().set("x-backend", "workers-rust")?;
    Ok(res)
}
