use worker::{Headers, Response, Result};

use super::config::Config;

pub fn get_headers(config: &Config) -> Result<Headers> {
    let mut headers = Headers::new();
    match &config.cors_allow_origin {
        // credentialed requests need an explicit origin
        Some(origin) => {
            headers.set("Access-Control-Allow-Origin", origin)?;
            headers.set("Access-Control-Allow-Credentials", "true")?;
            headers.set("Vary", "Origin")?;
        }
        None => headers.set("Access-Control-Allow-Origin", "*")?,
    }
    headers.set(
        "Access-Control-Allow-Methods",
        "GET, POST, PUT, PATCH, DELETE, OPTIONS",
    )?;
    headers.set("Access-Control-Allow-Headers", "Content-Type, Authorization")?;
    headers.set("Access-Control-Max-Age", "86400")?; // 24 hours
    Ok(headers)
}

pub fn add_headers(mut res: Response, config: &Config) -> Result<Response> {
    let cors_headers = get_headers(config)?;
    for (key, value) in cors_headers.entries() {
        res.headers_mut().set(&key, &value)?;
    }
    Ok(res)
}

pub fn handle_preflight(config: &Config) -> Result<Response> {
    add_headers(Response::empty()?.with_status(204), config)
}
