pub mod admin_handler;
pub mod auth_handler;
pub mod health;
pub mod todo_handler;

use serde::de::DeserializeOwned;
use serde::Serialize;
use worker::Response;

use crate::utils::errors::{respond, AppError, AppResult, FieldError};

/// A handler's answer before it becomes a `worker::Response`.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub body: serde_json::Value,
    pub cookie: Option<String>,
}

impl Reply {
    pub fn json<T: Serialize>(value: &T, status: u16) -> AppResult<Self> {
        Ok(Self {
            status,
            body: serde_json::to_value(value)?,
            cookie: None,
        })
    }

    pub fn message(msg: &str) -> Self {
        Self {
            status: 200,
            body: serde_json::json!({ "message": msg }),
            cookie: None,
        }
    }

    pub fn with_cookie(mut self, cookie: String) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn into_response(self) -> AppResult<Response> {
        let mut res = Response::from_json(&self.body)?.with_status(self.status);
        if let Some(cookie) = &self.cookie {
            res.headers_mut().set("Set-Cookie", cookie)?;
        }
        Ok(res)
    }
}

/// Turns a handler outcome, success or error, into the router's response.
pub(crate) fn reply(result: AppResult<Reply>) -> worker::Result<Response> {
    respond(result.and_then(Reply::into_response))
}

/// Parses an `:id` route parameter.
pub(crate) fn parse_id(raw: Option<&str>, invalid: &'static str) -> AppResult<i64> {
    raw.and_then(|raw| raw.parse().ok())
        .ok_or(AppError::InvalidId(invalid))
}

/// Malformed or mistyped JSON bodies are validation errors, not 500s.
pub(crate) fn parse_body<T: DeserializeOwned>(text: &str) -> AppResult<T> {
    serde_json::from_str(text).map_err(|e| {
        AppError::validation(vec![FieldError::new("body", &format!("Invalid JSON: {e}"))])
    })
}
