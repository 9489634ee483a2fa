use serde::Serialize;
use thiserror::Error;
use worker::Response;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Flattens validator output into wire-named field errors, ordered by field.
    pub fn collect(errors: &validator::ValidationErrors) -> Vec<FieldError> {
        let mut out: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = camel_case(&field);
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {field}")),
                })
            })
            .collect();
        out.sort_by(|a, b| a.field.cmp(&b.field));
        out
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("{0}")]
    InvalidId(&'static str),

    #[error("Invalid role. Role must be 'user' or 'admin'")]
    InvalidRole,

    #[error("You cannot demote yourself from admin")]
    SelfDemotion,

    #[error("{0}")]
    Conflict(String),

    #[error("Incorrect username/email or password")]
    InvalidCredentials,

    #[error("Unauthorized: Please log in to access this resource")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        AppError::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    pub fn forbidden(msg: &str) -> Self {
        AppError::Forbidden(msg.to_string())
    }

    pub fn not_found(msg: &str) -> Self {
        AppError::NotFound(msg.to_string())
    }

    pub fn status(&self) -> u16 {
        match self {
            AppError::Validation { .. }
            | AppError::InvalidId(_)
            | AppError::InvalidRole
            | AppError::SelfDemotion
            | AppError::Conflict(_) => 400,
            AppError::InvalidCredentials | AppError::Unauthenticated => 401,
            AppError::Forbidden(_) => 403,
            AppError::NotFound(_) => 404,
            AppError::Internal(_) => 500,
        }
    }

    /// JSON body for the error. Internal details stay in the logs.
    pub fn body(&self) -> serde_json::Value {
        match self {
            AppError::Validation { message, errors } => {
                serde_json::json!({ "message": message, "errors": errors })
            }
            AppError::Internal(_) => serde_json::json!({ "message": "Internal server error" }),
            other => serde_json::json!({ "message": other.to_string() }),
        }
    }

    pub fn into_response(self) -> worker::Result<Response> {
        if let AppError::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }
        Ok(Response::from_json(&self.body())?.with_status(self.status()))
    }
}

impl From<worker::Error> for AppError {
    fn from(e: worker::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::validation(FieldError::collect(&e))
    }
}

/// Converts a handler outcome into the response the router expects.
pub fn respond(result: AppResult<Response>) -> worker::Result<Response> {
    match result {
        Ok(res) => Ok(res),
        Err(e) => e.into_response(),
    }
}
