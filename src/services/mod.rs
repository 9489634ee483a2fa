//! Request-independent operations. Every call takes the app context and, where
//! relevant, the caller's identity explicitly.

pub mod admin_service;
pub mod auth_service;
pub mod todo_service;
