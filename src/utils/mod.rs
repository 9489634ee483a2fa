pub mod config;
pub mod context;
pub mod cookies;
pub mod cors;
pub mod errors;
