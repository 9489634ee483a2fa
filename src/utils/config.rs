use std::fmt::Display;
use std::str::FromStr;

use chrono::Duration;
use tracing::{debug, warn, Level};
use worker::Env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Supabase,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "supabase" => Ok(StorageBackend::Supabase),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Kv,
}

impl FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "kv" => Ok(SessionBackend::Kv),
            other => Err(format!("unknown session backend `{other}`")),
        }
    }
}

const DEFAULT_SESSION_TTL_SECS: i64 = 86_400;
const MAX_SESSION_TTL_SECS: i64 = 366 * 86_400;

#[derive(Clone, Debug)]
pub struct Config {
    pub app_name: String,
    pub storage: StorageBackend,
    pub sessions: SessionBackend,
    pub session_kv_binding: String,
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub cors_allow_origin: Option<String>,
    pub seed_default_accounts: bool,
    pub log_level: Level,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Reads Worker vars, falling back to secrets.
    pub fn from_env(env: &Env) -> Self {
        Self::from_lookup(|key| {
            env.var(key)
                .or_else(|_| env.secret(key))
                .map(|v| v.to_string())
                .ok()
        })
    }

    /// `LOG_LEVEL` alone, read quietly so the subscriber can be installed
    /// before the rest of the config is loaded and reports problems.
    pub fn log_level_from_env(env: &Env) -> Level {
        env.var("LOG_LEVEL")
            .ok()
            .and_then(|v| v.to_string().parse().ok())
            .unwrap_or(Level::INFO)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let storage = try_load(&lookup, "STORAGE_BACKEND", "memory");
        let mut sessions = try_load(&lookup, "SESSION_BACKEND", "memory");
        if storage == StorageBackend::Memory && sessions == SessionBackend::Kv {
            // Memory user ids restart at 1 in every isolate, so a shared
            // session would resolve to a different user elsewhere.
            warn!("SESSION_BACKEND=kv needs shared user storage, using memory sessions with STORAGE_BACKEND=memory");
            sessions = SessionBackend::Memory;
        }
        let ttl_secs: i64 = try_load(&lookup, "SESSION_TTL_SECS", "86400");
        Self {
            app_name: try_load(&lookup, "APP_NAME", "todo-worker"),
            storage,
            sessions,
            session_kv_binding: try_load(&lookup, "SESSION_KV_BINDING", "SESSIONS"),
            session_ttl: session_ttl(ttl_secs),
            cookie_secure: try_load(&lookup, "COOKIE_SECURE", "false"),
            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN").filter(|v| !v.trim().is_empty()),
            seed_default_accounts: try_load(&lookup, "SEED_DEFAULT_ACCOUNTS", "true"),
            log_level: try_load(&lookup, "LOG_LEVEL", "info"),
            password_memory_kib: try_load(&lookup, "PASSWORD_MEMORY_KIB", "19456"),
            password_iterations: try_load(&lookup, "PASSWORD_ITERATIONS", "2"),
        }
    }
}

/// Parses `key`, using `default` when the value is missing or malformed.
fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        debug!("{key} not set, using default: {default}");
        default.to_string()
    });
    match raw.parse() {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid {key} value `{raw}`: {e}, using default: {default}");
            parse_default(key, default)
        }
    }
}

/// Positive and at most a year, otherwise the 24h default.
fn session_ttl(secs: i64) -> Duration {
    match Duration::try_seconds(secs) {
        Some(ttl) if secs > 0 && secs <= MAX_SESSION_TTL_SECS => ttl,
        _ => {
            warn!(
                "Invalid SESSION_TTL_SECS value `{secs}`: must be 1..={MAX_SESSION_TTL_SECS}, using default: {DEFAULT_SESSION_TTL_SECS}"
            );
            Duration::seconds(DEFAULT_SESSION_TTL_SECS)
        }
    }
}

fn parse_default<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    default
        .parse()
        .unwrap_or_else(|e| panic!("built-in default for {key} does not parse: {e}"))
}
