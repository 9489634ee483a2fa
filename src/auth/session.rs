//! Server-side sessions keyed by an opaque cookie token.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use worker::kv::KvStore;

use crate::utils::errors::{AppError, AppResult};

/// Workers KV rejects expirations shorter than a minute.
const KV_MIN_TTL_SECS: i64 = 60;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    /// Checked against the stored user on resolve, so a token never maps to
    /// another account that happens to reuse the id.
    #[serde(default)]
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: i64, username: &str, ttl: Duration) -> Self {
        let created_at = Utc::now();
        Self {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            username: username.to_string(),
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[async_trait(?Send)]
pub trait SessionStore {
    /// Creates and persists a session with a fixed expiry.
    async fn create(&self, user_id: i64, username: &str, ttl: Duration) -> AppResult<Session>;

    /// Live session for `token`, or `None` when unknown or expired.
    async fn get(&self, token: &str) -> AppResult<Option<Session>>;

    async fn destroy(&self, token: &str) -> AppResult<()>;
}

/// Per-isolate session map.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instance shared by every request served from this isolate.
    pub fn shared() -> Arc<MemorySessionStore> {
        static SHARED: OnceLock<Arc<MemorySessionStore>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(MemorySessionStore::new())).clone()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, Session>>> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal("session store lock poisoned".into()))
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait(?Send)]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: i64, username: &str, ttl: Duration) -> AppResult<Session> {
        let session = Session::new(user_id, username, ttl);
        let now = Utc::now();
        let mut sessions = self.lock()?;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, token: &str) -> AppResult<Option<Session>> {
        let mut sessions = self.lock()?;
        match sessions.get(token) {
            Some(s) if s.is_expired(Utc::now()) => {
                sessions.remove(token);
                Ok(None)
            }
            Some(s) => Ok(Some(s.clone())),
            None => Ok(None),
        }
    }

    async fn destroy(&self, token: &str) -> AppResult<()> {
        self.lock()?.remove(token);
        Ok(())
    }
}

/// Sessions in a Workers KV namespace, one JSON value per token.
pub struct KvSessionStore {
    kv: KvStore,
}

impl KvSessionStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    fn key(token: &str) -> String {
        format!("session:{token}")
    }
}

#[async_trait(?Send)]
impl SessionStore for KvSessionStore {
    async fn create(&self, user_id: i64, username: &str, ttl: Duration) -> AppResult<Session> {
        let session = Session::new(user_id, username, ttl);
        let value = serde_json::to_string(&session)?;
        let ttl_secs = ttl.num_seconds().max(KV_MIN_TTL_SECS) as u64;
        self.kv
            .put(&Self::key(&session.token), value)
            .map_err(worker::Error::from)?
            .expiration_ttl(ttl_secs)
            .execute()
            .await
            .map_err(worker::Error::from)?;
        Ok(session)
    }

    async fn get(&self, token: &str) -> AppResult<Option<Session>> {
        let session = self
            .kv
            .get(&Self::key(token))
            .json::<Session>()
            .await
            .map_err(worker::Error::from)?;
        // KV expiry is eventually consistent; the stored deadline is authoritative.
        Ok(session.filter(|s| !s.is_expired(Utc::now())))
    }

    async fn destroy(&self, token: &str) -> AppResult<()> {
        self.kv
            .delete(&Self::key(token))
            .await
            .map_err(worker::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_session_resolves_until_destroyed() {
        let store = MemorySessionStore::new();
        let session = store.create(4, "alice", Duration::hours(24)).await.unwrap();
        assert_eq!(session.token.len(), 32);
        assert_eq!(session.expires_at - session.created_at, Duration::hours(24));

        let found = store.get(&session.token).await.unwrap().unwrap();
        assert_eq!(found.user_id, 4);
        assert_eq!(found.username, "alice");

        store.destroy(&session.token).await.unwrap();
        assert!(store.get(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let store = MemorySessionStore::new();
        let session = store.create(4, "alice", Duration::zero()).await.unwrap();
        assert!(store.get(&session.token).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn expired_sessions_are_pruned_on_create() {
        let store = MemorySessionStore::new();
        store.create(1, "alice", Duration::seconds(-1)).await.unwrap();
        store.create(2, "alice", Duration::hours(1)).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let store = MemorySessionStore::new();
        let a = store.create(1, "alice", Duration::hours(1)).await.unwrap();
        let b = store.create(1, "alice", Duration::hours(1)).await.unwrap();
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn unknown_token_is_none() {
        let store = MemorySessionStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
        store.destroy("nope").await.unwrap();
    }
}
