use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;
use worker::Env;

use super::config::{Config, SessionBackend, StorageBackend};
use super::errors::AppResult;
use crate::auth::password::PasswordService;
use crate::auth::session::{KvSessionStore, MemorySessionStore, SessionStore};
use crate::db::SupabaseClient;
use crate::repositories::{MemoryStorage, Storage, SupabaseStorage};
use crate::services::auth_service;

static SEEDED: AtomicBool = AtomicBool::new(false);

/// Per-request handle on configuration and backends.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn Storage>,
    pub sessions: Arc<dyn SessionStore>,
    pub passwords: PasswordService,
    pub request_id: String,
}

impl AppContext {
    pub fn new(
        config: Config,
        store: Arc<dyn Storage>,
        sessions: Arc<dyn SessionStore>,
        passwords: PasswordService,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            sessions,
            passwords,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Builds the backends named by `config` and seeds the default accounts
    /// once per isolate.
    pub async fn from_env(env: &Env, config: Config) -> AppResult<Self> {
        let store: Arc<dyn Storage> = match config.storage {
            StorageBackend::Memory => MemoryStorage::shared(),
            StorageBackend::Supabase => {
                let client = SupabaseClient::from_env(env)?;
                Arc::new(SupabaseStorage::new(client))
            }
        };
        let sessions: Arc<dyn SessionStore> = match config.sessions {
            SessionBackend::Memory => MemorySessionStore::shared(),
            SessionBackend::Kv => {
                let kv = env.kv(&config.session_kv_binding)?;
                Arc::new(KvSessionStore::new(kv))
            }
        };
        let passwords =
            PasswordService::new(config.password_memory_kib, config.password_iterations)?;

        let app = Self::new(config, store, sessions, passwords);
        if app.config.seed_default_accounts && !SEEDED.swap(true, Ordering::SeqCst) {
            if let Err(e) = auth_service::seed_default_accounts(&app).await {
                SEEDED.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }
        Ok(app)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("request_id", &self.request_id)
            .field("storage", &self.config.storage)
            .field("sessions", &self.config.sessions)
            .finish()
    }
}
