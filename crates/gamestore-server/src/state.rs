use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use crate::auth::AccountTable;
use crate::collection::GameCollection;
use crate::config::ServerConfig;
use crate::rate_limit::IpRateLimiter;
use crate::sessions::SessionStore;

pub type SharedCollection = Arc<RwLock<GameCollection>>;
pub type SharedSessions = Arc<RwLock<SessionStore>>;

#[derive(Clone)]
pub struct AppState {
    pub games: SharedCollection,
    pub sessions: SharedSessions,
    pub accounts: Arc<AccountTable>,
    pub sign_in_limiter: Arc<IpRateLimiter>,
    pub sse_subscriber_count: Arc<AtomicUsize>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let mut games = GameCollection::with_capacity(
            config.limits.max_games,
            config.limits.broadcast_capacity,
        );
        for fields in &config.seed {
            if let Err(e) = games.insert(fields.clone()) {
                tracing::warn!("Seed game {:?} skipped: {e}", fields.title);
            }
        }
        let accounts = AccountTable::from_config(&config.auth.accounts);
        let sessions = SessionStore::new(Duration::from_secs(config.auth.session_ttl_secs));
        let sign_in_limiter = IpRateLimiter::new(
            config.limits.sign_in_rate_limit_burst as f64,
            config.limits.sign_in_rate_limit_per_sec,
        );
        Self {
            games: Arc::new(RwLock::new(games)),
            sessions: Arc::new(RwLock::new(sessions)),
            accounts: Arc::new(accounts),
            sign_in_limiter: Arc::new(sign_in_limiter),
            sse_subscriber_count: Arc::new(AtomicUsize::new(0)),
            config: Arc::new(config),
        }
    }
}

/// Counts a live connection for as long as it is held.
pub struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self { counter }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}
