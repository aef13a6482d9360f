use serde::Deserialize;

use gamestore_core::game::GameFields;

use crate::auth::hash_password;

/// Top-level server configuration, loaded from `gamestore.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub web_root: String,
    pub auth: AuthFileConfig,
    pub limits: LimitsConfig,
    /// Games inserted into the collection at startup, in order.
    pub seed: Vec<GameFields>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            web_root: "web".to_string(),
            auth: AuthFileConfig::default(),
            limits: LimitsConfig::default(),
            seed: Vec::new(),
        }
    }
}

/// Infrastructure limits (collection size, stream fan-out, rate limits).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_games: usize,
    pub max_sse_subscribers: usize,
    pub broadcast_capacity: usize,
    /// Sign-in rate limit: max burst attempts per IP.
    pub sign_in_rate_limit_burst: usize,
    /// Sign-in rate limit: token refill rate (attempts per second) per IP.
    pub sign_in_rate_limit_per_sec: f64,
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_games: 1000,
            max_sse_subscribers: 100,
            broadcast_capacity: 64,
            sign_in_rate_limit_burst: 5,
            sign_in_rate_limit_per_sec: 0.2, // ~12 attempts/min
            request_timeout_secs: 30,
        }
    }
}

/// Auth section of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthFileConfig {
    pub accounts: Vec<AccountConfig>,
    /// Idle lifetime of a session token.
    pub session_ttl_secs: u64,
}

impl Default for AuthFileConfig {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            session_ttl_secs: 12 * 3600,
        }
    }
}

/// An admin account. `password_hmac` is the hex HMAC-SHA256 of the password
/// keyed by `salt`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub email: String,
    pub salt: String,
    pub password_hmac: String,
}

impl AccountConfig {
    /// Build an account from a plaintext password with a fresh random salt.
    pub fn from_password(email: &str, password: &str) -> Option<Self> {
        let salt = hex::encode(rand::random::<[u8; 16]>());
        let password_hmac = hash_password(&salt, password)?;
        Some(Self {
            email: email.to_string(),
            salt,
            password_hmac,
        })
    }
}

impl ServerConfig {
    /// Validate configuration, logging warnings for issues.
    pub fn validate(&self) {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            tracing::error!(
                addr = %self.listen_addr,
                "listen_addr is not a valid socket address"
            );
            std::process::exit(1);
        }

        if self.auth.accounts.is_empty() {
            tracing::warn!(
                "No admin accounts configured; set GAMESTORE_ADMIN_EMAIL and \
                 GAMESTORE_ADMIN_PASSWORD to enable the admin panel"
            );
        }
        for account in &self.auth.accounts {
            if account.email.trim().is_empty() || !account.email.contains('@') {
                tracing::error!(email = %account.email, "account email is not valid");
                std::process::exit(1);
            }
            if hex::decode(&account.password_hmac).is_err() {
                tracing::error!(email = %account.email, "account password_hmac is not hex");
                std::process::exit(1);
            }
        }
        if self.auth.session_ttl_secs == 0 {
            tracing::error!("auth.session_ttl_secs must be > 0");
            std::process::exit(1);
        }

        if self.limits.max_games == 0 {
            tracing::error!("limits.max_games must be > 0");
            std::process::exit(1);
        }
        if self.limits.max_sse_subscribers == 0 {
            tracing::error!("limits.max_sse_subscribers must be > 0");
            std::process::exit(1);
        }
        if self.limits.broadcast_capacity == 0 {
            tracing::error!("limits.broadcast_capacity must be > 0");
            std::process::exit(1);
        }
        if self.limits.sign_in_rate_limit_burst == 0 {
            tracing::error!("limits.sign_in_rate_limit_burst must be > 0");
            std::process::exit(1);
        }
        if self.limits.sign_in_rate_limit_per_sec < 0.0 {
            tracing::error!("limits.sign_in_rate_limit_per_sec must be >= 0");
            std::process::exit(1);
        }
        if self.limits.request_timeout_secs == 0 {
            tracing::error!("limits.request_timeout_secs must be > 0");
            std::process::exit(1);
        }

        if self.seed.len() > self.limits.max_games {
            tracing::error!(
                seed = self.seed.len(),
                max = self.limits.max_games,
                "more seed games than limits.max_games"
            );
            std::process::exit(1);
        }
        for (i, fields) in self.seed.iter().enumerate() {
            if let Err(e) = fields.validate() {
                tracing::error!(index = i, "seed game is invalid: {e}");
                std::process::exit(1);
            }
        }
    }

    /// Load config from `gamestore.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("gamestore.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from gamestore.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse gamestore.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No gamestore.toml found, using defaults");
                ServerConfig::default()
            },
        };

        // Environment variable overrides
        if let Ok(addr) = std::env::var("GAMESTORE_LISTEN_ADDR")
            && !addr.is_empty()
        {
            config.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("GAMESTORE_WEB_ROOT")
            && !root.is_empty()
        {
            config.web_root = root;
        }
        if let (Ok(email), Ok(password)) = (
            std::env::var("GAMESTORE_ADMIN_EMAIL"),
            std::env::var("GAMESTORE_ADMIN_PASSWORD"),
        ) && !email.is_empty()
            && !password.is_empty()
        {
            match AccountConfig::from_password(&email, &password) {
                Some(account) => {
                    config
                        .auth
                        .accounts
                        .retain(|a| !a.email.eq_ignore_ascii_case(&email));
                    config.auth.accounts.push(account);
                },
                None => tracing::warn!("Failed to hash GAMESTORE_ADMIN_PASSWORD, account skipped"),
            }
        }
        if let Ok(val) = std::env::var("GAMESTORE_SESSION_TTL_SECS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.auth.session_ttl_secs = n;
        }

        // Limits overrides
        if let Ok(val) = std::env::var("GAMESTORE_MAX_GAMES")
            && let Ok(n) = val.parse::<usize>()
        {
            config.limits.max_games = n;
        }
        if let Ok(val) = std::env::var("GAMESTORE_MAX_SSE_SUBSCRIBERS")
            && let Ok(n) = val.parse::<usize>()
        {
            config.limits.max_sse_subscribers = n;
        }

        config
    }
}
