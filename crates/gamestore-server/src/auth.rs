use std::collections::HashMap;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use gamestore_core::session::User;

use crate::config::AccountConfig;
use crate::error::AppError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Message returned for every failed sign-in, so callers cannot tell
/// which emails exist.
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Hex HMAC-SHA256 of `password` keyed by `salt`.
pub fn hash_password(salt: &str, password: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes()).ok()?;
    mac.update(password.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Check `password` against a stored hex HMAC in constant time.
pub fn verify_password(salt: &str, password: &str, expected_hex: &str) -> bool {
    let Ok(expected_bytes) = hex::decode(expected_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(salt.as_bytes()) else {
        return false;
    };

    mac.update(password.as_bytes());
    mac.verify_slice(&expected_bytes).is_ok()
}

/// Configured admin accounts, keyed by lowercased email.
#[derive(Debug, Default)]
pub struct AccountTable {
    accounts: HashMap<String, AccountConfig>,
}

impl AccountTable {
    pub fn from_config(accounts: &[AccountConfig]) -> Self {
        Self {
            accounts: accounts
                .iter()
                .map(|a| (a.email.trim().to_lowercase(), a.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Check an email/password pair, returning the user on success.
    pub fn authenticate(&self, email: &str, password: &str) -> Option<User> {
        let key = email.trim().to_lowercase();
        let account = self.accounts.get(&key)?;
        if verify_password(&account.salt, password, &account.password_hmac) {
            Some(User {
                email: account.email.clone(),
            })
        } else {
            None
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor for routes that require a signed-in admin. Rejects with 401
/// when the bearer token is missing, unknown, or expired.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(AppError::Unauthorized("sign-in required".to_string()));
        };
        let mut sessions = state.sessions.write().await;
        match sessions.resolve(token) {
            Some(user) => Ok(AuthUser(user)),
            None => Err(AppError::Unauthorized(
                "session expired, sign in again".to_string(),
            )),
        }
    }
}
