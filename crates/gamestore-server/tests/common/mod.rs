use std::net::SocketAddr;
use std::time::Duration;

use gamestore_core::game::GameFields;
use gamestore_core::net::messages::{InsertResponse, SignInResponse};

use gamestore_server::config::{AccountConfig, ServerConfig};
use gamestore_server::{build_app, spawn_session_reaper};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse";

pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with one admin account.
    pub async fn new() -> Self {
        Self::from_config(admin_config()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config);
        spawn_session_reaper(state);

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api(&self, path: &str) -> String {
        format!("http://{}/api/v1{path}", self.addr)
    }

    /// Sign in as the test admin and return the bearer token.
    pub async fn sign_in(&self, client: &reqwest::Client) -> String {
        let resp = client
            .post(self.api("/auth/sign-in"))
            .json(&serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: SignInResponse = resp.json().await.unwrap();
        body.token
    }

    /// Insert a game as the signed-in admin and return its id.
    pub async fn insert(&self, client: &reqwest::Client, token: &str, fields: &GameFields) -> String {
        let resp = client
            .post(self.api("/games"))
            .bearer_auth(token)
            .json(fields)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: InsertResponse = resp.json().await.unwrap();
        body.id
    }
}

/// Default config plus the test admin account.
pub fn admin_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.auth.accounts = vec![AccountConfig::from_password(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap()];
    config
}
