#[allow(dead_code)]
mod common;

use std::time::Duration;

use gamestore_core::test_helpers::make_fields;

use common::TestServer;

/// Read SSE chunks until `needle` shows up or the timeout hits.
async fn read_until(resp: reqwest::Response, needle: &str, collected: &mut String) -> bool {
    tokio::time::timeout(Duration::from_secs(3), async {
        let mut resp = resp;
        loop {
            match resp.chunk().await {
                Ok(Some(bytes)) => {
                    collected.push_str(&String::from_utf8_lossy(&bytes));
                    if collected.contains(needle) {
                        return true;
                    }
                },
                _ => return false,
            }
        }
    })
    .await
    .unwrap_or(false)
}

#[tokio::test]
async fn sse_sends_initial_snapshot() {
    let mut config = common::admin_config();
    config.seed = vec![make_fields("Seeded", 1.5)];
    let server = TestServer::from_config(config).await;

    let resp = reqwest::get(server.api("/games/stream")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let mut collected = String::new();
    let found = read_until(resp, "Seeded", &mut collected).await;
    assert!(found, "initial snapshot missing, got: {collected}");
    assert!(collected.contains("event: snapshot"));
}

#[tokio::test]
async fn sse_receives_snapshot_after_insert() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();
    let token = server.sign_in(&client).await;

    let sse_resp = client.get(server.api("/games/stream")).send().await.unwrap();
    assert_eq!(sse_resp.status(), 200);

    // Insert after a short delay so the stream is already open
    let insert_url = server.api("/games");
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let client = reqwest::Client::new();
        let _ = client
            .post(&insert_url)
            .bearer_auth(&token)
            .json(&make_fields("Streamed", 3.0))
            .send()
            .await;
    });

    let mut collected = String::new();
    let found = read_until(sse_resp, "Streamed", &mut collected).await;
    assert!(
        found,
        "SSE stream should contain the inserted game, got: {collected}"
    );
}

#[tokio::test]
async fn sse_returns_503_when_at_capacity() {
    let mut config = common::admin_config();
    config.limits.max_sse_subscribers = 1;
    let server = TestServer::from_config(config).await;
    let client = reqwest::Client::new();
    let sse_url = server.api("/games/stream");

    // First SSE connection should succeed
    let resp1 = client.get(&sse_url).send().await.unwrap();
    assert_eq!(resp1.status(), 200);

    // Give it a moment to register
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Second SSE connection should be rejected
    let resp2 = client.get(&sse_url).send().await.unwrap();
    assert_eq!(
        resp2.status(),
        503,
        "Should reject when SSE subscriber limit reached"
    );
}
