//! Shared helpers for tests that need a stand-in webhook.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::config::WebhookCfg;
use crate::webhook::WebhookClient;

/// Serve `app` on an ephemeral local port and return the `/hook` URL.
pub async fn spawn_webhook(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/hook")
}

/// Webhook that answers both widgets successfully and counts every call.
pub async fn counting_webhook() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/hook",
            post(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json::<Value>(json!({
                    "flashcards": [{ "question": "Q", "answer": "A" }],
                    "summary": "S"
                }))
            }),
        )
        .with_state(hits.clone());
    (spawn_webhook(app).await, hits)
}

/// A URL nothing is listening on.
pub async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/hook")
}

/// Client pointing both webhooks at `url`.
pub fn client_for(url: &str, timeout: Duration) -> WebhookClient {
    let cfg = WebhookCfg {
        flashcards_url: Some(url.to_string()),
        summary_url: Some(url.to_string()),
        ..WebhookCfg::default()
    };
    WebhookClient::new(&cfg).unwrap().with_timeout(timeout)
}
