//! In-process stand-in for the remote API

use axum::http::HeaderMap;
use axum::Router;

use super::ApiClient;
use crate::config::ApiConfig;

/// Serve `router` on an ephemeral local port and return a client pointed at it
pub(crate) async fn spawn(router: Router) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    ApiClient::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_seconds: 5,
    })
    .expect("Failed to build client")
}

/// Bearer token sent with a request, if any
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}
