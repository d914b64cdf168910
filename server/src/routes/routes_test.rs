use std::path::PathBuf;

use axum::body::{Body, to_bytes};
use axum::http::{Request, header};
use tower::ServiceExt;

use super::*;
use crate::config::LauncherConfig;

/// Static client directory under the temp dir, removed on drop.
struct StaticFixture(PathBuf);

impl StaticFixture {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("chat-server-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<div id=\"root\"></div>").unwrap();
        std::fs::write(dir.join("app.js"), "console.log('hi')").unwrap();
        Self(dir)
    }
}

impl Drop for StaticFixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn router(fixture: &StaticFixture, upstream: Option<String>) -> Router {
    let config = LauncherConfig { static_dir: fixture.0.clone(), upstream, open_browser: false, ..LauncherConfig::default() };
    app(AppState::new(config).unwrap())
}

fn post_conversation() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/conversation")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"messages":[{"role":"user","content":"hi"}]}"#))
        .unwrap()
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn healthz_ok() {
    let fixture = StaticFixture::new("healthz");
    let app = router(&fixture, None);
    let resp = app.oneshot(Request::get("/healthz").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn root_serves_index() {
    let fixture = StaticFixture::new("root");
    let app = router(&fixture, None);
    let resp = app.oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("id=\"root\""));
}

#[tokio::test]
async fn static_asset_served() {
    let fixture = StaticFixture::new("asset");
    let app = router(&fixture, None);
    let resp = app.oneshot(Request::get("/app.js").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "console.log('hi')");
}

#[tokio::test]
async fn unknown_path_falls_back_to_index() {
    let fixture = StaticFixture::new("fallback");
    let app = router(&fixture, None);
    let resp = app.oneshot(Request::get("/some/deep/link").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("id=\"root\""));
}

#[tokio::test]
async fn conversation_without_upstream_is_503_json() {
    let fixture = StaticFixture::new("no-upstream");
    let app = router(&fixture, None);
    let resp = app.oneshot(post_conversation()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let value: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert!(value["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn conversation_relays_upstream_ndjson() {
    let upstream = Router::new().route(
        "/conversation",
        post(|body: String| async move {
            assert!(body.contains("\"content\":\"hi\""));
            "{\"choices\":[{\"messages\":[{\"role\":\"assistant\",\"content\":\"Hel\"}]}]}\n{}\n"
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, upstream).await.unwrap() });

    let fixture = StaticFixture::new("relay");
    let app = router(&fixture, Some(format!("http://{addr}/conversation")));
    let resp = app.oneshot(post_conversation()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], conversation::NDJSON_CONTENT_TYPE);
    let body = body_string(resp).await;
    assert_eq!(body.lines().count(), 2);
    assert!(body.contains("\"content\":\"Hel\""));
}

#[tokio::test]
async fn conversation_passes_upstream_failure_status() {
    let upstream = Router::new().route(
        "/conversation",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, upstream).await.unwrap() });

    let fixture = StaticFixture::new("upstream-429");
    let app = router(&fixture, Some(format!("http://{addr}/conversation")));
    let resp = app.oneshot(post_conversation()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let value: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(value["error"], "slow down");
}

#[test]
fn static_fixture_removed_on_drop() {
    let fixture = StaticFixture::new("cleanup");
    let dir = fixture.0.clone();
    assert!(dir.join("index.html").is_file());
    drop(fixture);
    assert!(!dir.exists());
}
