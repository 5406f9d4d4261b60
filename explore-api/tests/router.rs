//! Router tests driven through `tower::ServiceExt::oneshot`

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use indexmap::IndexMap;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use explore_api::http::webhook::{ExternalMessage, HttpForwardSink, MessageSink};
use explore_api::{create_router, AppState};
use explore_core::config::{HttpClientConfig, MedalConfig, MedalSiteConfig};
use explore_core::ui::ChipRow;
use explore_core::{
    DiscoverSource, Fetcher, MediaInfo, MediaType, PageParams, ParamMap, ResponseCache, SourceRegistry,
};
use explore_media_providers::MedalWall;

const TOKEN: &str = "test-token";
const PREFIX: &str = "plugin/ExploreServices";

#[derive(Default)]
struct RecordingSource {
    calls: Mutex<Vec<(ParamMap, PageParams)>>,
}

#[async_trait]
impl DiscoverSource for RecordingSource {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn default_count(&self) -> u32 {
        15
    }

    async fn filter_params(&self) -> IndexMap<String, Option<String>> {
        let mut params = IndexMap::new();
        params.insert("kind".to_string(), Some("tv".to_string()));
        params.insert("year".to_string(), None);
        params
    }

    async fn filter_ui(&self) -> Vec<Value> {
        vec![
            ChipRow::new("Kind", "kind", vec![]).into_value(),
            ChipRow::new("Year", "year", vec![]).into_value(),
        ]
    }

    async fn query(&self, filters: &ParamMap, page: PageParams) -> Vec<MediaInfo> {
        self.calls
            .lock()
            .unwrap()
            .push((filters.clone(), page));
        vec![MediaInfo::new(MediaType::Tv, "mock", "42", "Title")]
    }
}

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<ExternalMessage>>,
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(&self, message: &ExternalMessage) {
        self.messages.lock().unwrap().push(message.clone());
    }
}

fn app(source: Arc<RecordingSource>, sink: Option<Arc<dyn MessageSink>>, token: &str) -> Router {
    let mut registry = SourceRegistry::new();
    registry.register(source);
    let mut state = AppState::new(registry, token, PREFIX);
    if let Some(sink) = sink {
        state = state.with_message_sink(sink);
    }
    create_router(state)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn plugin_uri(route: &str, query: &str) -> String {
    let sep = if query.is_empty() { "" } else { "&" };
    format!("/api/v1/{PREFIX}{route}?apikey={TOKEN}{sep}{query}")
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let router = app(Arc::default(), None, TOKEN);
    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_missing_or_wrong_token_is_rejected() {
    let source = Arc::new(RecordingSource::default());
    let router = app(Arc::clone(&source), None, TOKEN);

    for uri in [
        format!("/api/v1/{PREFIX}/mock_discover"),
        format!("/api/v1/{PREFIX}/mock_discover?apikey=nope"),
        format!("/api/v1/{PREFIX}/discover_sources?apikey="),
    ] {
        let (status, body) = send(&router, get(&uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body, json!({"error": "API密钥错误", "status": 401}));
    }
    assert!(source.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_configured_token_rejects_everything() {
    let router = app(Arc::default(), None, "");
    let uri = format!("/api/v1/{PREFIX}/mock_discover?apikey=");
    let (status, _) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_discover_binds_filters_and_paging() {
    let source = Arc::new(RecordingSource::default());
    let router = app(Arc::clone(&source), None, TOKEN);

    let uri = plugin_uri("/mock_discover", "page=3&count=5&year=2020&bogus=1");
    let (status, body) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["media_id"], "42");
    assert_eq!(body[0]["type"], "电视剧");

    let calls = source.calls.lock().unwrap();
    let (filters, page) = &calls[0];
    assert_eq!(page.page, 3);
    assert_eq!(page.page_size, 5);
    assert_eq!(filters.get("kind").map(String::as_str), Some("tv"));
    assert_eq!(filters.get("year").map(String::as_str), Some("2020"));
    assert!(!filters.contains_key("bogus"));
    assert!(!filters.contains_key("apikey"));
}

#[tokio::test]
async fn test_discover_bad_paging_falls_back_to_defaults() {
    let source = Arc::new(RecordingSource::default());
    let router = app(Arc::clone(&source), None, TOKEN);

    let uri = plugin_uri("/mock_discover", "page=abc&count=-4");
    let (status, _) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);

    let calls = source.calls.lock().unwrap();
    assert_eq!(calls[0].1.page, 1);
    assert_eq!(calls[0].1.page_size, 15);
}

#[tokio::test]
async fn test_discover_sources_lists_descriptors() {
    let router = app(Arc::default(), None, TOKEN);

    let (status, body) = send(&router, get(&plugin_uri("/discover_sources", ""))).await;
    assert_eq!(status, StatusCode::OK);
    let sources = body.as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["mediaid_prefix"], "mock");
    assert_eq!(
        sources[0]["api_path"],
        format!("{PREFIX}/mock_discover?apikey={TOKEN}")
    );
    assert_eq!(sources[0]["filter_params"]["kind"], "tv");
    assert_eq!(sources[0]["filter_params"]["year"], Value::Null);

    let (status, body) = send(&router, get(&plugin_uri("/discover_sources/mock", ""))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Mock");

    let (status, body) = send(&router, get(&plugin_uri("/discover_sources/missing", ""))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_external_message_outcomes() {
    let sink = Arc::new(RecordingSink::default());
    let shared: Arc<dyn MessageSink> = sink.clone();
    let router = app(Arc::default(), Some(shared), TOKEN);
    let uri = plugin_uri("/external_message", "");

    let (status, body) = send(&router, post(&uri, r#"{"title": "Hi", "content": "There"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "消息接收成功",
            "data": {"title": "Hi", "content": "There"}
        })
    );

    let (status, body) = send(&router, post(&uri, "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": false, "message": "请求体为空或格式不正确"}));

    let (status, body) = send(&router, post(&uri, r#"{"title": "only"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": false, "message": "缺少必要的字段title或content"}));

    let messages = sink.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].title, "Hi");
}

#[tokio::test]
async fn test_external_message_disabled_without_sink() {
    let router = app(Arc::default(), None, TOKEN);
    let uri = plugin_uri("/external_message", "");
    let (status, _) = send(&router, post(&uri, r#"{"title": "a", "content": "b"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_forward_sink_posts_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_json(json!({"title": "T", "content": "C"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sink = HttpForwardSink::new(format!("{}/hook", server.uri()), &HttpClientConfig::default())
        .unwrap();
    let sink: Arc<dyn MessageSink> = Arc::new(sink);
    let router = app(Arc::default(), Some(sink), TOKEN);

    let uri = plugin_uri("/external_message", "");
    let (status, body) = send(&router, post(&uri, r#"{"title": "T", "content": "C"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_forward_failure_still_accepts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = HttpForwardSink::new(format!("{}/hook", server.uri()), &HttpClientConfig::default())
        .unwrap();
    let sink: Arc<dyn MessageSink> = Arc::new(sink);
    let router = app(Arc::default(), Some(sink), TOKEN);

    let uri = plugin_uri("/external_message", "");
    let (status, body) = send(&router, post(&uri, r#"{"title": 1, "content": 2}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"title": "1", "content": "2"}));
}

const MEDAL_PAGE: &str = r#"<table><tr><td>图片</td><td>描述</td></tr>
<tr><td><img src="/m.png"></td><td><h1>周年</h1>纪念</td><td>不限<br>不限</td><td>永久</td>
<td>2%</td><td>800</td><td>5</td><td><input value="购买"></td><td><input value="赠送"></td></tr>
</table>"#;

fn medal_app(sites: Vec<(&str, String)>) -> Router {
    let config = MedalConfig {
        sites: sites
            .into_iter()
            .map(|(name, url)| MedalSiteConfig {
                name: name.to_string(),
                url,
                cookie: None,
                user_agent: None,
            })
            .collect(),
        ..MedalConfig::default()
    };
    let fetcher = Fetcher::new("explore-test/1.0", &HttpClientConfig::default()).unwrap();
    let wall = MedalWall::new(fetcher, ResponseCache::default(), &config);
    let state = AppState::new(SourceRegistry::new(), TOKEN, PREFIX).with_medal_wall(Arc::new(wall));
    create_router(state)
}

#[tokio::test]
async fn test_medal_routes() {
    let good = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/medal.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MEDAL_PAGE))
        .mount(&good)
        .await;
    let down = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&down)
        .await;
    let router = medal_app(vec![("Good", good.uri()), ("Down", down.uri())]);

    let (status, body) = send(&router, get(&plugin_uri("/medal_sites", ""))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"title": "Good", "value": "Good"}, {"title": "Down", "value": "Down"}])
    );

    let (status, body) = send(&router, get(&plugin_uri("/medals", "on_sale=true"))).await;
    assert_eq!(status, StatusCode::OK);
    let medals = body.as_array().unwrap();
    assert_eq!(medals.len(), 1);
    assert_eq!(medals[0]["name"], "周年");
    assert_eq!(medals[0]["imageSmall"], format!("{}/m.png", good.uri()));
    assert_eq!(medals[0]["price"], 800);
    assert_eq!(medals[0]["currency"], "魔力");

    let (status, body) = send(&router, get(&plugin_uri("/medals/Good", ""))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["site"], "Good");

    let (status, body) = send(&router, get(&plugin_uri("/medals/Down", ""))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Upstream request failed", "status": 502}));

    let (status, body) = send(&router, get(&plugin_uri("/medals/Nowhere", ""))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown site 'Nowhere'");

    let (status, _) = send(&router, get(&format!("/api/v1/{PREFIX}/medals"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_medal_routes_absent_without_wall() {
    let router = app(Arc::default(), None, TOKEN);
    let (status, _) = send(&router, get(&plugin_uri("/medals", ""))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
