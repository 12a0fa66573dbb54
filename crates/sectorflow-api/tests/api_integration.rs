//! 부트스트랩부터 HTTP 응답까지의 종단 간 테스트.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use sectorflow_api::{create_api_router, AppState};
use sectorflow_collector::RefreshScheduler;
use sectorflow_core::SchedulerConfig;
use sectorflow_data::provider::testing::{record, StaticSource};
use sectorflow_data::{CacheStore, FallbackChain, MemoryBlobStore};

async fn bootstrapped_app() -> (Router, Arc<MemoryBlobStore>) {
    let blob = Arc::new(MemoryBlobStore::new());
    let cache = Arc::new(CacheStore::new(blob.clone()));
    let chain = FallbackChain::new(
        Arc::new(StaticSource::ok(vec![
            record("BK0477", 5.85),
            record("BK0437", 28.04),
            record("BK0896", -3.2),
        ])),
        Arc::new(StaticSource::failing()),
    );

    let scheduler = RefreshScheduler::new(chain.clone(), cache.clone(), SchedulerConfig::default());
    let outcome = scheduler.bootstrap().await.unwrap();
    assert!(outcome.refreshed());

    let app = create_api_router().with_state(Arc::new(AppState::new(cache, chain)));
    (app, blob)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

#[tokio::test]
async fn test_bootstrap_then_serve_ranked_data() {
    let (app, blob) = bootstrapped_app().await;

    let (status, _, body) = get(&app, "/api/industry_data").await;
    assert_eq!(status, StatusCode::OK);

    let items: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["id"], "BK0437");
    assert_eq!(items[0]["rank"], 1);
    assert_eq!(items[2]["id"], "BK0896");
    assert_eq!(items[2]["main_net_inflow"], -3.2);

    // 부트스트랩 결과가 영속 저장소에 기록됨
    assert!(blob.contents().is_some());
}

#[tokio::test]
async fn test_last_update_is_set_after_bootstrap() {
    let (app, _) = bootstrapped_app().await;

    let (status, _, body) = get(&app, "/api/last_update").await;
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_ne!(value["last_update"], "未更新");
}

#[tokio::test]
async fn test_export_and_health_share_cache() {
    let (app, _) = bootstrapped_app().await;

    let (status, headers, body) = get(&app, "/export/csv?type=industry&period=10days").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("filename*=UTF-8''"));
    assert_eq!(String::from_utf8_lossy(&body).lines().count(), 4);

    let (status, _, body) = get(&app, "/health/ready").await;
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["components"]["cache"]["status"], "up");
}
