//! 애플리케이션 공유 상태.
//!
//! 모든 핸들러가 `Arc<AppState>`로 공유합니다.

use std::sync::Arc;

use sectorflow_core::{Category, FlowRecord, Period};
use sectorflow_data::{CacheStore, FallbackChain};

/// API 핸들러 공유 상태.
pub struct AppState {
    /// 스냅샷 캐시 (스케줄러와 공유)
    pub cache: Arc<CacheStore>,

    /// 캐시 미스 시 직접 조회에 사용하는 폴백 체인
    pub chain: FallbackChain,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(cache: Arc<CacheStore>, chain: FallbackChain) -> Self {
        Self {
            cache,
            chain,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// (분류, 기간) 레코드 조회.
    ///
    /// 캐시에 없으면 폴백 체인을 직접 호출합니다. 이 결과는 캐시에 기록하지 않습니다.
    pub async fn records(&self, category: Category, period: Period) -> Vec<FlowRecord> {
        if let Some(records) = self.cache.get(category, period).await {
            return records;
        }

        tracing::info!(%category, %period, "캐시 미스, 직접 조회");
        self.chain.resolve(category, period).await
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

/// 테스트용 AppState 생성.
///
/// 업스트림은 항상 실패하므로 캐시 미스 시 내장 데이터가 반환됩니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use sectorflow_data::provider::testing::StaticSource;
    use sectorflow_data::MemoryBlobStore;

    let cache = Arc::new(CacheStore::new(Arc::new(MemoryBlobStore::new())));
    let chain = FallbackChain::new(
        Arc::new(StaticSource::failing()),
        Arc::new(StaticSource::failing()),
    );
    AppState::new(cache, chain)
}
