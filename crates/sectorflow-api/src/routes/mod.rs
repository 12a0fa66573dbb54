//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/{industry|concept}_data` - 섹터 자금 흐름
//! - `/api/last_update` - 마지막 갱신 시각
//! - `/api/test` - 동작 확인
//! - `/export/{excel|csv}` - 파일 내보내기

pub mod export;
pub mod health;
pub mod sectors;

pub use export::{export_router, ExportQuery};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use sectors::{sectors_router, PeriodQuery};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api", sectors_router())
        .nest("/export", export_router())
}
