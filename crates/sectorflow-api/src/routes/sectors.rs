//! 섹터 자금 흐름 조회 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/industry_data?period=` - 업종 섹터
//! - `GET /api/concept_data?period=` - 테마 섹터
//! - `GET /api/last_update` - 마지막 갱신 시각
//! - `GET /api/test` - 동작 확인

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use sectorflow_core::{Category, Period};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{LastUpdateResponse, PingResponse, SectorFlowItem};

/// 기간 쿼리 파라미터.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// `today` | `5days` | `10days` (기본: today)
    pub period: Option<String>,
}

impl PeriodQuery {
    pub fn parse(&self) -> Result<Period, String> {
        match self.period.as_deref() {
            None | Some("") => Ok(Period::default()),
            Some(raw) => raw.parse(),
        }
    }
}

/// 분류/기간 레코드를 응답 항목으로 조회.
///
/// 캐시 미스 경로의 업스트림 호출이 패닉해도 요청만 500으로 끝나도록 별도 태스크에서 실행합니다.
pub(crate) async fn load_items(
    state: Arc<AppState>,
    category: Category,
    period: Period,
) -> ApiResult<Vec<SectorFlowItem>> {
    let records = tokio::spawn(async move { state.records(category, period).await })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(records.into_iter().map(SectorFlowItem::from).collect())
}

async fn sector_data(
    state: Arc<AppState>,
    category: Category,
    query: PeriodQuery,
) -> ApiResult<Json<Vec<SectorFlowItem>>> {
    let period = query.parse().map_err(ApiError::InvalidParam)?;
    tracing::info!(%category, %period, "섹터 데이터 요청");

    let items = load_items(state, category, period).await?;
    tracing::debug!(%category, %period, count = items.len(), "섹터 데이터 응답");

    Ok(Json(items))
}

/// 업종 섹터 데이터.
///
/// GET /api/industry_data
pub async fn industry_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<SectorFlowItem>>> {
    sector_data(state, Category::Industry, query).await
}

/// 테마 섹터 데이터.
///
/// GET /api/concept_data
pub async fn concept_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<SectorFlowItem>>> {
    sector_data(state, Category::Concept, query).await
}

/// GET /api/last_update
pub async fn last_update(State(state): State<Arc<AppState>>) -> Json<LastUpdateResponse> {
    Json(LastUpdateResponse {
        last_update: state.cache.last_update_label().await,
    })
}

/// GET /api/test
pub async fn api_test() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok".to_string(),
        message: "API is working".to_string(),
    })
}

/// 조회 라우터 생성.
pub fn sectors_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/industry_data", get(industry_data))
        .route("/concept_data", get(concept_data))
        .route("/last_update", get(last_update))
        .route("/test", get(api_test))
}
