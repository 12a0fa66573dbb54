//! 내보내기 endpoint.
//!
//! - `GET /export/excel?type=&period=`
//! - `GET /export/csv?type=&period=`

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use sectorflow_core::{Category, Period};

use crate::error::{ApiError, ApiResult};
use crate::export::{content_disposition, export_filename, ExportFormat};
use crate::routes::sectors::load_items;
use crate::state::AppState;

/// 내보내기 쿼리 파라미터.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// `industry` | `concept` (기본: industry)
    #[serde(rename = "type")]
    pub category: Option<String>,
    /// `today` | `5days` | `10days` (기본: today)
    pub period: Option<String>,
}

impl ExportQuery {
    pub fn parse(&self) -> Result<(Category, Period), String> {
        let category = match self.category.as_deref() {
            None | Some("") => Category::Industry,
            Some(raw) => raw.parse()?,
        };
        let period = match self.period.as_deref() {
            None | Some("") => Period::default(),
            Some(raw) => raw.parse()?,
        };
        Ok((category, period))
    }
}

async fn export(
    state: Arc<AppState>,
    format: ExportFormat,
    query: ExportQuery,
) -> ApiResult<Response> {
    let (category, period) = query.parse().map_err(ApiError::ExportParam)?;

    let items = load_items(state, category, period)
        .await
        .map_err(|e| ApiError::Export(e.to_string()))?;
    let body = format.render(&items)?;

    let filename = export_filename(category, period, chrono::Local::now().date_naive(), format);
    tracing::info!(%category, %period, file = %filename, bytes = body.len(), "내보내기 파일 생성");

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&filename, format),
            ),
        ],
        body,
    )
        .into_response())
}

/// GET /export/excel
pub async fn export_excel(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    export(state, ExportFormat::Excel, query).await
}

/// GET /export/csv
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    export(state, ExportFormat::Csv, query).await
}

/// 내보내기 라우터 생성.
pub fn export_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/excel", get(export_excel))
        .route("/csv", get(export_csv))
}
