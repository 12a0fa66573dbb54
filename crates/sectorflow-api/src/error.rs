//! API 에러 응답 타입.
//!
//! 데이터 조회 엔드포인트는 실패 시에도 JSON 배열 형태(`[]`)를 유지하고,
//! 내보내기 엔드포인트는 평문 `导出失败`를 반환합니다.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// 내보내기 실패 응답 본문.
pub const EXPORT_FAILED: &str = "导出失败";

/// API 에러.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 잘못된 요청 파라미터 (데이터 조회)
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// 내부 처리 실패 (데이터 조회)
    #[error("internal error: {0}")]
    Internal(String),

    /// 잘못된 요청 파라미터 (내보내기)
    #[error("invalid export parameter: {0}")]
    ExportParam(String),

    /// 내보내기 파일 생성 실패
    #[error("export failed: {0}")]
    Export(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParam(_) | ApiError::ExportParam(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!(status = status.as_u16(), error = %self, "API 요청 실패");

        match self {
            ApiError::InvalidParam(_) | ApiError::Internal(_) => {
                (status, Json(Vec::<serde_json::Value>::new())).into_response()
            }
            ApiError::ExportParam(_) | ApiError::Export(_) => {
                (status, EXPORT_FAILED).into_response()
            }
        }
    }
}

/// 핸들러 Result 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
