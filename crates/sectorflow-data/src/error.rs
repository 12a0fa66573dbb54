//! 데이터 모듈 오류 타입.
//!
//! 업스트림 오류는 모두 폴백 체인 안에서 흡수되고,
//! 저장소 오류는 로그만 남기고 메모리 캐시는 그대로 유지됩니다.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 네트워크 오류, 타임아웃, 200이 아닌 응답
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// JSON/JSONP 파싱 실패 또는 예상 구조 누락
    #[error("Upstream malformed: {0}")]
    UpstreamMalformed(String),

    /// 응답은 정상이나 데이터 행이 없음
    #[error("Upstream returned no rows")]
    UpstreamEmpty,

    /// 10일 데이터 검증 실패 (상위 5개 주력 순유입 합계가 임계값 미만)
    #[error("Upstream data suspect: top-5 main inflow sum {top5_sum} below {threshold}")]
    UpstreamSuspect { top5_sum: f64, threshold: f64 },

    /// 영속 저장소 읽기/쓰기 또는 인코딩 오류
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::UpstreamUnavailable(format!("timeout: {}", err))
        } else if err.is_decode() {
            DataError::UpstreamMalformed(err.to_string())
        } else {
            DataError::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
