//! 에러 타입 정의.

use sectorflow_core::CoreError;
use sectorflow_data::DataError;
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 수집 작업 태스크 실패 (패닉 또는 취소)
    #[error("Refresh task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// 데이터 계층 에러
    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

impl From<CoreError> for CollectorError {
    fn from(err: CoreError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
