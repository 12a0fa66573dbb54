//! 환경변수 기반 설정 모듈.

use std::path::Path;

use sectorflow_core::{AppConfig, LoggingConfig, SchedulerConfig, StorageConfig, UpstreamConfig};

use crate::error::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 업스트림 소스 설정
    pub upstream: UpstreamConfig,
    /// 캐시 파일 저장소 설정
    pub storage: StorageConfig,
    /// 갱신 주기 설정
    pub scheduler: SchedulerConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        Self::from_app(&AppConfig::from_env())
    }

    /// 설정 파일 + `SECTORFLOW__*` 환경변수에서 로드
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_app(&AppConfig::load(path)?)
    }

    /// 애플리케이션 설정에서 필요한 부분만 추출 (주기 검증 포함)
    pub fn from_app(app: &AppConfig) -> Result<Self> {
        app.validate()?;

        Ok(Self {
            upstream: app.upstream.clone(),
            storage: app.storage.clone(),
            scheduler: app.scheduler.clone(),
            logging: app.logging.clone(),
        })
    }
}
