//! 설정 관리.
//!
//! 기본값 → 설정 파일(TOML) → 환경 변수 순으로 덮어씁니다.
//! 배포 환경에서는 보통 `from_env()`만 사용합니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 업스트림 데이터 소스 설정
    pub upstream: UpstreamConfig,
    /// 캐시 파일 저장소 설정
    pub storage: StorageConfig,
    /// 갱신 스케줄러 설정
    pub scheduler: SchedulerConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// 업스트림 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// 주 소스 엔드포인트 (JSONP 리스트 API)
    pub primary_url: String,
    /// 보조 소스 엔드포인트 (데이터센터 리포트 API)
    pub backup_url: String,
    /// 요청당 타임아웃 (초)
    pub timeout_secs: u64,
    /// 주 소스에 요청할 페이지 크기
    pub page_size: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            primary_url: "https://push2.eastmoney.com/api/qt/clist/get".to_string(),
            backup_url: "https://datacenter-web.eastmoney.com/api/data/v1/get".to_string(),
            timeout_secs: 10,
            page_size: 50,
        }
    }
}

impl UpstreamConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 캐시 파일 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 클라우드 환경 여부 (영속 디렉터리 사용)
    pub cloud: bool,
    /// 클라우드 환경의 영속 디렉터리
    pub cloud_dir: PathBuf,
    /// 로컬 환경의 캐시 디렉터리 (`None`이면 현재 작업 디렉터리)
    pub local_dir: Option<PathBuf>,
    /// 캐시 파일명
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cloud: false,
            cloud_dir: PathBuf::from("/tmp"),
            local_dir: None,
            file_name: "data_cache.json".to_string(),
        }
    }
}

impl StorageConfig {
    /// 환경에 따라 선택된 캐시 디렉터리.
    pub fn cache_dir(&self) -> PathBuf {
        if self.cloud {
            return self.cloud_dir.clone();
        }
        self.local_cache_dir()
    }

    /// 로컬 캐시 디렉터리 (클라우드 모드의 대체 저장 위치이기도 함).
    pub fn local_cache_dir(&self) -> PathBuf {
        match &self.local_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// 캐시 파일 전체 경로.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir().join(&self.file_name)
    }

    /// 로컬 캐시 파일 전체 경로.
    pub fn local_cache_path(&self) -> PathBuf {
        self.local_cache_dir().join(&self.file_name)
    }
}

/// 갱신 스케줄러 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// 장중 갱신 주기 (분)
    pub trading_interval_minutes: u64,
    /// 장외 갱신 주기 (분)
    pub off_hours_interval_minutes: u64,
    /// 갱신 실패 후 재시도 대기 (분)
    pub backoff_minutes: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            trading_interval_minutes: 15,
            off_hours_interval_minutes: 120,
            backoff_minutes: 5,
        }
    }
}

impl SchedulerConfig {
    /// 모든 주기가 1분 이상인지 검증.
    pub fn validate(&self) -> CoreResult<()> {
        if self.trading_interval_minutes == 0
            || self.off_hours_interval_minutes == 0
            || self.backoff_minutes == 0
        {
            return Err(CoreError::Config(format!(
                "갱신 주기는 0분보다 커야 합니다 (장중 {}, 장외 {}, 재시도 {})",
                self.trading_interval_minutes, self.off_hours_interval_minutes, self.backoff_minutes
            )));
        }
        Ok(())
    }

    /// 장중 갱신 주기
    pub fn trading_interval(&self) -> Duration {
        Duration::from_secs(self.trading_interval_minutes * 60)
    }

    /// 장외 갱신 주기
    pub fn off_hours_interval(&self) -> Duration {
        Duration::from_secs(self.off_hours_interval_minutes * 60)
    }

    /// 실패 후 재시도 대기
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_minutes * 60)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 스케줄러 주기와 업스트림 타임아웃 검증.
    pub fn validate(&self) -> CoreResult<()> {
        self.scheduler.validate()?;
        if self.upstream.timeout_secs == 0 {
            return Err(CoreError::Config(
                "업스트림 타임아웃은 0초보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `SECTORFLOW__SCHEDULER__BACKOFF_MINUTES=10` 형식입니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("SECTORFLOW")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 환경 변수에서 설정 로드.
    ///
    /// `.env` 파일이 있으면 먼저 읽습니다.
    ///
    /// # 환경변수
    /// * `HOST`, `PORT` - 바인딩 주소 (기본: 0.0.0.0:8080)
    /// * `UPSTREAM_PRIMARY_URL`, `UPSTREAM_BACKUP_URL` - 업스트림 엔드포인트
    /// * `UPSTREAM_TIMEOUT_SECS` - 요청 타임아웃 (기본: 10)
    /// * `RENDER` - "true"면 클라우드 영속 디렉터리 사용
    /// * `RENDER_CACHE_DIR` - 클라우드 영속 디렉터리 (기본: /tmp)
    /// * `CACHE_DIR` - 로컬 캐시 디렉터리 (기본: 현재 디렉터리)
    /// * `SCHEDULER_TRADING_INTERVAL_MINUTES` - 장중 주기 (기본: 15)
    /// * `SCHEDULER_OFF_HOURS_INTERVAL_MINUTES` - 장외 주기 (기본: 120)
    /// * `SCHEDULER_BACKOFF_MINUTES` - 실패 후 대기 (기본: 5)
    /// * `RUST_LOG`, `LOG_FORMAT` - 로깅
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            server: ServerConfig {
                host: env_var_or("HOST", defaults.server.host),
                port: env_var_parse("PORT", defaults.server.port),
            },
            upstream: UpstreamConfig {
                primary_url: env_var_or("UPSTREAM_PRIMARY_URL", defaults.upstream.primary_url),
                backup_url: env_var_or("UPSTREAM_BACKUP_URL", defaults.upstream.backup_url),
                timeout_secs: env_var_parse("UPSTREAM_TIMEOUT_SECS", defaults.upstream.timeout_secs),
                page_size: env_var_parse("UPSTREAM_PAGE_SIZE", defaults.upstream.page_size),
            },
            storage: StorageConfig {
                cloud: env_var_bool("RENDER", defaults.storage.cloud),
                cloud_dir: std::env::var("RENDER_CACHE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.cloud_dir),
                local_dir: std::env::var("CACHE_DIR").ok().map(PathBuf::from),
                file_name: defaults.storage.file_name,
            },
            scheduler: SchedulerConfig {
                trading_interval_minutes: env_var_parse(
                    "SCHEDULER_TRADING_INTERVAL_MINUTES",
                    defaults.scheduler.trading_interval_minutes,
                ),
                off_hours_interval_minutes: env_var_parse(
                    "SCHEDULER_OFF_HOURS_INTERVAL_MINUTES",
                    defaults.scheduler.off_hours_interval_minutes,
                ),
                backoff_minutes: env_var_parse(
                    "SCHEDULER_BACKOFF_MINUTES",
                    defaults.scheduler.backoff_minutes,
                ),
            },
            logging: LoggingConfig {
                level: env_var_or("RUST_LOG", defaults.logging.level),
                format: env_var_or("LOG_FORMAT", defaults.logging.format),
            },
        }
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수 문자열 (없으면 기본값)
fn env_var_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}
