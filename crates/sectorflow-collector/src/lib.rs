//! 섹터 자금 흐름 캐시 갱신기.
//!
//! 이 crate는 캐시 갱신 스케줄러와 독립 실행 바이너리를 제공합니다:
//! - 장중/장외를 구분하는 갱신 주기 결정
//! - 6개 (분류 × 기간) 조합 동시 수집 후 스냅샷 원자 교체
//! - 영속 저장소 기록 및 시작 시 복원

pub mod config;
pub mod error;
pub mod scheduler;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use scheduler::{BootstrapOutcome, Clock, MarketState, RefreshScheduler, SystemClock};
pub use stats::RefreshStats;
