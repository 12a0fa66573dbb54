//! # SectorFlow Core
//!
//! 섹터 자금 흐름 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 섹터 분류(`Category`)와 집계 기간(`Period`)
//! - 정규화된 자금 흐름 레코드(`FlowRecord`)
//! - 전체 스냅샷(`Snapshot`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use self::config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
