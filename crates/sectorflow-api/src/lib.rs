//! 섹터 자금 흐름 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 데이터 조회 API (`/api/{industry|concept}_data`)
//! - 갱신 시각 조회 (`/api/last_update`)
//! - CSV/Excel 내보내기 (`/export/{csv|excel}`)
//! - 헬스 체크 엔드포인트
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`export`]: 내보내기 파일 생성
//! - [`config`]: 서버 설정 로드
//! - [`error`]: API 에러 응답
//! - [`types`]: 응답 타입

pub mod config;
pub mod error;
pub mod export;
pub mod routes;
pub mod state;
pub mod types;

pub use config::resolve_config;
pub use error::{ApiError, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;
