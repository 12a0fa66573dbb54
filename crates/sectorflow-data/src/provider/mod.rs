//! 데이터 Provider 모듈.
//!
//! 섹터 자금 흐름 데이터를 가져오는 소스들을 정의합니다.
//!
//! ## 동방재부(eastmoney)
//! - `PrimarySource`: JSONP 리스트 API (기간별 필드 세트)
//! - `BackupSource`: 데이터센터 리포트 API (기간별 리포트명)
//!
//! ## 내장 데이터
//! - `PlaceholderSource`: 업스트림 전체 실패 시 사용하는 고정 데이터셋
//!
//! ## 폴백 체인
//! - `FallbackChain`: 주 소스 → 보조 소스 → 내장 데이터 순서로 시도

use async_trait::async_trait;

use sectorflow_core::{Category, FlowRecord, Period};

use crate::error::Result;

pub mod chain;
pub mod eastmoney;
pub mod normalize;
pub mod placeholder;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use chain::{FallbackChain, Origin, Resolution, TEN_DAY_SANITY_THRESHOLD};
pub use eastmoney::{BackupSource, PrimarySource};
pub use normalize::SourceKind;
pub use placeholder::PlaceholderSource;

/// 자금 흐름 데이터 소스 trait.
///
/// 반환되는 레코드는 정규화가 끝난 상태여야 하며 순서는 업스트림 순서를 따릅니다.
/// 정렬과 순위 부여는 [`FallbackChain`]에서 수행합니다.
#[async_trait]
pub trait FlowSource: Send + Sync {
    /// 소스 이름 (로그용).
    fn name(&self) -> &'static str;

    /// (분류, 기간) 레코드 조회.
    async fn fetch(&self, category: Category, period: Period) -> Result<Vec<FlowRecord>>;
}
