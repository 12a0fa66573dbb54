//! 섹터 자금 흐름 데이터 수집 및 캐시.
//!
//! 이 crate는 다음을 제공합니다:
//! - 업스트림 응답 정규화 (`provider::normalize`)
//! - 동방재부 주/보조 소스 클라이언트
//! - 주 소스 → 보조 소스 → 내장 데이터 폴백 체인
//! - 파일 기반 영속 저장소
//! - 원자적으로 교체되는 스냅샷 캐시

pub mod cache;
pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

// 소스/폴백 재내보내기
pub use provider::{
    BackupSource, FallbackChain, FlowSource, Origin, PlaceholderSource, PrimarySource,
    Resolution, SourceKind, TEN_DAY_SANITY_THRESHOLD,
};

// 캐시/저장소 재내보내기
pub use cache::{CacheStats, CacheStore, CachedSnapshot};
pub use storage::{blob_store_from_config, BlobStore, FallbackBlobStore, FileBlobStore};
#[cfg(any(test, feature = "test-utils"))]
pub use storage::MemoryBlobStore;
