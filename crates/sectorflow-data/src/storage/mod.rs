//! 영속 저장소.
//!
//! - `FileBlobStore`: 로컬/클라우드 디렉터리의 JSON 캐시 파일
//! - `FallbackBlobStore`: 클라우드 저장 실패 시 로컬 파일로 대체
//! - `MemoryBlobStore`: 테스트용 메모리 저장소

pub mod blob;

pub use blob::{blob_store_from_config, BlobStore, FallbackBlobStore, FileBlobStore};
#[cfg(any(test, feature = "test-utils"))]
pub use blob::MemoryBlobStore;
