//! 스냅샷 캐시 레이어.
//!
//! 메모리의 현재 스냅샷을 원자적으로 교체하고, 영속 저장소에 저장/복원합니다.

pub mod store;

pub use store::{CacheStats, CacheStore, CachedSnapshot, LAST_UPDATE_FORMAT, NOT_UPDATED};
