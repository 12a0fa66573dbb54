//! 스냅샷 캐시.
//!
//! 현재 스냅샷은 불변 `Arc`로 보관하고 갱신 시 포인터만 교체합니다.
//! 쓰기는 스케줄러 하나뿐이고 읽기는 여러 요청 핸들러에서 동시에 일어납니다.
//! 락은 포인터를 읽거나 바꾸는 동안만 잡습니다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tokio::sync::RwLock;

use sectorflow_core::{Category, FlowRecord, Period, Snapshot};

use crate::error::{DataError, Result};
use crate::storage::BlobStore;

/// 갱신 시각 표시 형식.
pub const LAST_UPDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 갱신 전 표시 문자열.
pub const NOT_UPDATED: &str = "未更新";

/// 갱신 시각이 붙은 스냅샷.
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub snapshot: Snapshot,
    /// 스냅샷이 설치된 로컬 시각
    pub refreshed_at: NaiveDateTime,
}

/// 캐시 조회 통계.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// 메모리 스냅샷 + 영속 저장소.
pub struct CacheStore {
    current: RwLock<Option<Arc<CachedSnapshot>>>,
    blob: Arc<dyn BlobStore>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStore {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self {
            current: RwLock::new(None),
            blob,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// (분류, 기간) 레코드 조회.
    ///
    /// 스냅샷이 없거나 해당 조합이 비어 있으면 `None`(미스)입니다.
    pub async fn get(&self, category: Category, period: Period) -> Option<Vec<FlowRecord>> {
        let current = self.current().await;
        let records = current
            .as_ref()
            .map(|cached| cached.snapshot.get(category, period))
            .filter(|records| !records.is_empty())
            .map(|records| records.to_vec());

        match records {
            Some(records) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(records)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// 현재 스냅샷 (포인터 복사).
    pub async fn current(&self) -> Option<Arc<CachedSnapshot>> {
        self.current.read().await.clone()
    }

    /// 현재 스냅샷의 갱신 시각.
    pub async fn last_updated(&self) -> Option<NaiveDateTime> {
        self.current().await.map(|cached| cached.refreshed_at)
    }

    /// 갱신 시각 표시 문자열 (`YYYY-MM-DD HH:MM:SS`, 갱신 전이면 `未更新`).
    pub async fn last_update_label(&self) -> String {
        match self.last_updated().await {
            Some(at) => at.format(LAST_UPDATE_FORMAT).to_string(),
            None => NOT_UPDATED.to_string(),
        }
    }

    /// 현재 시각으로 스냅샷을 교체합니다.
    pub async fn replace(&self, snapshot: Snapshot) -> Arc<CachedSnapshot> {
        self.replace_at(snapshot, Local::now().naive_local()).await
    }

    /// 지정한 시각으로 스냅샷을 교체합니다.
    pub async fn replace_at(
        &self,
        snapshot: Snapshot,
        refreshed_at: NaiveDateTime,
    ) -> Arc<CachedSnapshot> {
        let cached = Arc::new(CachedSnapshot {
            snapshot,
            refreshed_at,
        });
        *self.current.write().await = Some(Arc::clone(&cached));
        cached
    }

    /// 영속 저장소에서 스냅샷을 복원하여 설치합니다.
    ///
    /// 저장된 적이 없거나, 읽기/디코딩에 실패하거나, 레코드가 하나도 없으면 `None`.
    pub async fn load(&self) -> Option<Arc<CachedSnapshot>> {
        let snapshot = match self.read_blob().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::info!(location = %self.blob.describe(), "저장된 캐시 없음");
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    location = %self.blob.describe(),
                    error = %e,
                    "캐시 파일 로드 실패"
                );
                return None;
            }
        };

        if snapshot.total_records() == 0 {
            tracing::info!(location = %self.blob.describe(), "저장된 캐시가 비어 있음");
            return None;
        }

        tracing::info!(
            location = %self.blob.describe(),
            records = snapshot.total_records(),
            empty_slots = snapshot.empty_slots(),
            "캐시 파일에서 스냅샷 복원"
        );
        Some(self.replace(snapshot).await)
    }

    async fn read_blob(&self) -> Result<Option<Snapshot>> {
        let Some(bytes) = self.blob.load().await? else {
            return Ok(None);
        };
        let snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| DataError::Persistence(format!("decode: {}", e)))?;
        Ok(Some(snapshot))
    }

    /// 스냅샷을 영속 저장소에 기록합니다. 실패는 로그만 남기고 `false`를 반환합니다.
    pub async fn persist(&self, snapshot: &Snapshot) -> bool {
        match self.write_blob(snapshot).await {
            Ok(size) => {
                tracing::debug!(location = %self.blob.describe(), bytes = size, "캐시 파일 저장");
                true
            }
            Err(e) => {
                tracing::warn!(
                    location = %self.blob.describe(),
                    error = %e,
                    "캐시 파일 저장 실패"
                );
                false
            }
        }
    }

    async fn write_blob(&self, snapshot: &Snapshot) -> Result<usize> {
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| DataError::Persistence(format!("encode: {}", e)))?;
        self.blob.save(&bytes).await?;
        Ok(bytes.len())
    }

    /// 영속 저장소 위치 (로그/헬스체크용).
    pub fn blob_location(&self) -> String {
        self.blob.describe()
    }

    /// 조회 통계.
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::record;
    use crate::storage::MemoryBlobStore;
    use chrono::NaiveDate;

    fn sample_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.set(Category::Industry, Period::Today, vec![record("BK0437", 28.04)]);
        snapshot.set(Category::Concept, Period::TenDays, vec![record("BK0896", 48.0)]);
        snapshot
    }

    #[tokio::test]
    async fn test_get_before_any_snapshot_is_miss() {
        let store = CacheStore::new(Arc::new(MemoryBlobStore::new()));

        assert!(store.get(Category::Industry, Period::Today).await.is_none());
        assert!(store.last_updated().await.is_none());
        assert_eq!(store.last_update_label().await, "未更新");
        assert_eq!(store.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_replace_then_get() {
        let store = CacheStore::new(Arc::new(MemoryBlobStore::new()));
        let at = NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap();

        store.replace_at(sample_snapshot(), at).await;

        let records = store.get(Category::Industry, Period::Today).await.unwrap();
        assert_eq!(records[0].id, "BK0437");
        assert!(store.get(Category::Industry, Period::FiveDays).await.is_none());
        assert_eq!(store.last_update_label().await, "2024-05-20 10:15:00");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_readers_keep_old_snapshot_after_replace() {
        let store = CacheStore::new(Arc::new(MemoryBlobStore::new()));
        store.replace(sample_snapshot()).await;

        let before = store.current().await.unwrap();
        store.replace(Snapshot::new()).await;

        assert_eq!(before.snapshot.total_records(), 2);
        assert_eq!(store.current().await.unwrap().snapshot.total_records(), 0);
    }

    #[tokio::test]
    async fn test_persist_then_load_round_trip() {
        let blob = Arc::new(MemoryBlobStore::new());
        let writer = CacheStore::new(blob.clone());
        assert!(writer.persist(&sample_snapshot()).await);

        let reader = CacheStore::new(blob);
        let loaded = reader.load().await.unwrap();

        assert_eq!(loaded.snapshot, sample_snapshot());
        assert!(reader.last_updated().await.is_some());
    }

    #[tokio::test]
    async fn test_load_rejects_garbage_and_empty() {
        let garbage = CacheStore::new(Arc::new(MemoryBlobStore::with_bytes("not json")));
        assert!(garbage.load().await.is_none());
        assert!(garbage.current().await.is_none());

        let empty = CacheStore::new(Arc::new(MemoryBlobStore::with_bytes(
            r#"{"industry":{"today":[]},"concept":{}}"#,
        )));
        assert!(empty.load().await.is_none());
    }

    #[tokio::test]
    async fn test_persist_failure_is_non_fatal() {
        let store = CacheStore::new(Arc::new(MemoryBlobStore::failing()));
        store.replace(sample_snapshot()).await;

        assert!(!store.persist(&sample_snapshot()).await);
        assert!(store.get(Category::Industry, Period::Today).await.is_some());
    }
}
