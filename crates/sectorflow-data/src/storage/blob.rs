//! 바이트 단위 영속 저장소.
//!
//! 캐시 스냅샷은 하나의 JSON 문서로 저장됩니다. 저장소는 내용을 해석하지 않고
//! 바이트만 주고받습니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use sectorflow_core::StorageConfig;

use crate::error::Result;

/// 영속 저장소 trait.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// 내용을 통째로 덮어씁니다.
    async fn save(&self, bytes: &[u8]) -> Result<()>;

    /// 저장된 내용을 읽습니다. 저장된 적이 없으면 `None`.
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// 로그용 위치 설명.
    fn describe(&self) -> String;
}

/// 파일 기반 저장소.
///
/// 임시 파일에 먼저 쓰고 rename하여 읽는 쪽이 반쯤 쓰인 파일을 보지 않게 합니다.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    path: PathBuf,
}

impl FileBlobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 저장소 설정으로 생성 (클라우드/로컬 디렉터리 선택).
    pub fn from_config(config: &StorageConfig) -> Self {
        let path = config.cache_path();
        tracing::info!(
            path = %path.display(),
            cloud = config.cloud,
            "캐시 파일 경로 결정"
        );
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn save(&self, bytes: &[u8]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// 주 저장소 쓰기가 실패하면 보조 저장소에 쓰는 저장소.
///
/// 읽기는 주 저장소에 내용이 없거나 읽을 수 없을 때 보조 저장소로 넘어갑니다.
pub struct FallbackBlobStore {
    primary: Arc<dyn BlobStore>,
    fallback: Arc<dyn BlobStore>,
}

impl FallbackBlobStore {
    pub fn new(primary: Arc<dyn BlobStore>, fallback: Arc<dyn BlobStore>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl BlobStore for FallbackBlobStore {
    async fn save(&self, bytes: &[u8]) -> Result<()> {
        match self.primary.save(bytes).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(
                    primary = %self.primary.describe(),
                    fallback = %self.fallback.describe(),
                    error = %e,
                    "주 저장소 쓰기 실패, 보조 저장소에 저장"
                );
                self.fallback.save(bytes).await
            }
        }
    }

    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match self.primary.load().await {
            Ok(Some(bytes)) => return Ok(Some(bytes)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    primary = %self.primary.describe(),
                    error = %e,
                    "주 저장소 읽기 실패, 보조 저장소 확인"
                );
            }
        }
        self.fallback.load().await
    }

    fn describe(&self) -> String {
        format!(
            "{} (fallback: {})",
            self.primary.describe(),
            self.fallback.describe()
        )
    }
}

/// 저장소 설정에 맞는 캐시 파일 저장소.
///
/// 클라우드 모드에서는 클라우드 디렉터리를 우선 쓰고, 실패하면 로컬 디렉터리를 씁니다.
pub fn blob_store_from_config(config: &StorageConfig) -> Arc<dyn BlobStore> {
    let primary = FileBlobStore::from_config(config);
    let local = config.local_cache_path();

    if config.cloud && primary.path() != local.as_path() {
        tracing::info!(fallback = %local.display(), "로컬 대체 캐시 파일 사용");
        return Arc::new(FallbackBlobStore::new(
            Arc::new(primary),
            Arc::new(FileBlobStore::new(local)),
        ));
    }
    Arc::new(primary)
}

/// 메모리 저장소 (테스트용).
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    bytes: std::sync::Mutex<Option<Vec<u8>>>,
    fail_writes: bool,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 내용을 가진 저장소.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: std::sync::Mutex::new(Some(bytes.into())),
            fail_writes: false,
        }
    }

    /// 쓰기가 항상 실패하는 저장소.
    pub fn failing() -> Self {
        Self {
            bytes: std::sync::Mutex::new(None),
            fail_writes: true,
        }
    }

    /// 현재 저장된 내용.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.bytes.lock().ok().and_then(|guard| guard.clone())
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, bytes: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(crate::error::DataError::Persistence(
                "memory store is read-only".to_string(),
            ));
        }
        if let Ok(mut guard) = self.bytes.lock() {
            *guard = Some(bytes.to_vec());
        }
        Ok(())
    }

    async fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sectorflow-blob-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = temp_dir("roundtrip");
        let store = FileBlobStore::new(dir.join("nested").join("data_cache.json"));

        store.save(b"{\"industry\":{}}").await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.as_deref(), Some(&b"{\"industry\":{}}"[..]));
        assert!(!store.temp_path().exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_file_store_missing_is_none() {
        let store = FileBlobStore::new(temp_dir("missing").join("data_cache.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[test]
    fn test_from_config_uses_cloud_dir() {
        let config = StorageConfig {
            cloud: true,
            cloud_dir: PathBuf::from("/data/render"),
            ..Default::default()
        };
        let store = FileBlobStore::from_config(&config);
        assert_eq!(store.path(), Path::new("/data/render/data_cache.json"));
        assert_eq!(store.temp_path(), PathBuf::from("/data/render/data_cache.json.tmp"));
    }

    #[tokio::test]
    async fn test_memory_store_failing_writes() {
        let store = MemoryBlobStore::failing();
        assert!(store.save(b"x").await.is_err());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fallback_save_used_when_primary_fails() {
        let primary = Arc::new(MemoryBlobStore::failing());
        let local = Arc::new(MemoryBlobStore::new());
        let store = FallbackBlobStore::new(primary, local.clone());

        store.save(b"snapshot").await.unwrap();

        assert_eq!(local.contents().as_deref(), Some(&b"snapshot"[..]));
    }

    #[tokio::test]
    async fn test_fallback_untouched_when_primary_succeeds() {
        let primary = Arc::new(MemoryBlobStore::new());
        let local = Arc::new(MemoryBlobStore::new());
        let store = FallbackBlobStore::new(primary.clone(), local.clone());

        store.save(b"snapshot").await.unwrap();

        assert!(primary.contents().is_some());
        assert!(local.contents().is_none());
    }

    #[tokio::test]
    async fn test_load_prefers_primary_then_local() {
        let store = FallbackBlobStore::new(
            Arc::new(MemoryBlobStore::with_bytes("cloud")),
            Arc::new(MemoryBlobStore::with_bytes("local")),
        );
        assert_eq!(store.load().await.unwrap().as_deref(), Some(&b"cloud"[..]));

        let store = FallbackBlobStore::new(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(MemoryBlobStore::with_bytes("local")),
        );
        assert_eq!(store.load().await.unwrap().as_deref(), Some(&b"local"[..]));
    }

    #[tokio::test]
    async fn test_unwritable_cloud_dir_persists_locally() {
        let dir = temp_dir("cloud-fallback");
        std::fs::create_dir_all(&dir).unwrap();
        // 디렉터리 자리에 일반 파일이 있어 클라우드 경로를 만들 수 없음
        let blocker = dir.join("render");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let config = StorageConfig {
            cloud: true,
            cloud_dir: blocker.clone(),
            local_dir: Some(dir.join("local")),
            ..Default::default()
        };

        let store = blob_store_from_config(&config);
        assert!(store.describe().contains("fallback"));
        store.save(b"{\"industry\":{}}").await.unwrap();
        assert!(dir.join("local").join("data_cache.json").exists());

        // 재시작: 클라우드 경로 읽기 실패 후 로컬 파일에서 복원
        let restarted = blob_store_from_config(&config);
        assert_eq!(
            restarted.load().await.unwrap().as_deref(),
            Some(&b"{\"industry\":{}}"[..])
        );

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_local_mode_has_no_fallback() {
        let config = StorageConfig {
            local_dir: Some(PathBuf::from("/var/lib/sectorflow")),
            ..Default::default()
        };
        assert_eq!(
            blob_store_from_config(&config).describe(),
            "/var/lib/sectorflow/data_cache.json"
        );
    }
}
