//! 캐시 갱신 스케줄러.
//!
//! # 동작 방식
//!
//! 1. 6개 (분류 × 기간) 조합을 폴백 체인으로 동시에 수집
//! 2. 전체 스냅샷을 만들어 캐시에 원자적으로 설치
//! 3. 영속 저장소에 기록 (실패해도 계속 진행)
//! 4. 현재 시장 상태에 따라 15분(장중) 또는 120분(장외) 대기
//!
//! 사이클 도중 태스크가 실패하면 아무것도 설치하지 않고 5분 뒤 재시도합니다.

pub mod clock;
pub mod market;

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sectorflow_core::{Category, Period, SchedulerConfig, Snapshot};
use sectorflow_data::{CacheStore, FallbackChain};

use crate::config::CollectorConfig;
use crate::error::Result;
use crate::stats::RefreshStats;

pub use clock::{Clock, SystemClock};
pub use market::MarketState;

/// 시작 시 캐시 준비 결과.
#[derive(Debug, Clone)]
pub enum BootstrapOutcome {
    /// 영속 저장소에서 복원함
    Loaded { records: usize },
    /// 저장된 캐시가 없어 전체 갱신을 수행함
    Refreshed(RefreshStats),
}

impl BootstrapOutcome {
    /// 부트스트랩에서 방금 갱신했는지 여부.
    pub fn refreshed(&self) -> bool {
        matches!(self, BootstrapOutcome::Refreshed(_))
    }
}

/// 장중/장외 주기로 캐시를 갱신하는 스케줄러.
pub struct RefreshScheduler<C: Clock = SystemClock> {
    chain: FallbackChain,
    cache: Arc<CacheStore>,
    config: SchedulerConfig,
    clock: C,
}

impl RefreshScheduler<SystemClock> {
    pub fn new(chain: FallbackChain, cache: Arc<CacheStore>, config: SchedulerConfig) -> Self {
        Self::with_clock(chain, cache, config, SystemClock)
    }

    /// 설정의 eastmoney 소스로 체인을 구성하여 생성.
    pub fn from_config(config: &CollectorConfig, cache: Arc<CacheStore>) -> Result<Self> {
        let chain = FallbackChain::from_config(&config.upstream)?;
        Ok(Self::new(chain, cache, config.scheduler.clone()))
    }
}

impl<C: Clock> RefreshScheduler<C> {
    /// 시계를 지정하여 생성.
    pub fn with_clock(
        chain: FallbackChain,
        cache: Arc<CacheStore>,
        config: SchedulerConfig,
        clock: C,
    ) -> Self {
        Self {
            chain,
            cache,
            config,
            clock,
        }
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// 전체 갱신 사이클 1회.
    ///
    /// 모든 조합이 끝나야 스냅샷을 설치합니다. 태스크 하나라도 실패하면
    /// 캐시는 그대로 두고 오류를 반환합니다.
    pub async fn run_cycle(&self) -> Result<RefreshStats> {
        let started = Instant::now();

        let handles: Vec<JoinHandle<_>> = Category::ALL
            .into_iter()
            .flat_map(|category| Period::ALL.into_iter().map(move |period| (category, period)))
            .map(|(category, period)| {
                let chain = self.chain.clone();
                tokio::spawn(async move {
                    let resolution = chain.resolve_detailed(category, period).await;
                    (category, period, resolution)
                })
            })
            .collect();

        let mut snapshot = Snapshot::new();
        let mut stats = RefreshStats::new();

        for joined in join_all(handles).await {
            let (category, period, resolution) = joined?;
            tracing::debug!(
                %category,
                %period,
                origin = %resolution.origin,
                records = resolution.records.len(),
                "조합 수집 완료"
            );
            stats.record(resolution.origin, resolution.records.len());
            snapshot.set(category, period, resolution.records);
        }

        let installed = self.cache.replace_at(snapshot, self.clock.now()).await;
        stats.persisted = self.cache.persist(&installed.snapshot).await;
        stats.elapsed = started.elapsed();

        Ok(stats)
    }

    /// 프로세스 시작 시 캐시 준비.
    ///
    /// 영속 저장소에 데이터가 있으면 그대로 사용하고, 없으면 요청을 받기 전에
    /// 전체 갱신을 한 번 수행합니다.
    pub async fn bootstrap(&self) -> Result<BootstrapOutcome> {
        if let Some(loaded) = self.cache.load().await {
            let records = loaded.snapshot.total_records();
            tracing::info!(records, "저장된 캐시로 시작");
            return Ok(BootstrapOutcome::Loaded { records });
        }

        tracing::info!("저장된 캐시 없음, 초기 갱신 실행");
        let stats = self.run_cycle().await?;
        stats.log_summary("초기 갱신");
        Ok(BootstrapOutcome::Refreshed(stats))
    }

    /// 사이클 결과에 따른 다음 대기 시간.
    fn next_wait(&self, outcome: &Result<RefreshStats>) -> Duration {
        match outcome {
            Ok(stats) => {
                stats.log_summary("정기 갱신");
                let state = MarketState::at(self.clock.now().time());
                let wait = state.interval(&self.config);
                tracing::info!(
                    state = %state,
                    next_in_minutes = wait.as_secs() / 60,
                    "다음 갱신 예약"
                );
                wait
            }
            Err(e) => {
                let wait = self.config.backoff();
                tracing::error!(
                    error = %e,
                    retry_in_minutes = wait.as_secs() / 60,
                    "갱신 사이클 실패"
                );
                wait
            }
        }
    }

    /// 종료 신호까지 갱신 루프 실행.
    ///
    /// `immediate`가 `false`면 첫 사이클 전에 현재 상태의 주기만큼 먼저 대기합니다.
    pub async fn run(&self, shutdown_token: CancellationToken, immediate: bool) {
        tracing::info!(
            trading_minutes = self.config.trading_interval_minutes,
            off_hours_minutes = self.config.off_hours_interval_minutes,
            backoff_minutes = self.config.backoff_minutes,
            immediate,
            "갱신 스케줄러 시작"
        );

        let mut wait = if immediate {
            None
        } else {
            let state = MarketState::at(self.clock.now().time());
            Some(state.interval(&self.config))
        };

        loop {
            if let Some(duration) = wait {
                tokio::select! {
                    biased;
                    _ = shutdown_token.cancelled() => break,
                    _ = self.clock.sleep(duration) => {}
                }
            }
            if shutdown_token.is_cancelled() {
                break;
            }

            let outcome = tokio::select! {
                biased;
                _ = shutdown_token.cancelled() => break,
                outcome = self.run_cycle() => outcome,
            };
            wait = Some(self.next_wait(&outcome));
        }

        tracing::info!("갱신 스케줄러 종료됨");
    }
}

impl<C: Clock> RefreshScheduler<C> {
    /// 백그라운드 태스크로 갱신 루프 시작.
    pub fn spawn(
        self: Arc<Self>,
        shutdown_token: CancellationToken,
        immediate: bool,
    ) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown_token, immediate).await })
    }
}

#[cfg(test)]
mod tests {
    use super::clock::testing::FixedClock;
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use sectorflow_core::FlowRecord;
    use sectorflow_data::provider::testing::{record, StaticSource};
    use sectorflow_data::{FlowSource, MemoryBlobStore};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn scheduler(
        primary: Arc<dyn FlowSource>,
        backup: Arc<dyn FlowSource>,
        blob: Arc<MemoryBlobStore>,
        now: NaiveDateTime,
    ) -> RefreshScheduler<FixedClock> {
        RefreshScheduler::with_clock(
            FallbackChain::new(primary, backup),
            Arc::new(CacheStore::new(blob)),
            SchedulerConfig::default(),
            FixedClock::new(now),
        )
    }

    struct PanickingSource;

    #[async_trait]
    impl FlowSource for PanickingSource {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn fetch(
            &self,
            _category: Category,
            _period: Period,
        ) -> sectorflow_data::Result<Vec<FlowRecord>> {
            panic!("source exploded");
        }
    }

    #[tokio::test]
    async fn test_from_config_builds_eastmoney_chain() {
        let config = CollectorConfig::from_app(&sectorflow_core::AppConfig::default()).unwrap();
        let cache = Arc::new(CacheStore::new(Arc::new(MemoryBlobStore::new())));

        let scheduler = RefreshScheduler::from_config(&config, cache).unwrap();

        assert!(scheduler.cache().current().await.is_none());
    }

    #[tokio::test]
    async fn test_run_cycle_fills_all_slots_and_persists() {
        let primary = Arc::new(StaticSource::ok(vec![record("A", 1.0), record("B", 2.0)]));
        let blob = Arc::new(MemoryBlobStore::new());
        let scheduler = scheduler(
            primary.clone(),
            Arc::new(StaticSource::failing()),
            blob.clone(),
            at(10, 0),
        );

        let stats = scheduler.run_cycle().await.unwrap();

        assert_eq!(primary.calls(), 6);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.primary, 6);
        assert_eq!(stats.total_records, 12);
        assert!(stats.persisted);
        assert!(blob.contents().is_some());

        let current = scheduler.cache().current().await.unwrap();
        assert_eq!(current.refreshed_at, at(10, 0));
        assert_eq!(current.snapshot.empty_slots(), 0);
        assert_eq!(current.snapshot.get(Category::Concept, Period::TenDays)[0].id, "B");
    }

    #[tokio::test]
    async fn test_failed_cycle_commits_nothing() {
        let scheduler = scheduler(
            Arc::new(PanickingSource),
            Arc::new(StaticSource::failing()),
            Arc::new(MemoryBlobStore::new()),
            at(10, 0),
        );

        assert!(scheduler.run_cycle().await.is_err());
        assert!(scheduler.cache().current().await.is_none());
    }

    #[tokio::test]
    async fn test_persist_failure_still_installs_snapshot() {
        let scheduler = scheduler(
            Arc::new(StaticSource::failing()),
            Arc::new(StaticSource::failing()),
            Arc::new(MemoryBlobStore::failing()),
            at(20, 0),
        );

        let stats = scheduler.run_cycle().await.unwrap();

        assert!(!stats.persisted);
        assert_eq!(stats.placeholder, 6);
        assert!(scheduler
            .cache()
            .get(Category::Industry, Period::Today)
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_bootstrap_without_blob_refreshes() {
        let scheduler = scheduler(
            Arc::new(StaticSource::failing()),
            Arc::new(StaticSource::failing()),
            Arc::new(MemoryBlobStore::new()),
            at(8, 0),
        );

        let outcome = scheduler.bootstrap().await.unwrap();

        assert!(outcome.refreshed());
        let records = scheduler
            .cache()
            .get(Category::Industry, Period::Today)
            .await
            .unwrap();
        assert!(!records.is_empty());
        assert_eq!(
            scheduler.cache().last_update_label().await,
            "2024-05-20 08:00:00"
        );
    }

    #[tokio::test]
    async fn test_bootstrap_prefers_stored_snapshot() {
        let mut stored = Snapshot::new();
        stored.set(Category::Industry, Period::Today, vec![record("S", 1.0)]);
        let blob = Arc::new(MemoryBlobStore::with_bytes(
            serde_json::to_vec(&stored).unwrap(),
        ));
        let primary = Arc::new(StaticSource::ok(vec![record("A", 1.0)]));
        let scheduler = scheduler(
            primary.clone(),
            Arc::new(StaticSource::failing()),
            blob,
            at(8, 0),
        );

        let outcome = scheduler.bootstrap().await.unwrap();

        assert!(matches!(outcome, BootstrapOutcome::Loaded { records: 1 }));
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_run_waits_trading_interval_then_stops() {
        let scheduler = Arc::new(scheduler(
            Arc::new(StaticSource::ok(vec![record("A", 1.0)])),
            Arc::new(StaticSource::failing()),
            Arc::new(MemoryBlobStore::new()),
            at(10, 0),
        ));
        let token = CancellationToken::new();

        let handle = scheduler.clone().spawn(token.clone(), true);
        while scheduler.clock().sleeps().len() < 2 {
            tokio::task::yield_now().await;
        }
        token.cancel();
        handle.await.unwrap();

        let sleeps = scheduler.clock().sleeps();
        // 10:00 장중 → 15분, 10:15 장중 → 15분
        assert_eq!(sleeps[0], Duration::from_secs(15 * 60));
        assert_eq!(sleeps[1], Duration::from_secs(15 * 60));
    }

    #[tokio::test]
    async fn test_run_backs_off_after_failure() {
        let scheduler = Arc::new(scheduler(
            Arc::new(PanickingSource),
            Arc::new(StaticSource::failing()),
            Arc::new(MemoryBlobStore::new()),
            at(10, 0),
        ));
        let token = CancellationToken::new();

        let handle = scheduler.clone().spawn(token.clone(), true);
        while scheduler.clock().sleeps().is_empty() {
            tokio::task::yield_now().await;
        }
        token.cancel();
        handle.await.unwrap();

        assert_eq!(scheduler.clock().sleeps()[0], Duration::from_secs(5 * 60));
    }

    #[tokio::test]
    async fn test_run_off_hours_interval_when_not_immediate() {
        let scheduler = Arc::new(scheduler(
            Arc::new(StaticSource::ok(vec![record("A", 1.0)])),
            Arc::new(StaticSource::failing()),
            Arc::new(MemoryBlobStore::new()),
            at(20, 0),
        ));
        let token = CancellationToken::new();

        let handle = scheduler.clone().spawn(token.clone(), false);
        while scheduler.clock().sleeps().is_empty() {
            tokio::task::yield_now().await;
        }
        token.cancel();
        handle.await.unwrap();

        assert_eq!(scheduler.clock().sleeps()[0], Duration::from_secs(120 * 60));
    }
}
