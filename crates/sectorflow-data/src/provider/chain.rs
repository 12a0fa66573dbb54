//! 소스 폴백 체인.
//!
//! (분류, 기간) 요청마다 주 소스 → 보조 소스 → 내장 데이터 순서로 시도하고
//! 처음으로 비어 있지 않은 결과를 사용합니다. 업스트림 오류는 로그만 남기고
//! 호출자에게 전파하지 않습니다.

use std::sync::Arc;

use sectorflow_core::{rank_by_main_inflow, Category, FlowRecord, Period, UpstreamConfig, MAX_RECORDS};

use super::eastmoney::{BackupSource, PrimarySource};
use super::placeholder::PlaceholderSource;
use super::FlowSource;
use crate::error::{DataError, Result};

/// 10일 데이터 검증 임계값 (원 단위, 상위 5개 주력 순유입 합계).
pub const TEN_DAY_SANITY_THRESHOLD: f64 = 1_000_000.0;

/// 레코드 금액 단위(억)를 원 단위로 바꾸는 배수.
const HUNDRED_MILLION: f64 = 100_000_000.0;

/// 결과를 제공한 소스.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Primary,
    Backup,
    Placeholder,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Primary => "primary",
            Origin::Backup => "backup",
            Origin::Placeholder => "placeholder",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 폴백 결과.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// 정렬/순위 부여가 끝난 레코드 (최대 20개)
    pub records: Vec<FlowRecord>,
    /// 결과를 제공한 소스
    pub origin: Origin,
}

/// 10일 주 소스 결과 검증.
///
/// 상위 5개 레코드의 주력 순유입 합계(원 단위)가 임계값 미만이면 의심 데이터로 봅니다.
pub fn check_ten_day_sanity(records: &[FlowRecord]) -> Result<()> {
    let top5_sum: f64 = records.iter().take(5).map(|r| r.main_inflow).sum::<f64>() * HUNDRED_MILLION;

    if top5_sum < TEN_DAY_SANITY_THRESHOLD {
        return Err(DataError::UpstreamSuspect {
            top5_sum,
            threshold: TEN_DAY_SANITY_THRESHOLD,
        });
    }
    Ok(())
}

/// 정렬 후 20개로 자르고 순위 부여.
fn finalize(mut records: Vec<FlowRecord>) -> Vec<FlowRecord> {
    rank_by_main_inflow(&mut records);
    records.truncate(MAX_RECORDS);
    records
}

/// 주 소스 → 보조 소스 → 내장 데이터 폴백 체인.
#[derive(Clone)]
pub struct FallbackChain {
    primary: Arc<dyn FlowSource>,
    backup: Arc<dyn FlowSource>,
    placeholder: Arc<dyn FlowSource>,
}

impl FallbackChain {
    /// 임의의 소스로 체인 생성. 마지막 단계는 내장 데이터셋입니다.
    pub fn new(primary: Arc<dyn FlowSource>, backup: Arc<dyn FlowSource>) -> Self {
        Self {
            primary,
            backup,
            placeholder: Arc::new(PlaceholderSource),
        }
    }

    /// 마지막 단계 소스 교체.
    pub fn with_placeholder(mut self, placeholder: Arc<dyn FlowSource>) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// 업스트림 설정으로 eastmoney 소스 체인 생성.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(PrimarySource::from_config(config)?),
            Arc::new(BackupSource::from_config(config)?),
        ))
    }

    /// (분류, 기간) 레코드 조회. 항상 성공합니다.
    pub async fn resolve(&self, category: Category, period: Period) -> Vec<FlowRecord> {
        self.resolve_detailed(category, period).await.records
    }

    /// 결과와 함께 제공 소스를 반환합니다.
    pub async fn resolve_detailed(&self, category: Category, period: Period) -> Resolution {
        match self.try_source(self.primary.as_ref(), category, period).await {
            Ok(records) => {
                let records = finalize(records);
                let verdict = if period == Period::TenDays {
                    check_ten_day_sanity(&records)
                } else {
                    Ok(())
                };

                match verdict {
                    Ok(()) => {
                        return Resolution {
                            records,
                            origin: Origin::Primary,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            %category,
                            %period,
                            error = %e,
                            "주 소스 10일 데이터 의심, 보조 소스로 전환"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    source = self.primary.name(),
                    %category,
                    %period,
                    error = %e,
                    "주 소스 조회 실패, 보조 소스로 전환"
                );
            }
        }

        match self.try_source(self.backup.as_ref(), category, period).await {
            Ok(records) => {
                return Resolution {
                    records: finalize(records),
                    origin: Origin::Backup,
                }
            }
            Err(e) => {
                tracing::warn!(
                    source = self.backup.name(),
                    %category,
                    %period,
                    error = %e,
                    "보조 소스 조회 실패, 내장 데이터 사용"
                );
            }
        }

        // 마지막 단계는 실패해도 빈 결과로 끝냅니다.
        let records = match self.placeholder.fetch(category, period).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    source = self.placeholder.name(),
                    %category,
                    %period,
                    error = %e,
                    "내장 데이터 조회 실패"
                );
                Vec::new()
            }
        };

        Resolution {
            records: finalize(records),
            origin: Origin::Placeholder,
        }
    }

    async fn try_source(
        &self,
        source: &dyn FlowSource,
        category: Category,
        period: Period,
    ) -> Result<Vec<FlowRecord>> {
        let records = source.fetch(category, period).await?;
        if records.is_empty() {
            return Err(DataError::UpstreamEmpty);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::{record, StaticSource};

    fn chain(primary: StaticSource, backup: StaticSource) -> FallbackChain {
        FallbackChain::new(Arc::new(primary), Arc::new(backup))
    }

    #[tokio::test]
    async fn test_primary_success_is_sorted_and_ranked() {
        let primary = StaticSource::ok(vec![record("A", 1.0), record("B", 5.0), record("C", 3.0)]);
        let chain = chain(primary, StaticSource::failing());

        let resolution = chain.resolve_detailed(Category::Industry, Period::Today).await;

        assert_eq!(resolution.origin, Origin::Primary);
        let ids: Vec<_> = resolution.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C", "A"]);
        let ranks: Vec<_> = resolution.records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_backup() {
        let backup = StaticSource::ok(vec![record("X", 2.0)]);
        let chain = chain(StaticSource::failing(), backup);

        let resolution = chain.resolve_detailed(Category::Concept, Period::FiveDays).await;

        assert_eq!(resolution.origin, Origin::Backup);
        assert_eq!(resolution.records[0].id, "X");
    }

    #[tokio::test]
    async fn test_empty_primary_falls_back() {
        let chain = chain(StaticSource::ok(vec![]), StaticSource::ok(vec![record("X", 2.0)]));

        let resolution = chain.resolve_detailed(Category::Industry, Period::Today).await;
        assert_eq!(resolution.origin, Origin::Backup);
    }

    #[tokio::test]
    async fn test_all_failures_use_placeholder() {
        let chain = chain(StaticSource::failing(), StaticSource::failing());

        let resolution = chain.resolve_detailed(Category::Concept, Period::Today).await;

        assert_eq!(resolution.origin, Origin::Placeholder);
        assert_eq!(resolution.records.len(), 20);
        assert_eq!(resolution.records[0].id, "BK0896");
        assert_eq!(resolution.records[0].rank, 1);
        assert_eq!(resolution.records[19].rank, 20);
    }

    #[tokio::test]
    async fn test_placeholder_source_is_last_step() {
        let placeholder = Arc::new(StaticSource::ok(vec![record("Z", 1.0), record("Y", 9.0)]));
        let chain = chain(StaticSource::failing(), StaticSource::ok(vec![]))
            .with_placeholder(placeholder.clone());

        let resolution = chain.resolve_detailed(Category::Industry, Period::Today).await;

        assert_eq!(placeholder.calls(), 1);
        assert_eq!(resolution.origin, Origin::Placeholder);
        assert_eq!(resolution.records[0].id, "Y");
        assert_eq!(resolution.records[0].rank, 1);
    }

    #[tokio::test]
    async fn test_failing_placeholder_yields_empty() {
        let chain = chain(StaticSource::failing(), StaticSource::failing())
            .with_placeholder(Arc::new(StaticSource::failing()));

        let resolution = chain.resolve_detailed(Category::Concept, Period::TenDays).await;

        assert_eq!(resolution.origin, Origin::Placeholder);
        assert!(resolution.records.is_empty());
    }

    #[tokio::test]
    async fn test_suspect_ten_day_primary_is_discarded() {
        // 합계 0.005억 = 50만 원 < 100만 원
        let primary = StaticSource::ok(vec![record("P", 0.003), record("Q", 0.002)]);
        let backup = StaticSource::ok(vec![record("B", 4.0)]);
        let chain = chain(primary, backup);

        let resolution = chain.resolve_detailed(Category::Industry, Period::TenDays).await;

        assert_eq!(resolution.origin, Origin::Backup);
        assert_eq!(resolution.records[0].id, "B");
    }

    #[tokio::test]
    async fn test_small_values_accepted_outside_ten_days() {
        let primary = StaticSource::ok(vec![record("P", 0.003)]);
        let chain = chain(primary, StaticSource::failing());

        let resolution = chain.resolve_detailed(Category::Industry, Period::FiveDays).await;
        assert_eq!(resolution.origin, Origin::Primary);
    }

    #[tokio::test]
    async fn test_results_truncated_to_twenty() {
        let many = (0..25).map(|i| record(&format!("R{}", i), i as f64)).collect();
        let chain = chain(StaticSource::ok(many), StaticSource::failing());

        let records = chain.resolve(Category::Industry, Period::Today).await;

        assert_eq!(records.len(), 20);
        assert_eq!(records[0].id, "R24");
    }

    #[test]
    fn test_ten_day_sanity() {
        assert!(check_ten_day_sanity(&[record("A", 0.02)]).is_ok());
        assert!(matches!(
            check_ten_day_sanity(&[record("A", 0.001), record("B", -3.0)]),
            Err(DataError::UpstreamSuspect { .. })
        ));
        assert!(check_ten_day_sanity(&[]).is_err());
    }
}
