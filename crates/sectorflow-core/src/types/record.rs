//! 정규화된 섹터 자금 흐름 레코드.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// (분류, 기간) 하나당 유지하는 최대 레코드 수.
pub const MAX_RECORDS: usize = 20;

/// 섹터 하나의 자금 흐름 스냅샷.
///
/// 금액 필드는 억(1e8) 단위, 비율 필드는 소수(0.0055 = 0.55%)입니다.
/// 오래된 캐시 파일도 읽을 수 있도록 누락 필드는 기본값으로 채웁니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowRecord {
    /// 섹터 코드 (예: BK0437)
    pub id: String,
    /// 섹터명
    pub name: String,
    /// 등락률
    pub change_percent: f64,
    /// 순유입
    pub net_inflow: f64,
    /// 순유입 비율
    pub net_inflow_percent: f64,
    /// 주력 순유입
    pub main_inflow: f64,
    /// 주력 순유입 비율
    pub main_inflow_percent: f64,
    /// 초대형 주문 순유입
    pub super_large_inflow: f64,
    /// 초대형 주문 순유입 비율
    pub super_large_inflow_percent: f64,
    /// 대형 주문 순유입
    pub large_inflow: f64,
    /// 대형 주문 순유입 비율
    pub large_inflow_percent: f64,
    /// 중형 주문 순유입
    pub medium_inflow: f64,
    /// 중형 주문 순유입 비율
    pub medium_inflow_percent: f64,
    /// 선도 종목명
    pub stock_name: String,
    /// 선도 종목 코드
    pub stock_code: String,
    /// 선도 종목 등락률
    pub stock_change_percent: f64,
    /// 주력 순유입 기준 순위 (1부터)
    pub rank: u32,
}

/// 주력 순유입 내림차순으로 정렬하고 순위를 다시 매깁니다.
///
/// 안정 정렬이므로 동일 값은 원래 순서를 유지합니다.
pub fn rank_by_main_inflow(records: &mut [FlowRecord]) {
    records.sort_by(|a, b| {
        b.main_inflow
            .partial_cmp(&a.main_inflow)
            .unwrap_or(Ordering::Equal)
    });

    for (i, record) in records.iter_mut().enumerate() {
        record.rank = (i + 1) as u32;
    }
}
