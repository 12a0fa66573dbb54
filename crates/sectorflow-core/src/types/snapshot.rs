//! 전체 (분류 × 기간) 스냅샷.
//!
//! 여섯 가지 조합이 항상 존재하도록 고정 필드 구조로 표현합니다.
//! 수집에 실패한 조합은 빈 벡터가 됩니다.

use serde::{Deserialize, Serialize};

use super::{Category, FlowRecord, Period};

/// 한 분류의 기간별 레코드.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodTable {
    #[serde(rename = "today")]
    pub today: Vec<FlowRecord>,
    #[serde(rename = "5days")]
    pub five_days: Vec<FlowRecord>,
    #[serde(rename = "10days")]
    pub ten_days: Vec<FlowRecord>,
}

impl PeriodTable {
    /// 기간에 해당하는 레코드.
    pub fn get(&self, period: Period) -> &[FlowRecord] {
        match period {
            Period::Today => &self.today,
            Period::FiveDays => &self.five_days,
            Period::TenDays => &self.ten_days,
        }
    }

    fn slot_mut(&mut self, period: Period) -> &mut Vec<FlowRecord> {
        match period {
            Period::Today => &mut self.today,
            Period::FiveDays => &mut self.five_days,
            Period::TenDays => &mut self.ten_days,
        }
    }
}

/// 모든 분류/기간 조합의 레코드 묶음.
///
/// JSON 형태: `{"industry": {"today": [...], "5days": [...], "10days": [...]}, "concept": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub industry: PeriodTable,
    pub concept: PeriodTable,
}

impl Snapshot {
    /// 빈 스냅샷 생성 (모든 조합이 빈 벡터)
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, category: Category) -> &PeriodTable {
        match category {
            Category::Industry => &self.industry,
            Category::Concept => &self.concept,
        }
    }

    /// (분류, 기간) 레코드 조회.
    pub fn get(&self, category: Category, period: Period) -> &[FlowRecord] {
        self.table(category).get(period)
    }

    /// (분류, 기간) 레코드 교체.
    pub fn set(&mut self, category: Category, period: Period, records: Vec<FlowRecord>) {
        let table = match category {
            Category::Industry => &mut self.industry,
            Category::Concept => &mut self.concept,
        };
        *table.slot_mut(period) = records;
    }

    /// 모든 조합을 고정 순서로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (Category, Period, &[FlowRecord])> + '_ {
        Category::ALL.into_iter().flat_map(move |category| {
            Period::ALL
                .into_iter()
                .map(move |period| (category, period, self.get(category, period)))
        })
    }

    /// 전체 레코드 수.
    pub fn total_records(&self) -> usize {
        self.iter().map(|(_, _, records)| records.len()).sum()
    }

    /// 비어 있는 조합 수.
    pub fn empty_slots(&self) -> usize {
        self.iter().filter(|(_, _, records)| records.is_empty()).count()
    }
}
