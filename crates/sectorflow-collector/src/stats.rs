//! 갱신 통계 구조체.

use serde::Serialize;
use std::time::Duration;

use sectorflow_data::Origin;

/// 갱신 사이클 통계
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStats {
    /// 처리한 (분류, 기간) 조합 수
    pub total: usize,
    /// 주 소스에서 가져온 조합 수
    pub primary: usize,
    /// 보조 소스로 대체된 조합 수
    pub backup: usize,
    /// 내장 데이터로 대체된 조합 수
    pub placeholder: usize,
    /// 스냅샷 전체 레코드 수
    pub total_records: usize,
    /// 영속 저장 성공 여부
    pub persisted: bool,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RefreshStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 조합 하나의 결과 기록
    pub fn record(&mut self, origin: Origin, records: usize) {
        self.total += 1;
        self.total_records += records;
        match origin {
            Origin::Primary => self.primary += 1,
            Origin::Backup => self.backup += 1,
            Origin::Placeholder => self.placeholder += 1,
        }
    }

    /// 업스트림(주/보조)에서 받은 비율 (%)
    pub fn upstream_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            ((self.primary + self.backup) as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            primary = self.primary,
            backup = self.backup,
            placeholder = self.placeholder,
            total_records = self.total_records,
            persisted = self.persisted,
            upstream_rate = format!("{:.1}%", self.upstream_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "갱신 완료"
        );
    }
}
