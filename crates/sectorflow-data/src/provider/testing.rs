//! 테스트용 고정 소스.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use sectorflow_core::{Category, FlowRecord, Period};

use super::FlowSource;
use crate::error::{DataError, Result};

/// 주력 순유입만 지정한 테스트 레코드.
pub fn record(id: &str, main_inflow: f64) -> FlowRecord {
    FlowRecord {
        id: id.to_string(),
        name: format!("{} 板块", id),
        main_inflow,
        net_inflow: main_inflow,
        ..Default::default()
    }
}

/// 항상 같은 결과를 돌려주는 소스. 호출 횟수를 기록합니다.
pub struct StaticSource {
    response: Option<Vec<FlowRecord>>,
    calls: AtomicUsize,
}

impl StaticSource {
    /// 항상 주어진 레코드를 반환.
    pub fn ok(records: Vec<FlowRecord>) -> Self {
        Self {
            response: Some(records),
            calls: AtomicUsize::new(0),
        }
    }

    /// 항상 `UpstreamUnavailable`을 반환.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// 지금까지의 `fetch` 호출 횟수.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlowSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, _category: Category, _period: Period) -> Result<Vec<FlowRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(records) => Ok(records.clone()),
            None => Err(DataError::UpstreamUnavailable("static failure".to_string())),
        }
    }
}
