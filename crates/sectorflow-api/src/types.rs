//! API 응답 타입.

use serde::{Deserialize, Serialize};

use sectorflow_core::FlowRecord;

/// 섹터 자금 흐름 응답 항목.
///
/// 정규화된 레코드 필드에 기존 프론트엔드가 사용하던 필드명을 함께 싣습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorFlowItem {
    #[serde(flatten)]
    pub record: FlowRecord,
    /// = `main_inflow`
    pub main_net_inflow: f64,
    /// = `main_inflow_percent`
    pub main_net_ratio: f64,
    /// = `super_large_inflow`
    pub super_net_inflow: f64,
    /// = `super_large_inflow_percent`
    pub super_net_ratio: f64,
    /// = `stock_name`
    pub top_stock: String,
}

impl From<FlowRecord> for SectorFlowItem {
    fn from(record: FlowRecord) -> Self {
        Self {
            main_net_inflow: record.main_inflow,
            main_net_ratio: record.main_inflow_percent,
            super_net_inflow: record.super_large_inflow,
            super_net_ratio: record.super_large_inflow_percent,
            top_stock: record.stock_name.clone(),
            record,
        }
    }
}

/// `/api/last_update` 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastUpdateResponse {
    /// `YYYY-MM-DD HH:MM:SS` 또는 `未更新`
    pub last_update: String,
}

/// `/api/test` 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_aliases_are_flattened() {
        let item = SectorFlowItem::from(FlowRecord {
            id: "BK0437".to_string(),
            main_inflow: 28.04,
            main_inflow_percent: 0.0768,
            super_large_inflow: 23.15,
            super_large_inflow_percent: 0.0771,
            stock_name: "黄河旋风".to_string(),
            rank: 1,
            ..Default::default()
        });

        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["id"], "BK0437");
        assert_eq!(value["main_inflow"], 28.04);
        assert_eq!(value["main_net_inflow"], 28.04);
        assert_eq!(value["main_net_ratio"], 0.0768);
        assert_eq!(value["super_net_inflow"], 23.15);
        assert_eq!(value["super_net_ratio"], 0.0771);
        assert_eq!(value["top_stock"], "黄河旋风");
        assert_eq!(value["rank"], 1);
    }
}
