//! 내장 대체 데이터셋.
//!
//! 주 소스와 보조 소스가 모두 실패했을 때 화면이 비지 않도록 사용하는
//! 분류별 고정 데이터입니다. 기간별로는 금액만 고정 배율로 늘립니다.

use async_trait::async_trait;

use sectorflow_core::{Category, FlowRecord, Period};

use super::normalize::round_dp2;
use super::FlowSource;
use crate::error::Result;

/// (코드, 이름, 등락률, 주력 순유입, 주력 비율, 초대형 순유입, 초대형 비율, 선도 종목)
type Row = (&'static str, &'static str, f64, f64, f64, f64, f64, &'static str);

const INDUSTRY_ROWS: [Row; 20] = [
    ("BK0437", "汽车整车", 0.0055, 28.04, 0.0768, 23.15, 0.0771, "黄河旋风"),
    ("BK0477", "化纤行业", 0.0060, 5.85, 0.0875, 5.83, 0.0873, "永太科技"),
    ("BK0465", "化学制药", 0.0167, 3.73, 0.0082, 7.47, 0.0165, "华海药业"),
    ("BK0438", "医药商业", 0.0061, 3.37, 0.0549, 3.22, 0.0525, "一心堂"),
    ("BK0478", "贵金属", 0.0196, 3.35, 0.0345, 0.77, 0.0079, "赤峰黄金"),
    ("BK0479", "电源设备", -0.0124, 1.52, 0.0121, 3.40, 0.0270, "上海电气"),
    ("BK0545", "橡胶制品", -0.0021, 1.37, 0.0215, 3.04, 0.0479, "回天新材"),
    ("BK0451", "医疗服务", 0.0117, 1.19, 0.0080, 0.57, 0.0039, "美年健康"),
    ("BK0733", "中药", 0.0050, 0.62, 0.0058, 0.92, 0.0085, "众生药业"),
    ("BK0736", "塑料制品", -0.0011, 0.45, 0.0034, 4.51, 0.0341, "国风塑业"),
    ("BK0748", "煤炭开采", 0.0213, 0.38, 0.0045, 1.82, 0.0214, "兖矿能源"),
    ("BK0756", "有色金属", -0.0087, 0.25, 0.0018, 2.15, 0.0153, "紫金矿业"),
    ("BK0821", "钢铁行业", 0.0145, 0.18, 0.0012, 1.98, 0.0134, "宝钢股份"),
    ("BK0890", "石油化工", -0.0032, 0.12, 0.0008, 1.67, 0.0112, "中国石化"),
    ("BK0901", "建筑材料", 0.0078, 0.09, 0.0006, 1.43, 0.0098, "海螺水泥"),
    ("BK0912", "食品饮料", -0.0023, 0.06, 0.0004, 1.25, 0.0087, "贵州茅台"),
    ("BK0923", "纺织服装", 0.0112, 0.03, 0.0002, 1.08, 0.0076, "海澜之家"),
    ("BK0934", "房地产", -0.0156, -0.12, -0.0008, 0.92, 0.0065, "万科A"),
    ("BK0945", "银行", 0.0034, -0.18, -0.0012, 0.76, 0.0054, "招商银行"),
    ("BK0956", "保险", -0.0067, -0.25, -0.0018, 0.58, 0.0042, "中国平安"),
];

const CONCEPT_ROWS: [Row; 20] = [
    ("BK0896", "华为概念", -0.0063, 21.05, 0.0389, 22.19, 0.0410, "立讯精密"),
    ("BK0638", "AIGC概念", -0.0137, 16.34, 0.0709, 19.72, 0.0856, "科大讯飞"),
    ("BK0523", "国产替代", -0.0059, 13.53, 0.0168, 25.38, 0.0320, "兆易创新"),
    ("BK0821", "成渝特区", -0.0085, 9.92, 0.0241, 19.86, 0.0483, "宗申动力"),
    ("BK0693", "ChatGPT概念", 0.0296, 8.54, 0.0373, 10.22, 0.0447, "汉王科技"),
    ("BK0662", "医疗器械", 0.0215, 6.28, 0.0439, 5.21, 0.0364, "迈瑞医疗"),
    ("BK0847", "CPO概念", -0.0077, 6.16, 0.0443, 4.89, 0.0351, "中际旭创"),
    ("BK0682", "汽车热管理", -0.0023, 4.92, 0.0179, 6.57, 0.0239, "均胜电子"),
    ("BK0701", "新能源车", 0.0134, 4.56, 0.0198, 5.89, 0.0256, "比亚迪"),
    ("BK0712", "锂电池", 0.0089, 4.23, 0.0214, 5.67, 0.0287, "宁德时代"),
    ("BK0723", "人工智能", -0.0045, 3.89, 0.0167, 4.98, 0.0214, "科大讯飞"),
    ("BK0734", "5G概念", 0.0076, 3.45, 0.0145, 4.23, 0.0178, "中兴通讯"),
    ("BK0745", "芯片概念", -0.0123, 3.12, 0.0134, 3.98, 0.0171, "韦尔股份"),
    ("BK0756", "光伏概念", 0.0213, 2.89, 0.0123, 3.67, 0.0156, "隆基绿能"),
    ("BK0767", "风电概念", 0.0178, 2.56, 0.0109, 3.34, 0.0142, "金风科技"),
    ("BK0778", "数字货币", -0.0092, 2.23, 0.0095, 2.98, 0.0127, "数字认证"),
    ("BK0789", "云计算", 0.0034, 1.98, 0.0084, 2.67, 0.0114, "用友网络"),
    ("BK0790", "大数据", -0.0056, 1.67, 0.0071, 2.23, 0.0095, "东方国信"),
    ("BK0801", "区块链", 0.0145, 1.34, 0.0057, 1.89, 0.0081, "远光软件"),
    ("BK0812", "虚拟现实", -0.0112, 1.12, 0.0048, 1.56, 0.0067, "歌尔股份"),
];

/// 기간별 (주력 배율, 초대형 배율).
fn scale_factors(category: Category, period: Period) -> (f64, f64) {
    match (category, period) {
        (_, Period::Today) => (1.0, 1.0),
        (Category::Industry, Period::FiveDays) => (1.8, 1.6),
        (Category::Industry, Period::TenDays) => (2.5, 2.2),
        (Category::Concept, Period::FiveDays) => (1.7, 1.5),
        (Category::Concept, Period::TenDays) => (2.3, 2.0),
    }
}

/// 분류/기간에 맞는 대체 레코드 (업스트림 순서, 순위 미부여).
pub fn placeholder_records(category: Category, period: Period) -> Vec<FlowRecord> {
    let rows: &[Row] = match category {
        Category::Industry => &INDUSTRY_ROWS,
        Category::Concept => &CONCEPT_ROWS,
    };
    let (main_factor, super_factor) = scale_factors(category, period);

    rows.iter()
        .map(|&(id, name, change, main, main_pct, super_large, super_pct, stock)| {
            FlowRecord {
                id: id.to_string(),
                name: name.to_string(),
                change_percent: change,
                net_inflow: main,
                net_inflow_percent: main_pct,
                main_inflow: round_dp2(main * main_factor),
                main_inflow_percent: main_pct,
                super_large_inflow: round_dp2(super_large * super_factor),
                super_large_inflow_percent: super_pct,
                stock_name: stock.to_string(),
                stock_change_percent: change,
                ..Default::default()
            }
        })
        .collect()
}

/// 내장 데이터셋 소스. 항상 성공합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSource;

#[async_trait]
impl FlowSource for PlaceholderSource {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn fetch(&self, category: Category, period: Period) -> Result<Vec<FlowRecord>> {
        Ok(placeholder_records(category, period))
    }
}
