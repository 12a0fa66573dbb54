//! 내보내기 파일 생성.
//!
//! 조회 API와 같은 행(정규화 필드 + 호환 필드)을 CSV 또는 XLSX로 만듭니다.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use sectorflow_core::{Category, Period};

use crate::error::ApiError;
use crate::types::SectorFlowItem;

/// XLSX 워크시트 이름.
pub const SHEET_NAME: &str = "资金流数据";

/// CSV 앞에 붙는 UTF-8 BOM (Excel 한자 깨짐 방지).
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 내보내기 컬럼 (헤더 순서).
pub const EXPORT_COLUMNS: [&str; 22] = [
    "id",
    "name",
    "change_percent",
    "net_inflow",
    "net_inflow_percent",
    "main_inflow",
    "main_inflow_percent",
    "super_large_inflow",
    "super_large_inflow_percent",
    "large_inflow",
    "large_inflow_percent",
    "medium_inflow",
    "medium_inflow_percent",
    "stock_name",
    "stock_code",
    "stock_change_percent",
    "rank",
    "main_net_inflow",
    "main_net_ratio",
    "super_net_inflow",
    "super_net_ratio",
    "top_stock",
];

/// 내보내기 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// 레코드를 해당 형식의 바이트로 변환합니다.
    pub fn render(&self, items: &[SectorFlowItem]) -> Result<Vec<u8>, ApiError> {
        match self {
            ExportFormat::Csv => build_csv(items),
            ExportFormat::Excel => build_xlsx(items),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            _ => Err(format!("Invalid export format: {}", s)),
        }
    }
}

/// 셀 값.
#[derive(Debug, Clone, PartialEq)]
enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

impl Cell<'_> {
    fn to_field(&self) -> String {
        match self {
            Cell::Text(s) => (*s).to_string(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

fn row_cells(item: &SectorFlowItem) -> [Cell<'_>; 22] {
    let r = &item.record;
    [
        Cell::Text(&r.id),
        Cell::Text(&r.name),
        Cell::Number(r.change_percent),
        Cell::Number(r.net_inflow),
        Cell::Number(r.net_inflow_percent),
        Cell::Number(r.main_inflow),
        Cell::Number(r.main_inflow_percent),
        Cell::Number(r.super_large_inflow),
        Cell::Number(r.super_large_inflow_percent),
        Cell::Number(r.large_inflow),
        Cell::Number(r.large_inflow_percent),
        Cell::Number(r.medium_inflow),
        Cell::Number(r.medium_inflow_percent),
        Cell::Text(&r.stock_name),
        Cell::Text(&r.stock_code),
        Cell::Number(r.stock_change_percent),
        Cell::Number(f64::from(r.rank)),
        Cell::Number(item.main_net_inflow),
        Cell::Number(item.main_net_ratio),
        Cell::Number(item.super_net_inflow),
        Cell::Number(item.super_net_ratio),
        Cell::Text(&item.top_stock),
    ]
}

/// 내보내기 파일명: `{분류}资金流_{기간}_{YYYYMMDD}.{ext}`
pub fn export_filename(
    category: Category,
    period: Period,
    date: NaiveDate,
    format: ExportFormat,
) -> String {
    format!(
        "{}资金流_{}_{}.{}",
        category.label(),
        period.label(),
        date.format("%Y%m%d"),
        format.extension()
    )
}

/// `Content-Disposition` 헤더 값.
///
/// 비 ASCII 파일명은 RFC 5987 `filename*`로 보내고, `filename`에는 ASCII 대체 이름을 둡니다.
pub fn content_disposition(filename: &str, format: ExportFormat) -> String {
    format!(
        "attachment; filename=\"sectorflow_export.{}\"; filename*=UTF-8''{}",
        format.extension(),
        encode_rfc5987(filename)
    )
}

/// RFC 5987 attr-char 이외 바이트를 `%XX`로 인코딩합니다.
fn encode_rfc5987(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(
                byte,
                b'!' | b'#' | b'$' | b'&' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
            );
        if keep {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{:02X}", byte);
        }
    }
    out
}

/// UTF-8 BOM이 붙은 CSV 생성.
pub fn build_csv(items: &[SectorFlowItem]) -> Result<Vec<u8>, ApiError> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());

    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|e| ApiError::Export(e.to_string()))?;

    for item in items {
        let fields = row_cells(item).map(|cell| cell.to_field());
        writer
            .write_record(&fields)
            .map_err(|e| ApiError::Export(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::Export(e.to_string()))
}

/// 단일 시트 XLSX 생성.
pub fn build_xlsx(items: &[SectorFlowItem]) -> Result<Vec<u8>, ApiError> {
    write_workbook(items).map_err(|e| ApiError::Export(e.to_string()))
}

fn write_workbook(items: &[SectorFlowItem]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, item) in items.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in row_cells(item).iter().enumerate() {
            match cell {
                Cell::Text(s) => worksheet.write_string(row, col as u16, *s)?,
                Cell::Number(n) => worksheet.write_number(row, col as u16, *n)?,
            };
        }
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorflow_core::FlowRecord;

    fn items() -> Vec<SectorFlowItem> {
        vec![
            SectorFlowItem::from(FlowRecord {
                id: "BK0437".to_string(),
                name: "汽车整车".to_string(),
                main_inflow: 28.04,
                main_inflow_percent: 0.0768,
                stock_name: "黄河旋风".to_string(),
                rank: 1,
                ..Default::default()
            }),
            SectorFlowItem::from(FlowRecord {
                id: "BK0477".to_string(),
                name: "化纤, 行业".to_string(),
                main_inflow: 5.85,
                rank: 2,
                ..Default::default()
            }),
        ]
    }

    #[test]
    fn test_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();

        assert_eq!(
            export_filename(Category::Industry, Period::Today, date, ExportFormat::Excel),
            "行业板块资金流_今日_20240308.xlsx"
        );
        assert_eq!(
            export_filename(Category::Concept, Period::TenDays, date, ExportFormat::Csv),
            "概念板块资金流_10日_20240308.csv"
        );
    }

    #[test]
    fn test_content_disposition_encodes_utf8() {
        let header = content_disposition("今日_1.csv", ExportFormat::Csv);

        assert!(header.starts_with("attachment; filename=\"sectorflow_export.csv\""));
        assert!(header.ends_with("filename*=UTF-8''%E4%BB%8A%E6%97%A5_1.csv"));
    }

    #[test]
    fn test_csv_has_bom_and_header() {
        let bytes = build_csv(&items()).unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,name,change_percent"));
        assert!(lines.next().unwrap().starts_with("BK0437,汽车整车,0,"));
        // 쉼표가 든 이름은 따옴표 처리
        assert!(lines.next().unwrap().contains("\"化纤, 行业\""));
    }

    #[test]
    fn test_csv_empty_has_header_only() {
        let bytes = build_csv(&[]).unwrap();
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();

        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_xlsx_is_zip_container() {
        let bytes = build_xlsx(&items()).unwrap();

        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
