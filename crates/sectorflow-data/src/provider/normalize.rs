//! 업스트림 레코드 정규화.
//!
//! 주 소스(JSONP 리스트 API)와 보조 소스(데이터센터 리포트 API)는
//! 필드 키와 응답 구조가 다릅니다. 이 모듈은 두 형태를 하나의 [`FlowRecord`]로
//! 변환하며, 기간별/소스별 필드 키 매핑을 명시적인 테이블로 보관합니다.
//!
//! ## 단위 변환
//! - 금액: 원 단위 → 억 단위 (`/ 1e8`, 소수점 2자리 반올림)
//! - 비율: 퍼센트 값(`7.68`) → 소수 (`0.0768`)
//!
//! 숫자 변환은 실패하지 않습니다. 해석할 수 없는 값은 기본값이 됩니다.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use sectorflow_core::{FlowRecord, Period, MAX_RECORDS};

use crate::error::{DataError, Result};

/// 업스트림 소스 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// JSONP 리스트 API
    Primary,
    /// 데이터센터 리포트 API
    Backup,
}

/// 금액/비율 필드 키 묶음.
#[derive(Debug, Clone, Copy)]
pub struct FlowKeys {
    pub net_inflow: &'static str,
    pub net_inflow_percent: &'static str,
    pub main_inflow: &'static str,
    pub main_inflow_percent: &'static str,
    pub super_large_inflow: &'static str,
    pub super_large_inflow_percent: &'static str,
    pub large_inflow: &'static str,
    pub large_inflow_percent: &'static str,
    pub medium_inflow: &'static str,
    pub medium_inflow_percent: &'static str,
}

/// (소스, 기간) 하나의 전체 필드 매핑.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    pub id: &'static str,
    pub name: &'static str,
    /// 이름 필드가 없을 때 사용할 값
    pub default_name: &'static str,
    pub change_percent: &'static str,
    pub stock_name: &'static str,
    /// 선도 종목 코드 (보조 소스는 제공하지 않음)
    pub stock_code: Option<&'static str>,
    pub flows: FlowKeys,
}

const PRIMARY_TODAY_FLOWS: FlowKeys = FlowKeys {
    net_inflow: "f62",
    net_inflow_percent: "f184",
    main_inflow: "f66",
    main_inflow_percent: "f69",
    super_large_inflow: "f72",
    super_large_inflow_percent: "f75",
    large_inflow: "f78",
    large_inflow_percent: "f81",
    medium_inflow: "f84",
    medium_inflow_percent: "f87",
};

const PRIMARY_FIVE_DAY_FLOWS: FlowKeys = FlowKeys {
    net_inflow: "f267",
    net_inflow_percent: "f268",
    main_inflow: "f269",
    main_inflow_percent: "f270",
    super_large_inflow: "f271",
    super_large_inflow_percent: "f272",
    large_inflow: "f273",
    large_inflow_percent: "f274",
    medium_inflow: "f275",
    medium_inflow_percent: "f276",
};

// 10일 리스트는 주력 순유입을 별도 필드로 주지 않아 순유입 필드를 그대로 쓴다.
const PRIMARY_TEN_DAY_FLOWS: FlowKeys = FlowKeys {
    net_inflow: "f160",
    net_inflow_percent: "f161",
    main_inflow: "f160",
    main_inflow_percent: "f161",
    super_large_inflow: "f162",
    super_large_inflow_percent: "f163",
    large_inflow: "f164",
    large_inflow_percent: "f165",
    medium_inflow: "f166",
    medium_inflow_percent: "f167",
};

const BACKUP_FLOWS: FlowKeys = FlowKeys {
    net_inflow: "MAIN_FORCE_NET",
    net_inflow_percent: "MAIN_FORCE_NET_RATE",
    main_inflow: "MAIN_FORCE_NET",
    main_inflow_percent: "MAIN_FORCE_NET_RATE",
    super_large_inflow: "SUPER_NET",
    super_large_inflow_percent: "SUPER_NET_RATE",
    large_inflow: "BIG_NET",
    large_inflow_percent: "BIG_NET_RATE",
    medium_inflow: "MID_NET",
    medium_inflow_percent: "MID_NET_RATE",
};

const fn primary_table(flows: FlowKeys) -> FieldTable {
    FieldTable {
        id: "f12",
        name: "f14",
        default_name: "未知板块",
        change_percent: "f3",
        stock_name: "f204",
        stock_code: Some("f205"),
        flows,
    }
}

const fn backup_table(flows: FlowKeys) -> FieldTable {
    FieldTable {
        id: "SECURITY_CODE",
        name: "SECURITY_NAME_ABBR",
        default_name: "",
        change_percent: "CHANGE_RATE",
        stock_name: "SECURITY_NAME_ABBR",
        stock_code: None,
        flows,
    }
}

static PRIMARY_TODAY: FieldTable = primary_table(PRIMARY_TODAY_FLOWS);
static PRIMARY_FIVE_DAYS: FieldTable = primary_table(PRIMARY_FIVE_DAY_FLOWS);
static PRIMARY_TEN_DAYS: FieldTable = primary_table(PRIMARY_TEN_DAY_FLOWS);
static BACKUP_TODAY: FieldTable = backup_table(BACKUP_FLOWS);
static BACKUP_FIVE_DAYS: FieldTable = backup_table(BACKUP_FLOWS);
static BACKUP_TEN_DAYS: FieldTable = backup_table(BACKUP_FLOWS);

/// (소스, 기간)에 해당하는 필드 매핑 테이블.
pub fn field_table(source: SourceKind, period: Period) -> &'static FieldTable {
    match (source, period) {
        (SourceKind::Primary, Period::Today) => &PRIMARY_TODAY,
        (SourceKind::Primary, Period::FiveDays) => &PRIMARY_FIVE_DAYS,
        (SourceKind::Primary, Period::TenDays) => &PRIMARY_TEN_DAYS,
        (SourceKind::Backup, Period::Today) => &BACKUP_TODAY,
        (SourceKind::Backup, Period::FiveDays) => &BACKUP_FIVE_DAYS,
        (SourceKind::Backup, Period::TenDays) => &BACKUP_TEN_DAYS,
    }
}

/// 주 소스 `fields` 쿼리 파라미터 (기간별 요청 필드 목록).
pub fn primary_request_fields(period: Period) -> &'static str {
    match period {
        Period::Today => "f12,f14,f2,f3,f62,f184,f66,f69,f72,f75,f78,f81,f84,f87,f204,f205,f124",
        Period::FiveDays => {
            "f12,f14,f2,f3,f267,f268,f269,f270,f271,f272,f273,f274,f275,f276,f204,f205,f124"
        }
        Period::TenDays => {
            "f12,f14,f2,f3,f160,f161,f162,f163,f164,f165,f166,f167,f168,f169,f204,f205,f124"
        }
    }
}

/// 주 소스 정렬 필드 (`fid`).
pub fn primary_sort_field(period: Period) -> &'static str {
    match period {
        Period::Today => "f62",
        Period::FiveDays => "f267",
        Period::TenDays => "f160",
    }
}

// ==================== 숫자 변환 ====================

/// 값을 f64로 변환 (실패 시 기본값).
///
/// 숫자, 숫자 문자열(`%`와 천 단위 구분자 제거)을 받으며
/// `null`, 빈 문자열, `-`, 해석 불가 값은 `default`가 됩니다.
pub fn coerce_f64(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => {
            let cleaned = s.replace(['%', ','], "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() || cleaned == "-" {
                return default;
            }
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        }
        _ => default,
    }
}

/// 소수점 2자리 반올림 (Decimal 경유).
pub fn round_dp2(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(2))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

/// 원 단위 금액을 억 단위로 변환 (소수점 2자리).
pub fn to_hundred_million(value: Option<&Value>) -> f64 {
    let raw = coerce_f64(value, 0.0);
    Decimal::from_f64(raw)
        .map(|d| (d / Decimal::from(100_000_000)).round_dp(2))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

/// 퍼센트 값을 소수로 변환 (`7.68` → `0.0768`).
pub fn to_fraction(value: Option<&Value>) -> f64 {
    coerce_f64(value, 0.0) / 100.0
}

fn text_field(raw: &Map<String, Value>, key: &str, default: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

// ==================== 레코드 정규화 ====================

/// 업스트림 레코드 하나를 정규화합니다. 순위는 0으로 두고 정렬 후 매깁니다.
pub fn normalize_record(
    raw: &Map<String, Value>,
    source: SourceKind,
    period: Period,
) -> FlowRecord {
    let table = field_table(source, period);
    let keys = &table.flows;
    let change_percent = to_fraction(raw.get(table.change_percent));

    FlowRecord {
        id: text_field(raw, table.id, ""),
        name: text_field(raw, table.name, table.default_name),
        change_percent,
        net_inflow: to_hundred_million(raw.get(keys.net_inflow)),
        net_inflow_percent: to_fraction(raw.get(keys.net_inflow_percent)),
        main_inflow: to_hundred_million(raw.get(keys.main_inflow)),
        main_inflow_percent: to_fraction(raw.get(keys.main_inflow_percent)),
        super_large_inflow: to_hundred_million(raw.get(keys.super_large_inflow)),
        super_large_inflow_percent: to_fraction(raw.get(keys.super_large_inflow_percent)),
        large_inflow: to_hundred_million(raw.get(keys.large_inflow)),
        large_inflow_percent: to_fraction(raw.get(keys.large_inflow_percent)),
        medium_inflow: to_hundred_million(raw.get(keys.medium_inflow)),
        medium_inflow_percent: to_fraction(raw.get(keys.medium_inflow_percent)),
        stock_name: text_field(raw, table.stock_name, ""),
        stock_code: table
            .stock_code
            .map(|key| text_field(raw, key, ""))
            .unwrap_or_default(),
        stock_change_percent: change_percent,
        rank: 0,
    }
}

/// 업스트림 행 목록을 정규화합니다.
///
/// 앞쪽 [`MAX_RECORDS`]개만 사용하고 객체가 아닌 항목은 건너뜁니다.
pub fn normalize_rows(rows: &[Value], source: SourceKind, period: Period) -> Vec<FlowRecord> {
    rows.iter()
        .take(MAX_RECORDS)
        .filter_map(|row| match row {
            Value::Object(raw) => Some(normalize_record(raw, source, period)),
            other => {
                tracing::debug!(?source, kind = value_kind(other), "객체가 아닌 행 건너뜀");
                None
            }
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ==================== 응답 파싱 ====================

/// JSONP 래퍼(`jQuery(...)`)를 벗겨냅니다. 순수 JSON은 그대로 반환합니다.
pub fn strip_jsonp(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }

    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(start), Some(end)) if start < end => &trimmed[start + 1..end],
        _ => trimmed,
    }
}

/// 주 소스 응답에서 데이터 행을 추출합니다.
///
/// 유효 조건: `rc == 0`이고 `data.diff`가 비어 있지 않음.
/// `diff`는 배열 또는 인덱스 키 객체일 수 있습니다.
pub fn parse_primary_payload(text: &str) -> Result<Vec<Value>> {
    let payload: Value = serde_json::from_str(strip_jsonp(text))
        .map_err(|e| DataError::UpstreamMalformed(format!("primary JSON: {}", e)))?;

    match payload.get("rc").and_then(Value::as_i64) {
        Some(0) => {}
        Some(rc) => return Err(DataError::UpstreamUnavailable(format!("primary rc={}", rc))),
        None => return Err(DataError::UpstreamMalformed("primary payload missing rc".into())),
    }

    let diff = match payload.get("data") {
        Some(Value::Null) | None => return Err(DataError::UpstreamEmpty),
        Some(data) => data.get("diff"),
    };

    let rows = match diff {
        Some(Value::Array(rows)) => rows.clone(),
        Some(Value::Object(map)) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(key, _)| key.parse::<usize>().unwrap_or(usize::MAX));
            entries.into_iter().map(|(_, row)| row.clone()).collect()
        }
        Some(Value::Null) | None => return Err(DataError::UpstreamEmpty),
        Some(_) => {
            return Err(DataError::UpstreamMalformed(
                "primary data.diff is neither array nor object".into(),
            ))
        }
    };

    if rows.is_empty() {
        return Err(DataError::UpstreamEmpty);
    }
    Ok(rows)
}

/// 보조 소스 응답에서 데이터 행을 추출합니다.
///
/// 유효 조건: `success == true`이고 `result.data`가 비어 있지 않은 배열.
pub fn parse_backup_payload(text: &str) -> Result<Vec<Value>> {
    let payload: Value = serde_json::from_str(text.trim())
        .map_err(|e| DataError::UpstreamMalformed(format!("backup JSON: {}", e)))?;

    let success = payload
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let result = payload.get("result").filter(|r| !r.is_null());

    let Some(result) = result.filter(|_| success) else {
        return Err(DataError::UpstreamEmpty);
    };

    match result.get("data") {
        Some(Value::Array(rows)) if !rows.is_empty() => Ok(rows.clone()),
        Some(Value::Array(_)) | Some(Value::Null) | None => Err(DataError::UpstreamEmpty),
        Some(_) => Err(DataError::UpstreamMalformed(
            "backup result.data is not an array".into(),
        )),
    }
}
