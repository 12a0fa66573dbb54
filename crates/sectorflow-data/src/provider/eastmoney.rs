//! 동방재부(eastmoney) 섹터 자금 흐름 클라이언트.
//!
//! # 엔드포인트
//!
//! - 주 소스: `push2.eastmoney.com/api/qt/clist/get` (JSONP, `fs=m:90 t:{2|3}`)
//! - 보조 소스: `datacenter-web.eastmoney.com/api/data/v1/get`
//!   (`RPT_SECTOR_FUND_FLOW[_5|_10]` 리포트)
//!
//! 두 엔드포인트 모두 브라우저 요청 헤더가 없으면 응답을 거부하는 경우가 있어
//! 요청마다 User-Agent를 무작위로 고릅니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, Utc};
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER, USER_AGENT};
use reqwest::Client;

use sectorflow_core::{Category, FlowRecord, Period, UpstreamConfig};

use super::normalize::{
    normalize_rows, parse_backup_payload, parse_primary_payload, primary_request_fields,
    primary_sort_field, SourceKind,
};
use super::FlowSource;
use crate::error::{DataError, Result};

/// 요청마다 하나를 고르는 User-Agent 목록.
const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
];

/// 주 소스 고정 토큰
const PRIMARY_UT: &str = "bd1d9ddb04089700cf9c27f6f7426281";

/// 보조 소스 요청 컬럼
const BACKUP_COLUMNS: &str = "SECURITY_CODE,SECURITY_NAME_ABBR,CHANGE_RATE,MAIN_FORCE_NET,MAIN_FORCE_NET_RATE,SUPER_NET,SUPER_NET_RATE,BIG_NET,BIG_NET_RATE,MID_NET,MID_NET_RATE,SMALL_NET,SMALL_NET_RATE";

fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// 공통 브라우저 헤더.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(REFERER, HeaderValue::from_static("https://data.eastmoney.com/"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

/// 타임아웃과 공통 헤더가 설정된 HTTP 클라이언트 생성.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .default_headers(browser_headers())
        .build()
        .map_err(|e| DataError::UpstreamUnavailable(format!("HTTP 클라이언트 생성 실패: {}", e)))
}

/// 응답 본문을 텍스트로 읽습니다. 200이 아니면 오류.
async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(DataError::UpstreamUnavailable(format!("HTTP {}", status)));
    }
    Ok(response.text().await?)
}

// ==================== 주 소스 ====================

/// JSONP 리스트 API 소스.
#[derive(Clone)]
pub struct PrimarySource {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl PrimarySource {
    /// 엔드포인트와 타임아웃을 지정하여 생성.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
            page_size: 50,
        })
    }

    /// 업스트림 설정으로 생성.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let mut source = Self::new(config.primary_url.clone(), config.timeout())?;
        source.page_size = config.page_size;
        Ok(source)
    }

    fn query(&self, category: Category, period: Period) -> Vec<(&'static str, String)> {
        vec![
            ("cb", "jQuery".to_string()),
            ("pn", "1".to_string()),
            ("pz", self.page_size.to_string()),
            ("po", "1".to_string()),
            ("np", "1".to_string()),
            ("ut", PRIMARY_UT.to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fid", primary_sort_field(period).to_string()),
            ("fs", format!("m:90 t:{}", category.board_code())),
            ("fields", primary_request_fields(period).to_string()),
            ("_", Utc::now().timestamp_millis().to_string()),
        ]
    }
}

#[async_trait]
impl FlowSource for PrimarySource {
    fn name(&self) -> &'static str {
        "primary"
    }

    async fn fetch(&self, category: Category, period: Period) -> Result<Vec<FlowRecord>> {
        let response = self
            .client
            .get(&self.base_url)
            .header(USER_AGENT, random_user_agent())
            .query(&self.query(category, period))
            .send()
            .await?;

        let body = read_body(response).await?;
        let rows = parse_primary_payload(&body)?;
        let records = normalize_rows(&rows, SourceKind::Primary, period);

        tracing::debug!(
            %category,
            %period,
            rows = rows.len(),
            records = records.len(),
            "주 소스 응답 정규화 완료"
        );

        if records.is_empty() {
            return Err(DataError::UpstreamEmpty);
        }
        Ok(records)
    }
}

// ==================== 보조 소스 ====================

/// 데이터센터 리포트 API 소스.
#[derive(Clone)]
pub struct BackupSource {
    client: Client,
    base_url: String,
}

impl BackupSource {
    /// 엔드포인트와 타임아웃을 지정하여 생성.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    /// 업스트림 설정으로 생성.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        Self::new(config.backup_url.clone(), config.timeout())
    }

    /// 기간별 리포트명.
    pub fn report_name(period: Period) -> &'static str {
        match period {
            Period::Today => "RPT_SECTOR_FUND_FLOW",
            Period::FiveDays => "RPT_SECTOR_FUND_FLOW_5",
            Period::TenDays => "RPT_SECTOR_FUND_FLOW_10",
        }
    }

    fn query(category: Category, period: Period) -> Vec<(&'static str, String)> {
        let trade_date = Local::now().format("%Y-%m-%d");
        vec![
            ("sortColumns", "TRADE_DATE,SECURITY_CODE".to_string()),
            ("sortTypes", "-1,-1".to_string()),
            ("pageSize", "50".to_string()),
            ("pageNumber", "1".to_string()),
            ("reportName", Self::report_name(period).to_string()),
            ("columns", BACKUP_COLUMNS.to_string()),
            ("source", "WEB".to_string()),
            ("client", "WEB".to_string()),
            (
                "filter",
                format!(
                    "(TRADE_DATE='{}')AND(MARKET_TYPE=\"{}\")",
                    trade_date,
                    category.market_type()
                ),
            ),
        ]
    }
}

#[async_trait]
impl FlowSource for BackupSource {
    fn name(&self) -> &'static str {
        "backup"
    }

    async fn fetch(&self, category: Category, period: Period) -> Result<Vec<FlowRecord>> {
        let response = self
            .client
            .get(&self.base_url)
            .header(USER_AGENT, random_user_agent())
            .query(&Self::query(category, period))
            .send()
            .await?;

        let body = read_body(response).await?;
        let rows = parse_backup_payload(&body)?;
        let records = normalize_rows(&rows, SourceKind::Backup, period);

        tracing::debug!(
            %category,
            %period,
            rows = rows.len(),
            records = records.len(),
            "보조 소스 응답 정규화 완료"
        );

        if records.is_empty() {
            return Err(DataError::UpstreamEmpty);
        }
        Ok(records)
    }
}
