//! 섹터 분류 및 집계 기간 정의.
//!
//! 업스트림(동방재부) 요청 파라미터와 내보내기 파일명에 쓰이는
//! 코드/라벨도 함께 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 섹터 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// 업종 섹터
    Industry,
    /// 테마(개념) 섹터
    Concept,
}

impl Category {
    /// 모든 분류 (스냅샷 조립 순서)
    pub const ALL: [Category; 2] = [Category::Industry, Category::Concept];

    /// 문자열 표현을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Industry => "industry",
            Category::Concept => "concept",
        }
    }

    /// 내보내기 파일명에 쓰이는 현지화 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Industry => "行业板块",
            Category::Concept => "概念板块",
        }
    }

    /// 주 소스의 보드 타입 코드 (`fs=m:90+t:{code}`).
    pub fn board_code(&self) -> &'static str {
        match self {
            Category::Industry => "2",
            Category::Concept => "3",
        }
    }

    /// 보조 소스의 `MARKET_TYPE` 필터 값.
    pub fn market_type(&self) -> &'static str {
        self.label()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "industry" => Ok(Category::Industry),
            "concept" => Ok(Category::Concept),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

/// 자금 흐름 집계 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    /// 당일
    #[serde(rename = "today")]
    Today,
    /// 최근 5거래일
    #[serde(rename = "5days")]
    FiveDays,
    /// 최근 10거래일
    #[serde(rename = "10days")]
    TenDays,
}

impl Period {
    /// 모든 기간 (스냅샷 조립 순서)
    pub const ALL: [Period; 3] = [Period::Today, Period::FiveDays, Period::TenDays];

    /// 문자열 표현을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::FiveDays => "5days",
            Period::TenDays => "10days",
        }
    }

    /// 내보내기 파일명에 쓰이는 현지화 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "今日",
            Period::FiveDays => "5日",
            Period::TenDays => "10日",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Today
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "5days" => Ok(Period::FiveDays),
            "10days" => Ok(Period::TenDays),
            _ => Err(format!("Invalid period: {}", s)),
        }
    }
}
