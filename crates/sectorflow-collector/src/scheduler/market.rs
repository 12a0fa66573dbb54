//! 장중/장외 판정.

use std::time::Duration;

use chrono::{NaiveTime, Timelike};

use sectorflow_core::SchedulerConfig;

/// 갱신 주기를 결정하는 시장 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketState {
    /// 09:30 ~ 15:00 (양 끝 포함)
    Trading,
    OffHours,
}

impl MarketState {
    /// 로컬 시각의 시장 상태. 요일은 구분하지 않습니다.
    pub fn at(time: NaiveTime) -> Self {
        let (hour, minute) = (time.hour(), time.minute());
        let trading = (9..=15).contains(&hour)
            && !(hour == 9 && minute < 30)
            && !(hour == 15 && minute > 0);

        if trading {
            MarketState::Trading
        } else {
            MarketState::OffHours
        }
    }

    /// 이 상태에서의 다음 갱신까지 대기 시간.
    pub fn interval(&self, config: &SchedulerConfig) -> Duration {
        match self {
            MarketState::Trading => config.trading_interval(),
            MarketState::OffHours => config.off_hours_interval(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketState::Trading => "trading",
            MarketState::OffHours => "off_hours",
        }
    }
}

impl std::fmt::Display for MarketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> MarketState {
        MarketState::at(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    #[test]
    fn test_trading_window_boundaries() {
        assert_eq!(at(9, 29), MarketState::OffHours);
        assert_eq!(at(9, 30), MarketState::Trading);
        assert_eq!(at(12, 0), MarketState::Trading);
        assert_eq!(at(15, 0), MarketState::Trading);
        assert_eq!(at(15, 1), MarketState::OffHours);
        assert_eq!(at(8, 59), MarketState::OffHours);
        assert_eq!(at(23, 0), MarketState::OffHours);
    }

    #[test]
    fn test_interval_per_state() {
        let config = SchedulerConfig::default();
        assert_eq!(at(9, 29).interval(&config), Duration::from_secs(120 * 60));
        assert_eq!(at(9, 30).interval(&config), Duration::from_secs(15 * 60));
    }
}
