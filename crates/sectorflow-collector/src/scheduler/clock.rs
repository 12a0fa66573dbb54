//! 시계 추상화.
//!
//! 스케줄러는 현재 시각과 대기를 이 trait을 통해서만 사용합니다.
//! 테스트에서는 실제로 잠들지 않는 고정 시계를 주입합니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};

/// 현재 시각 + 대기.
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// 현재 로컬 시각.
    fn now(&self) -> NaiveDateTime;

    /// 지정한 시간만큼 대기.
    async fn sleep(&self, duration: Duration);
}

/// 시스템 로컬 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 테스트용 고정 시계.
///
/// `sleep`은 즉시 반환하며 요청된 대기 시간을 기록하고 시각을 그만큼 앞당깁니다.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug)]
    pub struct FixedClock {
        now: Mutex<NaiveDateTime>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl FixedClock {
        pub fn new(now: NaiveDateTime) -> Self {
            Self {
                now: Mutex::new(now),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        /// 지금까지 요청된 대기 시간 목록.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.now.lock().map(|now| *now).unwrap_or_default()
        }

        async fn sleep(&self, duration: Duration) {
            if let Ok(mut sleeps) = self.sleeps.lock() {
                sleeps.push(duration);
            }
            if let (Ok(mut now), Ok(delta)) =
                (self.now.lock(), chrono::Duration::from_std(duration))
            {
                *now += delta;
            }
            tokio::task::yield_now().await;
        }
    }
}
