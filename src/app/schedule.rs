use std::time::{Duration, Instant};

use chrono::Timelike;

use crate::config::Config;

pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Local hours during which valuations move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TradingHours {
    start_hour: u32,
    end_hour: u32,
}

impl Default for TradingHours {
    fn default() -> Self {
        Self {
            start_hour: 10,
            end_hour: 15,
        }
    }
}

impl TradingHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// `start_hour <= hour < end_hour`.
    pub fn contains<T: Timelike>(&self, time: &T) -> bool {
        let hour = time.hour();
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Fixed-interval polling gated by trading hours.
#[derive(Clone, Debug)]
pub struct RefreshSchedule {
    interval: Duration,
    hours: TradingHours,
    last_refresh: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(interval: Duration, hours: TradingHours) -> Self {
        Self {
            interval,
            hours,
            last_refresh: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_secs(config.refresh_secs),
            TradingHours::new(config.trading_start, config.trading_end),
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_trading_hours<T: Timelike>(&self, local: &T) -> bool {
        self.hours.contains(local)
    }

    pub fn is_due<T: Timelike>(&self, now: Instant, local: &T) -> bool {
        if !self.hours.contains(local) {
            return false;
        }
        match self.last_refresh {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    pub fn mark_refreshed(&mut self, now: Instant) {
        self.last_refresh = Some(now);
    }

    /// Auto refresh only runs with something to refresh, inside trading hours.
    pub fn auto_refresh_active<T: Timelike>(&self, tracked_count: usize, local: &T) -> bool {
        tracked_count > 0 && self.hours.contains(local)
    }
}
