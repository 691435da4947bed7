//! Hour-of-day polling policy and the quiet-hours predicate.

use std::time::Duration;

use venuewatch_core::config::RefreshConfig;

/// Polling interval tier, selected by local hour. Busy hours poll faster to
/// cut notification latency; idle hours poll slower to spare the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTier {
    Fast,
    Medium,
    Slow,
    Idle,
}

impl PollTier {
    /// Total mapping from hour-of-day (0..24) to a tier. Every hour is
    /// covered; anything out of range is treated as a fast hour.
    pub fn for_hour(hour: u32) -> PollTier {
        match hour {
            0..=3 => PollTier::Slow,
            4..=10 => PollTier::Idle,
            11..=15 => PollTier::Fast,
            16..=19 => PollTier::Medium,
            _ => PollTier::Fast,
        }
    }

    /// Concrete sleep duration for this tier.
    pub fn duration(&self, refresh: &RefreshConfig) -> Duration {
        let secs = match self {
            PollTier::Fast => refresh.fast_secs,
            PollTier::Medium => refresh.medium_secs,
            PollTier::Slow => refresh.slow_secs,
            PollTier::Idle => refresh.idle_secs,
        };
        Duration::from_secs(secs)
    }
}

/// Inclusive local-hour window in which users may be disturbed.
///
/// Expired subscriptions are archived regardless; only the "removed" notice
/// is suppressed outside the window. Pure predicate, so it is testable for
/// every hour.
#[derive(Debug, Clone, Copy)]
pub struct AwakeWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl AwakeWindow {
    pub fn from_config(refresh: &RefreshConfig) -> Self {
        Self {
            start_hour: refresh.awake_start_hour,
            end_hour: refresh.awake_end_hour,
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour <= self.end_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refresh() -> RefreshConfig {
        RefreshConfig {
            fast_secs: 30,
            medium_secs: 60,
            slow_secs: 120,
            idle_secs: 900,
            ttl_hours: 4,
            awake_start_hour: 8,
            awake_end_hour: 23,
        }
    }

    #[test]
    fn every_hour_maps_to_exactly_one_tier() {
        for hour in 0..24 {
            let expected = match hour {
                0..=3 => PollTier::Slow,
                4..=10 => PollTier::Idle,
                11..=15 => PollTier::Fast,
                16..=19 => PollTier::Medium,
                20..=23 => PollTier::Fast,
                _ => unreachable!(),
            };
            assert_eq!(PollTier::for_hour(hour), expected, "hour {}", hour);
        }
    }

    #[test]
    fn tier_durations_come_from_config() {
        let refresh = refresh();
        assert_eq!(PollTier::Fast.duration(&refresh), Duration::from_secs(30));
        assert_eq!(PollTier::Medium.duration(&refresh), Duration::from_secs(60));
        assert_eq!(PollTier::Slow.duration(&refresh), Duration::from_secs(120));
        assert_eq!(PollTier::Idle.duration(&refresh), Duration::from_secs(900));
    }

    #[test]
    fn awake_window_is_inclusive() {
        let window = AwakeWindow::from_config(&refresh());
        assert!(!window.contains(0));
        assert!(!window.contains(2));
        assert!(!window.contains(7));
        assert!(window.contains(8));
        assert!(window.contains(14));
        assert!(window.contains(23));
    }
}
