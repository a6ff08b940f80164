//! Trend and streak metrics for one category's study log.
//!
//! Everything here is a pure function of the ordered record list:
//! - **Completion rate**: share of records marked completed
//! - **Trend**: mean of the later half of the trailing window against the
//!   earlier half (a two-window moving average, noisy on small windows)
//! - **Streak**: completed records counted back from the most recent one
//! - **Suggested target**: next session length nudged by the trend
//! - **Best hour**: hour of day with the most completed minutes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::records::SessionRecord;

/// Trailing window sizes offered to users.
pub const TREND_WINDOWS: [usize; 4] = [7, 14, 30, 60];

pub const DEFAULT_TREND_WINDOW: usize = 7;

/// Percentage change that must be exceeded to leave `Stable`.
const TREND_THRESHOLD_PCT: u128 = 10;

/// Short-term direction of study minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Fewer than three completed values in the window
    Neutral,
    Rising,
    Stable,
    Falling,
}

/// Metrics for a single category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    /// Trailing window size the metrics were computed with
    pub window: usize,
    /// Records marked completed
    pub completed_days: usize,
    /// All records
    pub total_days: usize,
    /// 0.0 .. 100.0
    pub completion_rate: f64,
    /// Mean minutes of completed records in the trailing window
    pub average_trailing: f64,
    pub trend: Trend,
    /// Consecutive completed records ending at the most recent one
    pub streak: u32,
    /// Heuristic score in 5.0 ..= 95.0, not a statistical estimate
    pub tomorrow_probability: f64,
    /// Suggested minutes for the next session
    pub suggested_minutes: u32,
    /// Completion rate capped at 95
    pub completion_probability: f64,
    /// Hour of day (0-23) with the most completed minutes
    pub best_hour: Option<u8>,
}

/// Calculator for [`CategoryMetrics`]
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    /// Number of most recent records in the trailing window
    pub window: usize,
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self {
            window: DEFAULT_TREND_WINDOW,
        }
    }
}

impl MetricsCalculator {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    /// Compute metrics for an ordered record list. `None` when it is empty.
    pub fn calculate(&self, records: &[SessionRecord]) -> Option<CategoryMetrics> {
        if records.is_empty() {
            return None;
        }

        let total_days = records.len();
        let completed_days = records.iter().filter(|r| r.completed).count();
        let completion_rate = 100.0 * completed_days as f64 / total_days as f64;

        let trailing = &records[total_days.saturating_sub(self.window)..];
        let values: Vec<u32> = trailing
            .iter()
            .filter(|r| r.completed)
            .map(|r| r.minutes)
            .collect();
        let average_trailing = mean(&values);

        let trend = classify_trend(&values);
        let streak = current_streak(records);

        Some(CategoryMetrics {
            window: self.window,
            completed_days,
            total_days,
            completion_rate,
            average_trailing,
            trend,
            streak,
            tomorrow_probability: tomorrow_probability(streak, completion_rate, trend),
            suggested_minutes: suggested_minutes(average_trailing, trend),
            completion_probability: completion_rate.min(95.0),
            best_hour: best_hour(records),
        })
    }
}

/// Shorthand for `MetricsCalculator::new(window).calculate(records)`.
pub fn calculate_metrics(records: &[SessionRecord], window: usize) -> Option<CategoryMetrics> {
    MetricsCalculator::new(window).calculate(records)
}

/// Compare the mean of the second half of `values` against the first half.
///
/// The split is at `floor(n / 2)`. Exactly ±10% stays `Stable`. Means are
/// compared by cross-multiplying the integer sums, so the boundary is exact.
/// A zero first half rises as soon as the second half has any minutes.
pub fn classify_trend(values: &[u32]) -> Trend {
    if values.len() < 3 {
        return Trend::Neutral;
    }
    let (first, second) = values.split_at(values.len() / 2);
    let sum = |half: &[u32]| half.iter().map(|&v| u128::from(v)).sum::<u128>();
    let (n1, n2) = (first.len() as u128, second.len() as u128);

    // mean(second) / mean(first) compared against (100 ± threshold) / 100.
    let later = 100 * sum(second) * n1;
    let earlier = sum(first) * n2;

    if later > (100 + TREND_THRESHOLD_PCT) * earlier {
        Trend::Rising
    } else if later < (100 - TREND_THRESHOLD_PCT) * earlier {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

pub fn current_streak(records: &[SessionRecord]) -> u32 {
    records.iter().rev().take_while(|r| r.completed).count() as u32
}

pub fn tomorrow_probability(streak: u32, completion_rate: f64, trend: Trend) -> f64 {
    let streak_factor = f64::from(streak.saturating_mul(5).min(30));
    let trend_factor = match trend {
        Trend::Rising => 15.0,
        Trend::Falling => -15.0,
        Trend::Stable | Trend::Neutral => 0.0,
    };
    (50.0 + streak_factor + completion_rate * 0.5 + trend_factor).clamp(5.0, 95.0)
}

/// Push harder when falling, nudge when flat, hold when rising.
pub fn suggested_minutes(average_trailing: f64, trend: Trend) -> u32 {
    // Scaled in whole percent so 10 * 110% is exactly 11, not 11.000000000000002.
    let percent = match trend {
        Trend::Falling => 130.0,
        Trend::Stable => 110.0,
        Trend::Rising | Trend::Neutral => 100.0,
    };
    (average_trailing * percent / 100.0).ceil() as u32
}

/// Hour with the largest sum of completed minutes; ties go to the lowest hour.
pub fn best_hour(records: &[SessionRecord]) -> Option<u8> {
    let mut by_hour: BTreeMap<u8, u64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.completed) {
        if let Some(hour) = record.start_hour {
            *by_hour.entry(hour).or_default() += u64::from(record.minutes);
        }
    }

    let mut best: Option<(u8, u64)> = None;
    for (hour, total) in by_hour {
        if best.map_or(true, |(_, max)| total > max) {
            best = Some((hour, total));
        }
    }
    best.map(|(hour, _)| hour)
}

fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}
