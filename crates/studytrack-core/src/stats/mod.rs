//! Statistics module for studytrack
//!
//! Derived metrics over a category's study log: completion rate, trend,
//! streak, suggested target and best hour of day.

mod trend;

pub use trend::{
    best_hour, calculate_metrics, classify_trend, current_streak, suggested_minutes,
    tomorrow_probability, CategoryMetrics, MetricsCalculator, Trend, DEFAULT_TREND_WINDOW,
    TREND_WINDOWS,
};
