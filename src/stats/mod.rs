//! Statistics module - headline metrics and percentage arithmetic

mod calculator;
mod metrics;

pub use calculator::{Share, StatsCalculator, Variation};
pub use metrics::HeadlineMetrics;
