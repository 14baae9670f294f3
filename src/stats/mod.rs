//! Stats module - headline metrics and descriptive statistics

mod calculator;

pub use calculator::{
    group_thousands, ColumnSummary, PerformanceMetrics, StatsCalculator, TopPerformer,
};
