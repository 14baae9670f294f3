//! Agricultural production and export dashboard.
//!
//! Loads a monthly per-product CSV once, then serves an Overview page
//! (snippet, summary statistics, export share) and a Trends page
//! (headline metrics plus filterable charts) in an egui window.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod gui;
pub mod stats;
