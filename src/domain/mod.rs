//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod panel;
pub mod summary;
pub mod metrics;
pub mod scoring;
pub mod comparison;
pub mod analysis;
pub mod universe;
pub mod config_validation;
pub mod error;
