// src/data_analysis/mod.rs

pub mod anomaly_bands;
pub mod range_filter;
pub mod smoothing;

pub use anomaly_bands::{anomaly_bands, AnomalyBand, SeverityTier};
pub use range_filter::filter_time_range;
pub use smoothing::moving_average;

// src/data_analysis/mod.rs
