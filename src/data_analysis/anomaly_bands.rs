// src/data_analysis/anomaly_bands.rs

use chrono::NaiveDateTime;
use ndarray::Array1;
use plotters::style::RGBColor;

use crate::constants::{COLOR_TIER_HIGH, COLOR_TIER_LOW, COLOR_TIER_MEDIUM};

/// Anomaly density of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeverityTier {
    None,
    Low,
    Medium,
    High,
}

impl SeverityTier {
    /// Classifies a bucket's anomaly sum against thresholds at 1/3 and 2/3 of
    /// the bucket length. Comparisons are strict.
    pub fn classify(anomaly_sum: f64, duration: usize) -> Self {
        let low = 0.0;
        let medium = duration as f64 / 3.0;
        let high = medium * 2.0;
        if anomaly_sum > high {
            SeverityTier::High
        } else if anomaly_sum > medium {
            SeverityTier::Medium
        } else if anomaly_sum > low {
            SeverityTier::Low
        } else {
            SeverityTier::None
        }
    }

    /// Band color, or `None` for windows that are not drawn.
    pub fn color(self) -> Option<RGBColor> {
        match self {
            SeverityTier::None => None,
            SeverityTier::Low => Some(*COLOR_TIER_LOW),
            SeverityTier::Medium => Some(*COLOR_TIER_MEDIUM),
            SeverityTier::High => Some(*COLOR_TIER_HIGH),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeverityTier::None => "none",
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        }
    }
}

/// One classified bucket of the anomaly series.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyBand {
    pub start: NaiveDateTime,
    pub duration_minutes: usize,
    pub anomaly_sum: f64,
    pub tier: SeverityTier,
}

/// Buckets `anomalies` into groups of `duration_minutes` consecutive samples
/// and classifies each complete bucket.
///
/// Buckets are sample-count based, not time based. Each band starts at the
/// timestamp of its bucket's first sample. A trailing partial bucket is
/// dropped, and a duration of 0 produces no bands. If the two series differ
/// in length only their common prefix is used.
pub fn anomaly_bands(
    anomalies: &Array1<f64>,
    times: &[NaiveDateTime],
    duration_minutes: usize,
) -> Vec<AnomalyBand> {
    if duration_minutes == 0 {
        return Vec::new();
    }
    let covered = anomalies.len().min(times.len());
    let flags: Vec<f64> = anomalies.iter().take(covered).copied().collect();

    flags
        .chunks_exact(duration_minutes)
        .zip(times.chunks_exact(duration_minutes))
        .map(|(bucket, bucket_times)| {
            let anomaly_sum: f64 = bucket.iter().sum();
            AnomalyBand {
                start: bucket_times[0],
                duration_minutes,
                anomaly_sum,
                tier: SeverityTier::classify(anomaly_sum, duration_minutes),
            }
        })
        .collect()
}


// src/data_analysis/anomaly_bands.rs
