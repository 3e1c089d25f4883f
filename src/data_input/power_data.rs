// src/data_input/power_data.rs

use chrono::NaiveDateTime;
use ndarray::Array1;

use crate::constants::ANOMALY_FLAG;

/// Column-wise storage of one loaded results file.
///
/// `times`, `target` and `prediction` always share one length. `anomalies`,
/// when present, has that same length too.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerData {
    pub times: Vec<NaiveDateTime>, // Sample timestamps, ascending.
    pub target: Array1<f64>,       // Measured power (W).
    pub prediction: Array1<f64>,   // Predicted power (W).
    pub anomalies: Option<Array1<f64>>, // 0/1 anomaly flags, absent if the column is missing.
}

impl Default for PowerData {
    fn default() -> Self {
        Self::empty(false)
    }
}

impl PowerData {
    /// An empty dataset, keeping whether an anomaly series is carried.
    pub fn empty(with_anomalies: bool) -> Self {
        Self {
            times: Vec::new(),
            target: Array1::zeros(0),
            prediction: Array1::zeros(0),
            anomalies: with_anomalies.then(|| Array1::zeros(0)),
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn first_time(&self) -> Option<NaiveDateTime> {
        self.times.first().copied()
    }

    pub fn last_time(&self) -> Option<NaiveDateTime> {
        self.times.last().copied()
    }

    pub fn has_anomalies(&self) -> bool {
        self.anomalies.is_some()
    }

    /// Number of samples flagged with `ANOMALY_FLAG`.
    pub fn anomaly_count(&self) -> usize {
        self.anomalies
            .as_ref()
            .map(|a| a.iter().filter(|&&v| v == ANOMALY_FLAG).count())
            .unwrap_or(0)
    }

    /// True if timestamps never decrease.
    pub fn is_sorted(&self) -> bool {
        self.times.windows(2).all(|w| w[0] <= w[1])
    }
}


// src/data_input/power_data.rs
