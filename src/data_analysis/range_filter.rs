// src/data_analysis/range_filter.rs

use chrono::NaiveDateTime;
use ndarray::s;

use crate::data_input::PowerData;

/// Returns the contiguous part of `data` with `start <= t < end`.
///
/// Timestamps must be ascending. The first and last matching samples bound
/// the slice; when nothing matches the result is empty. The anomaly series,
/// if present, is sliced alongside.
pub fn filter_time_range(data: &PowerData, start: NaiveDateTime, end: NaiveDateTime) -> PowerData {
    let in_range = |t: &NaiveDateTime| *t >= start && *t < end;

    let first = data.times.iter().position(in_range);
    let last = data.times.iter().rposition(in_range);

    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => return PowerData::empty(data.has_anomalies()),
    };
    let range = first..last + 1;

    PowerData {
        times: data.times[range.clone()].to_vec(),
        target: data.target.slice(s![range.clone()]).to_owned(),
        prediction: data.prediction.slice(s![range.clone()]).to_owned(),
        anomalies: data
            .anomalies
            .as_ref()
            .map(|a| a.slice(s![range.clone()]).to_owned()),
    }
}


// src/data_analysis/range_filter.rs
