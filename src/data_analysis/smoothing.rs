// src/data_analysis/smoothing.rs

use ndarray::Array1;
use std::collections::VecDeque;

/// Trailing moving average.
///
/// A window of 0 or 1 returns the input unchanged. Larger windows are clamped
/// to the series length; the first `window - 1` outputs average only the
/// samples seen so far, so the output always has the input's length.
pub fn moving_average(data: &Array1<f64>, window_size: usize) -> Array1<f64> {
    if window_size <= 1 || data.is_empty() {
        return data.to_owned(); // No smoothing needed or possible.
    }
    let window_size = window_size.min(data.len());

    let mut smoothed_data = Array1::<f64>::zeros(data.len());
    let mut current_sum: f64 = 0.0;
    let mut history: VecDeque<f64> = VecDeque::with_capacity(window_size + 1);

    for (i, &val) in data.iter().enumerate() {
        history.push_back(val);
        current_sum += val;

        if history.len() > window_size {
            if let Some(old_val) = history.pop_front() {
                current_sum -= old_val;
            }
        }

        smoothed_data[i] = current_sum / history.len() as f64;
    }
    smoothed_data
}


// src/data_analysis/smoothing.rs
