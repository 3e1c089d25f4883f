// src/data_input/results_parser.rs

use chrono::{DateTime, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info, warn};
use ndarray::Array1;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::constants::{
    COLUMN_ANOMALY, COLUMN_PREDICTION, COLUMN_TARGET, COLUMN_TIMESTAMP, DATE_FORMAT,
};
use crate::data_input::power_data::PowerData;
use crate::error::{GraphError, GraphResult};

/// Rejects empty paths and paths without a `.csv` suffix. Performs no I/O.
pub fn check_filename(path: &Path) -> GraphResult<()> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(GraphError::InvalidFilename("no file name given".to_string()));
    }
    if !text.ends_with(".csv") {
        return Err(GraphError::InvalidFilename(
            "file must be '.csv' format".to_string(),
        ));
    }
    Ok(())
}

/// Loads a results file from disk.
///
/// The filename is validated first, so a bad path never touches the
/// filesystem. Either the whole file loads or an error is returned.
pub fn load_results_file(path: &Path) -> GraphResult<PowerData> {
    check_filename(path)?;

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => GraphError::FileNotFound(
            path.file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf()),
        ),
        _ => GraphError::Io(e),
    })?;

    let data = parse_results(file)?;
    info!(
        "Loaded {} samples from '{}' ({} .. {}), anomaly column {}",
        data.len(),
        path.display(),
        data.first_time().map(|t| t.format(DATE_FORMAT).to_string()).unwrap_or_default(),
        data.last_time().map(|t| t.format(DATE_FORMAT).to_string()).unwrap_or_default(),
        if data.has_anomalies() { "found" } else { "not found" },
    );
    Ok(data)
}

/// Parses results CSV content: a header row followed by
/// `timestamp,target,prediction[,anomaly]` rows.
pub fn parse_results<R: Read>(reader: R) -> GraphResult<PowerData> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    debug!("Headers found in CSV: {:?}", headers);
    if headers.len() < 3 {
        warn!(
            "Header has {} columns, expected '{},{},{},{}'",
            headers.len(),
            COLUMN_TIMESTAMP,
            COLUMN_TARGET,
            COLUMN_PREDICTION,
            COLUMN_ANOMALY
        );
    }

    let mut raw_times: Vec<String> = Vec::new();
    let mut target: Vec<f64> = Vec::new();
    let mut prediction: Vec<f64> = Vec::new();
    let mut anomalies: Vec<f64> = Vec::new();
    let mut rows_with_anomaly = 0usize;

    for (row_index, result) in rdr.records().enumerate() {
        let record = result?;
        let row = row_index + 1;

        raw_times.push(record.get(0).unwrap_or("").to_string());
        target.push(parse_required_f64(&record, 1, COLUMN_TARGET, row)?);
        prediction.push(parse_required_f64(&record, 2, COLUMN_PREDICTION, row)?);

        // Anomaly column is optional per row; blank counts as missing.
        if let Some(raw) = record.get(3).filter(|s| !s.is_empty()) {
            anomalies.push(parse_finite_f64(raw, COLUMN_ANOMALY, row)?);
            rows_with_anomaly += 1;
        }
    }

    if raw_times.is_empty() {
        return Err(GraphError::EmptyDataset);
    }

    let times = parse_timestamps(raw_times.as_slice())?;

    let anomalies = if rows_with_anomaly == times.len() {
        Some(Array1::from(anomalies))
    } else {
        if rows_with_anomaly > 0 {
            warn!(
                "Anomaly column present in only {} of {} rows; ignoring anomalies",
                rows_with_anomaly,
                times.len()
            );
        }
        None
    };

    let data = PowerData {
        times,
        target: Array1::from(target),
        prediction: Array1::from(prediction),
        anomalies,
    };

    if !data.is_sorted() {
        warn!("Timestamps are not in ascending order; range filtering may be inaccurate");
    }

    Ok(data)
}

fn parse_required_f64(
    record: &StringRecord,
    index: usize,
    column: &'static str,
    row: usize,
) -> GraphResult<f64> {
    parse_finite_f64(record.get(index).unwrap_or(""), column, row)
}

/// Non-finite values (inf, NaN) are rejected like any other unparseable text.
fn parse_finite_f64(raw: &str, column: &'static str, row: usize) -> GraphResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GraphError::ParseError {
            row,
            column,
            value: raw.to_string(),
        })
}

/// Converts a timestamp column to calendar time.
///
/// The whole column is first read as Unix epoch seconds (UTC). If any value
/// is not an epoch, the whole column is read with `DATE_FORMAT` instead.
pub fn parse_timestamps<S: AsRef<str>>(raw: &[S]) -> GraphResult<Vec<NaiveDateTime>> {
    if let Some(times) = raw
        .iter()
        .map(|s| parse_epoch_seconds(s.as_ref()))
        .collect::<Option<Vec<_>>>()
    {
        return Ok(times);
    }

    raw.iter()
        .map(|s| {
            let s = s.as_ref();
            NaiveDateTime::parse_from_str(s, DATE_FORMAT)
                .map_err(|_| GraphError::FormatError(s.to_string()))
        })
        .collect()
}

/// Parses an integer or fractional epoch value in seconds.
pub fn parse_epoch_seconds(raw: &str) -> Option<NaiveDateTime> {
    let seconds = raw.trim().parse::<f64>().ok()?;
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 6, 1)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[test]
    fn filename_checks_run_before_io() {
        assert!(matches!(
            check_filename(Path::new("")),
            Err(GraphError::InvalidFilename(_))
        ));
        assert!(matches!(
            check_filename(Path::new("data")),
            Err(GraphError::InvalidFilename(_))
        ));
        assert!(check_filename(Path::new("results.csv")).is_ok());
    }

    #[test]
    fn epoch_timestamps_are_utc() {
        let parsed = parse_timestamps(&["1464739200", "1464739260.5"]).unwrap();
        assert_eq!(parsed[0], at(0, 0, 0));
        assert_eq!(parsed[1].and_utc().timestamp(), 1464739260);
        assert_eq!(parsed[1].and_utc().timestamp_subsec_millis(), 500);
    }

    #[test]
    fn date_strings_fall_back_to_fixed_format() {
        let parsed = parse_timestamps(&["2016-06-01 00:00:00", "2016-06-01 00:01:00"]).unwrap();
        assert_eq!(parsed, vec![at(0, 0, 0), at(0, 1, 0)]);
    }

    #[test]
    fn unparseable_timestamp_is_format_error() {
        let err = parse_timestamps(&["2016-06-01 00:00:00", "yesterday"]).unwrap_err();
        assert!(matches!(err, GraphError::FormatError(ref v) if v == "yesterday"));
    }

    #[test]
    fn non_finite_epoch_is_rejected() {
        assert!(parse_epoch_seconds("NaN").is_none());
        assert!(parse_epoch_seconds("inf").is_none());
    }

    #[test]
    fn parses_rows_with_anomalies() {
        let csv = "Timestamp,Target,Prediction,Anomaly\n\
                   1464763755,9530,9683,0\n\
                   1464763815,8635,9150,1\n";
        let data = parse_results(csv.as_bytes()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.target.to_vec(), vec![9530.0, 8635.0]);
        assert_eq!(data.prediction.to_vec(), vec![9683.0, 9150.0]);
        assert_eq!(data.anomalies.unwrap().to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn missing_anomaly_column_is_absent() {
        let csv = "Timestamp,Target,Prediction\n1464763755,9530,9683\n";
        let data = parse_results(csv.as_bytes()).unwrap();
        assert!(data.anomalies.is_none());
    }

    #[test]
    fn partial_anomaly_column_is_dropped() {
        let csv = "Timestamp,Target,Prediction,Anomaly\n\
                   1464763755,9530,9683,1\n\
                   1464763815,8635,9150\n";
        let data = parse_results(csv.as_bytes()).unwrap();
        assert_eq!(data.len(), 2);
        assert!(data.anomalies.is_none());
    }

    #[test]
    fn non_numeric_target_is_parse_error() {
        let csv = "Timestamp,Target,Prediction,Anomaly\n1464763755,abc,9683,0\n";
        match parse_results(csv.as_bytes()) {
            Err(GraphError::ParseError { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, COLUMN_TARGET);
                assert_eq!(value, "abc");
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_values_are_parse_errors() {
        let cases = [
            ("1464763755,inf,9683,0", COLUMN_TARGET, "inf"),
            ("1464763755,9530,NaN,0", COLUMN_PREDICTION, "NaN"),
            ("1464763755,9530,9683,-inf", COLUMN_ANOMALY, "-inf"),
        ];
        for (line, expected_column, expected_value) in cases {
            let csv = format!("Timestamp,Target,Prediction,Anomaly\n{line}\n");
            match parse_results(csv.as_bytes()) {
                Err(GraphError::ParseError { row, column, value }) => {
                    assert_eq!(row, 1);
                    assert_eq!(column, expected_column);
                    assert_eq!(value, expected_value);
                }
                other => panic!("expected ParseError for {line}, got {other:?}"),
            }
        }
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let csv = "Timestamp,Target,Prediction,Anomaly\n";
        assert!(matches!(
            parse_results(csv.as_bytes()),
            Err(GraphError::EmptyDataset)
        ));
    }
}

// src/data_input/results_parser.rs
