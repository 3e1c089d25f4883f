// tests/loader_integration_test.rs

use std::io::Write;
use std::path::Path;

use chrono::Duration;
use results_grapher::data_analysis::filter_time_range;
use results_grapher::data_input::load_results_file;
use results_grapher::GraphError;
use tempfile::{Builder, NamedTempFile};

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_then_full_range_filter_is_identity() {
        let file = write_csv(
            "Timestamp,Target,Prediction,Anomaly\n\
             1464763755,9530,9683,0\n\
             1464763815,8635,9150,1\n\
             1464763875,8800,8700,0\n",
        );
        let data = load_results_file(file.path()).unwrap();
        assert_eq!(data.len(), 3);

        let start = data.first_time().unwrap();
        let end = data.last_time().unwrap() + Duration::milliseconds(1);
        assert_eq!(filter_time_range(&data, start, end), data);
    }

    #[test]
    fn date_string_timestamps_load() {
        let file = write_csv(
            "Timestamp,Target,Prediction,Anomaly\n\
             2016-06-01 00:00:00,100,110,0\n\
             2016-06-01 00:01:00,120,115,1\n",
        );
        let data = load_results_file(file.path()).unwrap();
        assert_eq!(data.last_time().unwrap() - data.first_time().unwrap(), Duration::minutes(1));
        assert_eq!(data.anomaly_count(), 1);
    }

    #[test]
    fn non_numeric_target_exposes_no_data() {
        let file = write_csv("Timestamp,Target,Prediction,Anomaly\n1464763755,abc,9683,0\n");
        let err = load_results_file(file.path()).unwrap_err();
        assert!(matches!(err, GraphError::ParseError { row: 1, .. }));
    }

    #[test]
    fn infinite_and_nan_targets_are_parse_errors() {
        for value in ["inf", "NaN"] {
            let file = write_csv(&format!(
                "Timestamp,Target,Prediction,Anomaly\n1464763755,9530,9683,0\n1464763815,{value},9150,1\n"
            ));
            match load_results_file(file.path()) {
                Err(GraphError::ParseError { row, column, value: text }) => {
                    assert_eq!(row, 2);
                    assert_eq!(column, "Target");
                    assert_eq!(text, value);
                }
                other => panic!("expected ParseError for {value}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unparseable_timestamp_is_format_error() {
        let file = write_csv("Timestamp,Target,Prediction\nnoon,1,2\n");
        assert!(matches!(
            load_results_file(file.path()),
            Err(GraphError::FormatError(_))
        ));
    }

    #[test]
    fn path_without_csv_suffix_is_rejected_before_io() {
        // "data" does not exist either, so a FileNotFound would mean I/O was attempted.
        assert!(matches!(
            load_results_file(Path::new("data")),
            Err(GraphError::InvalidFilename(_))
        ));
        assert!(matches!(
            load_results_file(Path::new("")),
            Err(GraphError::InvalidFilename(_))
        ));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        match load_results_file(&path) {
            Err(GraphError::FileNotFound(name)) => assert_eq!(name, Path::new("missing.csv")),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }
}

// tests/loader_integration_test.rs
