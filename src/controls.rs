// src/controls.rs

//! Textual user controls.
//!
//! Each line typed by the user maps to one `Command`, the equivalent of one
//! click or edit in a graphical front end.

use chrono::NaiveDateTime;
use std::path::PathBuf;

use crate::constants::DATE_FORMAT;
use crate::error::{GraphError, GraphResult};

pub const HELP_TEXT: &str = "\
Commands:
  load <file.csv>            load a results file and draw it
  start <YYYY-MM-DD HH:MM:SS> set the start of the displayed range
  end <YYYY-MM-DD HH:MM:SS>   set the end of the displayed range (exclusive)
  smooth on <minutes>        enable smoothing with the given window
  smooth off                 disable smoothing
  anomalies on <minutes>     enable anomaly bands with the given window
  anomalies off              disable anomaly bands
  update                     recompute and redraw the graph
  reset                      disable all options and redraw the full file
  status                     show the current file and options
  help                       show this message
  quit                       exit";

/// Which windowed option a window value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Smoothing,
    Anomaly,
}

impl WindowKind {
    pub fn name(self) -> &'static str {
        match self {
            WindowKind::Smoothing => "Smoothing",
            WindowKind::Anomaly => "Anomaly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Start(NaiveDateTime),
    End(NaiveDateTime),
    /// `None` turns smoothing off.
    Smooth(Option<usize>),
    /// `None` turns anomaly bands off.
    Anomalies(Option<usize>),
    Update,
    Reset,
    Status,
    Help,
    Quit,
}

/// Parses a window value in minutes. Only non-negative integers are accepted.
pub fn parse_window(raw: &str, kind: WindowKind) -> GraphResult<usize> {
    raw.trim().parse::<usize>().map_err(|_| {
        GraphError::InvalidWindowValue(format!(
            "{} window must be integer value, got '{}'.",
            kind.name(),
            raw.trim()
        ))
    })
}

/// Parses a date-time selector value in `DATE_FORMAT`.
pub fn parse_date_time(raw: &str) -> GraphResult<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| GraphError::FormatError(raw.to_string()))
}

fn parse_toggle(rest: &str, kind: WindowKind) -> GraphResult<Option<usize>> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("off"), None, None) => Ok(None),
        (Some("on"), Some(window), None) => parse_window(window, kind).map(Some),
        (Some("on"), None, None) => Err(GraphError::InvalidWindowValue(format!(
            "{} window value missing.",
            kind.name()
        ))),
        _ => Err(GraphError::InvalidCommand(format!(
            "expected 'on <minutes>' or 'off', got '{}'",
            rest.trim()
        ))),
    }
}

/// Parses one command line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> GraphResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        // Path may contain spaces, so take the whole remainder.
        "load" | "open" => Command::Load(PathBuf::from(rest)),
        "start" => Command::Start(parse_date_time(rest)?),
        "end" => Command::End(parse_date_time(rest)?),
        "smooth" => Command::Smooth(parse_toggle(rest, WindowKind::Smoothing)?),
        "anomalies" | "anomaly" => Command::Anomalies(parse_toggle(rest, WindowKind::Anomaly)?),
        "update" => Command::Update,
        "reset" => Command::Reset,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(GraphError::InvalidCommand(format!(
                "unknown command '{other}', type 'help' for a list"
            )))
        }
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_toggles() {
        assert_eq!(
            parse_command("smooth on 15").unwrap(),
            Some(Command::Smooth(Some(15)))
        );
        assert_eq!(
            parse_command("anomalies off").unwrap(),
            Some(Command::Anomalies(None))
        );
    }

    #[test]
    fn non_integer_window_is_rejected() {
        assert!(matches!(
            parse_command("smooth on 2.5"),
            Err(GraphError::InvalidWindowValue(_))
        ));
        assert!(matches!(
            parse_window("-3", WindowKind::Anomaly),
            Err(GraphError::InvalidWindowValue(_))
        ));
    }

    #[test]
    fn parses_date_selectors() {
        let expected = NaiveDate::from_ymd_opt(2016, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .unwrap();
        assert_eq!(
            parse_command("start 2016-06-01 12:30:00").unwrap(),
            Some(Command::Start(expected))
        );
        assert!(matches!(
            parse_command("end tomorrow"),
            Err(GraphError::FormatError(_))
        ));
    }

    #[test]
    fn load_keeps_spaces_in_path() {
        assert_eq!(
            parse_command("load my results.csv").unwrap(),
            Some(Command::Load(PathBuf::from("my results.csv")))
        );
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert!(matches!(
            parse_command("zoom 3"),
            Err(GraphError::InvalidCommand(_))
        ));
    }
}

// src/controls.rs
