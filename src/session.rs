// src/session.rs

//! Owned state of one grapher session and the handlers that change it.
//!
//! The session holds at most one loaded dataset. Loading a file replaces it
//! entirely. Every handler either succeeds or leaves the previous state in
//! place, and `handle` turns failures into status messages.

use chrono::{Duration, NaiveDateTime};
use log::{info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{DATE_FORMAT, OUTPUT_FILE_SUFFIX};
use crate::controls::{Command, WindowKind, HELP_TEXT};
use crate::data_analysis::{anomaly_bands, filter_time_range, moving_average, AnomalyBand, SeverityTier};
use crate::data_input::{load_results_file, PowerData};
use crate::error::{GraphError, GraphResult};
use crate::plot_framework::ResultsCanvas;

/// Range selectors and option toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub smoothing_enabled: bool,
    pub smoothing_window: usize,
    pub anomalies_enabled: bool,
    pub anomaly_window: usize,
}

impl ViewOptions {
    /// Effective smoothing window; 0 when the toggle is off.
    pub fn smoothing(&self) -> usize {
        if self.smoothing_enabled {
            self.smoothing_window
        } else {
            0
        }
    }

    /// Effective anomaly window; 0 when the toggle is off.
    pub fn anomalies(&self) -> usize {
        if self.anomalies_enabled {
            self.anomaly_window
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// A transient message for the user, the equivalent of a status bar line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(err: &GraphError) -> Self {
        Self {
            level: StatusLevel::Error,
            text: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// What the last update put on the canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSummary {
    pub samples: usize,
    pub smoothing_window: usize,
    pub low_bands: usize,
    pub medium_bands: usize,
    pub high_bands: usize,
}

impl FrameSummary {
    pub fn band_count(&self) -> usize {
        self.low_bands + self.medium_bands + self.high_bands
    }
}

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(StatusMessage),
    Quit,
}

pub struct GraphSession {
    output_dir: Option<PathBuf>,
    file_path: Option<PathBuf>,
    dataset: Option<PowerData>,
    options: ViewOptions,
    max_window: usize,
    canvas: ResultsCanvas,
    bands: Vec<AnomalyBand>,
}

impl GraphSession {
    /// Creates an empty session. Without an output directory graphs are
    /// computed but never written to disk.
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self {
            output_dir,
            file_path: None,
            dataset: None,
            options: ViewOptions::default(),
            max_window: 0,
            canvas: ResultsCanvas::new(),
            bands: Vec::new(),
        }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn dataset(&self) -> Option<&PowerData> {
        self.dataset.as_ref()
    }

    pub fn canvas(&self) -> &ResultsCanvas {
        &self.canvas
    }

    pub fn bands(&self) -> &[AnomalyBand] {
        &self.bands
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Largest window the loaded file allows (one less than its sample count).
    pub fn max_window(&self) -> usize {
        self.max_window
    }

    /// Loads `path`, replacing any current dataset, resets both option
    /// toggles and the range selectors, then updates the graph.
    /// On failure the previous dataset stays loaded.
    pub fn load_file(&mut self, path: &Path) -> GraphResult<FrameSummary> {
        let data = load_results_file(path)?;

        self.options = ViewOptions {
            start: data.first_time(),
            end: default_end(&data),
            ..ViewOptions::default()
        };
        self.max_window = data.len().saturating_sub(1);
        self.file_path = Some(path.to_path_buf());
        self.dataset = Some(data);
        self.canvas.clear_spans();
        self.bands.clear();

        self.update_graph()
    }

    fn require_data(&self) -> GraphResult<&PowerData> {
        self.dataset.as_ref().ok_or(GraphError::NoDataLoaded)
    }

    pub fn set_start(&mut self, start: NaiveDateTime) -> GraphResult<()> {
        self.require_data()?;
        self.options.start = Some(start);
        Ok(())
    }

    pub fn set_end(&mut self, end: NaiveDateTime) -> GraphResult<()> {
        self.require_data()?;
        self.options.end = Some(end);
        Ok(())
    }

    fn check_window(&self, window: usize, kind: WindowKind) -> GraphResult<()> {
        if window > self.max_window {
            return Err(GraphError::InvalidWindowValue(format!(
                "{} window must be between 0 and {}, got {}.",
                kind.name(),
                self.max_window,
                window
            )));
        }
        Ok(())
    }

    /// Smoothing toggle. Turning it off resets the window to 0.
    pub fn set_smoothing(&mut self, enabled: bool, window: usize) -> GraphResult<()> {
        self.require_data()?;
        if enabled {
            self.check_window(window, WindowKind::Smoothing)?;
            self.options.smoothing_window = window;
        } else {
            self.options.smoothing_window = 0;
        }
        self.options.smoothing_enabled = enabled;
        Ok(())
    }

    /// Anomaly toggle. Turning it off resets the window to 0.
    pub fn set_anomalies(&mut self, enabled: bool, window: usize) -> GraphResult<()> {
        self.require_data()?;
        if enabled {
            self.check_window(window, WindowKind::Anomaly)?;
            self.options.anomaly_window = window;
        } else {
            self.options.anomaly_window = 0;
        }
        self.options.anomalies_enabled = enabled;
        Ok(())
    }

    /// Recomputes the displayed data from the loaded dataset and the current
    /// options. Bands are replaced wholesale, or cleared when the anomaly
    /// toggle is off.
    pub fn update_graph(&mut self) -> GraphResult<FrameSummary> {
        let data = self.dataset.as_ref().ok_or(GraphError::NoDataLoaded)?;
        info!("Updating. Please wait...");

        let filtered = match (self.options.start, self.options.end) {
            (Some(start), Some(end)) => filter_time_range(data, start, end),
            _ => data.clone(),
        };
        if filtered.is_empty() {
            warn!("No samples fall within the selected range");
        }

        let smoothing_window = self.options.smoothing();
        if smoothing_window > 0 {
            self.canvas.update_data(
                &filtered.times,
                &moving_average(&filtered.target, smoothing_window),
                &moving_average(&filtered.prediction, smoothing_window),
            );
        } else {
            self.canvas
                .update_data(&filtered.times, &filtered.target, &filtered.prediction);
        }

        let anomaly_window = self.options.anomalies();
        self.bands = match (&filtered.anomalies, anomaly_window) {
            (Some(anomalies), window) if window > 0 => {
                anomaly_bands(anomalies, &filtered.times, window)
            }
            (None, window) if window > 0 => {
                warn!("File has no anomaly column; no anomaly bands to show");
                Vec::new()
            }
            _ => Vec::new(),
        };
        self.canvas.set_spans(&self.bands);

        let count = |tier: SeverityTier| self.bands.iter().filter(|b| b.tier == tier).count();
        Ok(FrameSummary {
            samples: filtered.len(),
            smoothing_window,
            low_bands: count(SeverityTier::Low),
            medium_bands: count(SeverityTier::Medium),
            high_bands: count(SeverityTier::High),
        })
    }

    /// Turns both toggles off and restores the full range.
    pub fn reset_options(&mut self) -> GraphResult<FrameSummary> {
        let data = self.require_data()?;
        self.options = ViewOptions {
            start: data.first_time(),
            end: default_end(data),
            ..ViewOptions::default()
        };
        self.canvas.clear_spans();
        self.update_graph()
    }

    /// Path the rendered image is written to, if rendering is enabled.
    pub fn output_path(&self) -> Option<PathBuf> {
        let dir = self.output_dir.as_ref()?;
        let stem = self
            .file_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "results".to_string());
        Some(dir.join(format!("{stem}{OUTPUT_FILE_SUFFIX}")))
    }

    /// Writes the current canvas to the output image. Returns the written
    /// path, or `None` when rendering is disabled.
    pub fn save_graph(&self) -> GraphResult<Option<PathBuf>> {
        self.require_data()?;
        let path = match self.output_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        let title = self
            .file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.canvas.render(&path, &title)?;
        Ok(Some(path))
    }

    fn redraw(&mut self) -> GraphResult<String> {
        let summary = self.update_graph()?;
        let saved = self.save_graph()?;
        Ok(describe_frame(&summary, saved.as_deref()))
    }

    /// Runs one command. Errors are returned to the caller.
    pub fn execute(&mut self, command: Command) -> GraphResult<Outcome> {
        let text = match command {
            Command::Load(path) => {
                let summary = self.load_file(&path)?;
                let saved = self.save_graph()?;
                describe_frame(&summary, saved.as_deref())
            }
            Command::Start(start) => {
                self.set_start(start)?;
                format!("Start date set to {}", start.format(DATE_FORMAT))
            }
            Command::End(end) => {
                self.set_end(end)?;
                format!("End date set to {}", end.format(DATE_FORMAT))
            }
            Command::Smooth(window) => {
                self.set_smoothing(window.is_some(), window.unwrap_or(0))?;
                match window {
                    Some(w) => format!("Smoothing enabled ({w} minutes)"),
                    None => "Smoothing disabled".to_string(),
                }
            }
            Command::Anomalies(window) => {
                self.set_anomalies(window.is_some(), window.unwrap_or(0))?;
                match window {
                    Some(w) => format!("Anomaly bands enabled ({w} minutes)"),
                    None => "Anomaly bands disabled".to_string(),
                }
            }
            Command::Update => self.redraw()?,
            Command::Reset => {
                let summary = self.reset_options()?;
                let saved = self.save_graph()?;
                describe_frame(&summary, saved.as_deref())
            }
            Command::Status => self.describe(),
            Command::Help => HELP_TEXT.to_string(),
            Command::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Continue(StatusMessage::info(text)))
    }

    /// Runs one command, turning any error into an error status message.
    pub fn handle(&mut self, command: Command) -> Outcome {
        match self.execute(command) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("{} ({})", err, err.kind());
                Outcome::Continue(StatusMessage::error(&err))
            }
        }
    }

    /// One-paragraph description of the loaded file and options.
    pub fn describe(&self) -> String {
        let data = match &self.dataset {
            Some(data) => data,
            None => return "No results file loaded.".to_string(),
        };
        let fmt_time = |t: Option<NaiveDateTime>| {
            t.map(|t| t.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        format!(
            "File: {}\nSamples: {} ({} anomalies)\nRange: {} .. {}\nSmoothing: {}\nAnomaly bands: {}",
            self.file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            data.len(),
            data.anomaly_count(),
            fmt_time(self.options.start),
            fmt_time(self.options.end),
            toggle_text(self.options.smoothing_enabled, self.options.smoothing_window),
            toggle_text(self.options.anomalies_enabled, self.options.anomaly_window),
        )
    }
}

/// One second past the last sample so the exclusive end keeps it. Saturates
/// at the last representable time.
fn default_end(data: &PowerData) -> Option<NaiveDateTime> {
    data.last_time().map(|t| {
        t.checked_add_signed(Duration::seconds(1))
            .unwrap_or(NaiveDateTime::MAX)
    })
}

fn toggle_text(enabled: bool, window: usize) -> String {
    if enabled {
        format!("on ({window} minutes)")
    } else {
        "off".to_string()
    }
}

fn describe_frame(summary: &FrameSummary, saved: Option<&Path>) -> String {
    let mut text = format!("Graphing complete: {} samples", summary.samples);
    if summary.smoothing_window > 0 {
        text.push_str(&format!(", smoothed over {}", summary.smoothing_window));
    }
    if summary.band_count() > 0 {
        text.push_str(&format!(
            ", anomaly bands {} {} / {} {} / {} {}",
            summary.low_bands,
            SeverityTier::Low.label(),
            summary.medium_bands,
            SeverityTier::Medium.label(),
            summary.high_bands,
            SeverityTier::High.label(),
        ));
    }
    if let Some(path) = saved {
        text.push_str(&format!(", saved to '{}'", path.display()));
    }
    text.push('.');
    text
}

// src/session.rs
