// src/plot_framework.rs

use chrono::{DateTime, Duration, NaiveDateTime};
use log::{debug, info};
use ndarray::Array1;
use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{PathElement, Rectangle, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use crate::constants::{
    BAND_OPACITY, COLOR_ERROR, COLOR_PREDICTION, COLOR_TARGET, DATE_FORMAT,
    DEGENERATE_RANGE_PADDING, FONT_SIZE_AXIS_LABEL, FONT_SIZE_CHART_TITLE, FONT_SIZE_LEGEND,
    FONT_SIZE_MAIN_TITLE, FONT_SIZE_MESSAGE, LINE_WIDTH_ERROR, LINE_WIDTH_LEGEND,
    LINE_WIDTH_PLOT, PLOT_HEIGHT, PLOT_WIDTH, POWER_Y_HEADROOM, WATTS_PER_KILOWATT, X_AXIS_TICKS,
    Y_AXIS_TICKS,
};
use crate::data_analysis::AnomalyBand;
use crate::error::{GraphError, GraphResult};

/// Seconds since the Unix epoch, used as the numeric x coordinate.
pub fn to_plot_seconds(time: NaiveDateTime) -> f64 {
    time.and_utc().timestamp_millis() as f64 / 1000.0
}

/// Formats an x coordinate back into a date-time tick label.
pub fn format_time_label(x: &f64) -> String {
    let millis = (x * 1000.0).round() as i64;
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc().format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Widens a range whose ends coincide so that it can be drawn.
pub fn widen_degenerate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    if (max - min).abs() < 1e-9 {
        (min - DEGENERATE_RANGE_PADDING, max + DEGENERATE_RANGE_PADDING)
    } else {
        (min, max)
    }
}

/// Axis bounds for the power and error charts.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisBounds {
    pub x: Range<f64>,
    pub power_y: Range<f64>,
    pub error_y: Range<f64>,
}

impl AxisBounds {
    /// Power y-min is fixed at 0 and y-max is `POWER_Y_HEADROOM` times the
    /// largest target or prediction. Error bounds are the min and max of
    /// `prediction - target`. Returns `None` for empty input, or when any
    /// value or bound is not finite.
    pub fn from_series(times: &[f64], target: &[f64], prediction: &[f64]) -> Option<Self> {
        if times.is_empty() || target.is_empty() || prediction.is_empty() {
            return None;
        }

        if times.iter().chain(target).chain(prediction).any(|v| !v.is_finite()) {
            return None;
        }

        let x_min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (x_min, x_max) = widen_degenerate_range(x_min, x_max);

        let peak = target
            .iter()
            .chain(prediction.iter())
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let power_max = peak * POWER_Y_HEADROOM;
        let power_max = if power_max > 0.0 {
            power_max
        } else {
            DEGENERATE_RANGE_PADDING
        };

        let (err_min, err_max) = target
            .iter()
            .zip(prediction.iter())
            .map(|(t, p)| p - t)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
                (lo.min(e), hi.max(e))
            });
        let (err_min, err_max) = widen_degenerate_range(err_min, err_max);

        // Large finite inputs can still overflow to inf after headroom or subtraction.
        if ![power_max, err_min, err_max].iter().all(|v| v.is_finite()) {
            return None;
        }

        Some(Self {
            x: x_min..x_max,
            power_y: 0.0..power_max,
            error_y: err_min..err_max,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PlotSeries {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
}

/// A translucent vertical band spanning the full y range.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeBand {
    pub start: f64,
    pub end: f64,
    pub color: RGBColor,
    pub opacity: f64, // 0.0 to 1.0
}

#[derive(Clone, Debug)]
pub struct TimePlotConfig {
    pub title: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub series: Vec<PlotSeries>,
    pub y_label: String,
    pub bands: Vec<TimeBand>,
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    plot_type: &str,
    reason: &str,
) -> Result<(), Box<dyn Error>> {
    const CHAR_WIDTH_RATIO: f32 = 0.6; // Approximate character width relative to font size

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (
        (x_range.end - x_range.start) as u32,
        (y_range.end - y_range.start) as u32,
    );
    let message = format!("{plot_type} Data Unavailable: {reason}");

    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_text_width = (message.len() as i32).saturating_mul(estimated_char_width);

    let center_x = width as i32 / 2 - estimated_text_width / 2;
    let center_y = height as i32 / 2 - FONT_SIZE_MESSAGE / 2;

    let text_style = ("sans-serif", FONT_SIZE_MESSAGE).into_font().color(&RED);
    area.draw(&Text::new(message, (center_x, center_y), text_style))?;
    Ok(())
}

/// Draws one time-series chart. Bands go under the series so the lines stay visible.
fn draw_time_series_chart(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    config: &TimePlotConfig,
) -> Result<(), Box<dyn Error>> {
    let mut chart = ChartBuilder::on(area)
        .caption(&config.title, ("sans-serif", FONT_SIZE_CHART_TITLE))
        .margin(5)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(config.x_range.clone(), config.y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc(&config.y_label)
        .x_labels(X_AXIS_TICKS)
        .y_labels(Y_AXIS_TICKS)
        .x_label_formatter(&format_time_label)
        .y_label_formatter(&|y| format!("{y:.1}"))
        .light_line_style(WHITE.mix(0.7))
        .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
        .draw()?;

    for band in &config.bands {
        // Keep the band within the plotted X range
        let start = band.start.max(config.x_range.start);
        let end = band.end.min(config.x_range.end);
        if end <= start {
            continue;
        }
        chart.draw_series(std::iter::once(Rectangle::new(
            [(start, config.y_range.start), (end, config.y_range.end)],
            band.color.mix(band.opacity).filled(),
        )))?;
    }

    let mut legend_series_count = 0;
    for s in config.series.iter().filter(|s| !s.data.is_empty()) {
        let series = chart.draw_series(LineSeries::new(
            s.data.iter().cloned(),
            s.color.stroke_width(s.stroke_width),
        ))?;

        if !s.label.is_empty() {
            series.label(&s.label).legend(move |(x, y)| {
                PathElement::new(
                    vec![(x, y), (x + 20, y)],
                    s.color.stroke_width(LINE_WIDTH_LEGEND),
                )
            });
            legend_series_count += 1;
        }
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", FONT_SIZE_LEGEND))
            .draw()?;
    }

    Ok(())
}

/// Creates a plot image with the given charts stacked vertically.
/// A `None` chart is replaced by a "Data Unavailable" message.
pub fn draw_stacked_time_plot(
    output_path: &Path,
    root_name: &str,
    charts: &[(&str, Option<TimePlotConfig>)],
) -> Result<(), Box<dyn Error>> {
    let root_area = BitMapBackend::new(output_path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;
    root_area.draw(&Text::new(
        root_name,
        (10, 10),
        ("sans-serif", FONT_SIZE_MAIN_TITLE)
            .into_font()
            .color(&BLACK),
    ))?;
    let margined_root_area = root_area.margin(50, 5, 5, 5);
    let sub_plot_areas = margined_root_area.split_evenly((charts.len().max(1), 1));
    let mut any_chart_plotted = false;

    for (area, (plot_type_name, chart)) in sub_plot_areas.iter().zip(charts) {
        match chart {
            Some(config) => {
                let has_data = config.series.iter().any(|s| !s.data.is_empty());
                let valid_ranges = config.x_range.end > config.x_range.start
                    && config.y_range.end > config.y_range.start;
                if has_data && valid_ranges {
                    draw_time_series_chart(area, config)?;
                    any_chart_plotted = true;
                } else {
                    let reason = if !has_data {
                        "No data points"
                    } else {
                        "Invalid ranges"
                    };
                    draw_unavailable_message(area, plot_type_name, reason)?;
                }
            }
            None => {
                draw_unavailable_message(area, plot_type_name, "No data in selected range")?;
            }
        }
    }

    root_area.present()?;
    if any_chart_plotted {
        info!("Stacked plot saved as '{}'.", output_path.display());
    } else {
        info!(
            "Plot '{}' saved with placeholder messages only: no data in range.",
            output_path.display()
        );
    }
    Ok(())
}

/// Holds the lines, bounds and anomaly bands of the results graph between redraws.
#[derive(Debug, Clone, Default)]
pub struct ResultsCanvas {
    target_line: Vec<(f64, f64)>,
    prediction_line: Vec<(f64, f64)>,
    error_line: Vec<(f64, f64)>,
    bounds: Option<AxisBounds>,
    spans: Vec<TimeBand>,
}

impl ResultsCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all three lines and recomputes the axis bounds.
    /// Power values are given in Watts and displayed in kW.
    pub fn update_data(
        &mut self,
        times: &[NaiveDateTime],
        target: &Array1<f64>,
        prediction: &Array1<f64>,
    ) {
        let len = times.len().min(target.len()).min(prediction.len());
        if len != times.len() || len != target.len() || len != prediction.len() {
            debug!(
                "Series lengths differ ({} times, {} target, {} prediction); using first {}",
                times.len(),
                target.len(),
                prediction.len(),
                len
            );
        }

        let xs: Vec<f64> = times[..len].iter().copied().map(to_plot_seconds).collect();
        let target_kw: Vec<f64> = target.iter().take(len).map(|w| w / WATTS_PER_KILOWATT).collect();
        let prediction_kw: Vec<f64> = prediction
            .iter()
            .take(len)
            .map(|w| w / WATTS_PER_KILOWATT)
            .collect();

        self.bounds = AxisBounds::from_series(&xs, &target_kw, &prediction_kw);
        self.target_line = xs.iter().copied().zip(target_kw.iter().copied()).collect();
        self.prediction_line = xs.iter().copied().zip(prediction_kw.iter().copied()).collect();
        self.error_line = xs
            .iter()
            .zip(target_kw.iter().zip(prediction_kw.iter()))
            .map(|(&x, (t, p))| (x, p - t))
            .collect();
    }

    /// Adds a translucent vertical band to the power chart. A band running
    /// past the last representable time ends there.
    pub fn color_span(&mut self, start: NaiveDateTime, duration_minutes: usize, color: RGBColor) {
        let end = i64::try_from(duration_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .and_then(|d| start.checked_add_signed(d))
            .unwrap_or(NaiveDateTime::MAX);
        self.spans.push(TimeBand {
            start: to_plot_seconds(start),
            end: to_plot_seconds(end),
            color,
            opacity: BAND_OPACITY,
        });
    }

    pub fn clear_spans(&mut self) {
        self.spans.clear();
    }

    /// Replaces every band with the drawable ones from `bands`.
    pub fn set_spans(&mut self, bands: &[AnomalyBand]) {
        self.clear_spans();
        for band in bands {
            if let Some(color) = band.tier.color() {
                self.color_span(band.start, band.duration_minutes, color);
            }
        }
    }

    pub fn spans(&self) -> &[TimeBand] {
        &self.spans
    }

    pub fn bounds(&self) -> Option<&AxisBounds> {
        self.bounds.as_ref()
    }

    pub fn sample_count(&self) -> usize {
        self.target_line.len()
    }

    pub fn error_line(&self) -> &[(f64, f64)] {
        &self.error_line
    }

    /// Chart configurations for the power and error plots, `None` when empty.
    pub fn plot_configs(&self) -> (Option<TimePlotConfig>, Option<TimePlotConfig>) {
        let bounds = match &self.bounds {
            Some(bounds) => bounds,
            None => return (None, None),
        };

        let power = TimePlotConfig {
            title: "Actual vs Predicted Power".to_string(),
            x_range: bounds.x.clone(),
            y_range: bounds.power_y.clone(),
            series: vec![
                PlotSeries {
                    data: self.target_line.clone(),
                    label: "Actual Value".to_string(),
                    color: *COLOR_TARGET,
                    stroke_width: LINE_WIDTH_PLOT,
                },
                PlotSeries {
                    data: self.prediction_line.clone(),
                    label: "Predicted Value".to_string(),
                    color: *COLOR_PREDICTION,
                    stroke_width: LINE_WIDTH_PLOT,
                },
            ],
            y_label: "Power (kW)".to_string(),
            bands: self.spans.clone(),
        };

        let error = TimePlotConfig {
            title: "Prediction Error".to_string(),
            x_range: bounds.x.clone(),
            y_range: bounds.error_y.clone(),
            series: vec![PlotSeries {
                data: self.error_line.clone(),
                label: String::new(),
                color: *COLOR_ERROR,
                stroke_width: LINE_WIDTH_ERROR,
            }],
            y_label: "Error (kW)".to_string(),
            bands: Vec::new(),
        };

        (Some(power), Some(error))
    }

    /// Renders both charts to a PNG image at `output_path`.
    pub fn render(&self, output_path: &Path, title: &str) -> GraphResult<()> {
        let (power, error) = self.plot_configs();
        draw_stacked_time_plot(output_path, title, &[("Power", power), ("Error", error)])
            .map_err(|e| GraphError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_analysis::SeverityTier;
    use chrono::NaiveDate;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    #[test]
    fn power_bounds_start_at_zero_with_headroom() {
        let bounds = AxisBounds::from_series(&[0.0, 60.0], &[1.0, 2.0], &[1.5, 1.0]).unwrap();
        assert_eq!(bounds.x, 0.0..60.0);
        assert_eq!(bounds.power_y.start, 0.0);
        assert!((bounds.power_y.end - 2.2).abs() < 1e-12);
        assert_eq!(bounds.error_y, -1.0..0.5);
    }

    #[test]
    fn degenerate_ranges_are_widened() {
        let bounds = AxisBounds::from_series(&[10.0], &[0.0], &[0.0]).unwrap();
        assert!(bounds.x.end > bounds.x.start);
        assert!(bounds.power_y.end > bounds.power_y.start);
        assert!(bounds.error_y.end > bounds.error_y.start);
    }

    #[test]
    fn empty_series_have_no_bounds() {
        assert!(AxisBounds::from_series(&[], &[], &[]).is_none());
    }

    #[test]
    fn non_finite_series_have_no_bounds() {
        assert!(AxisBounds::from_series(&[0.0, 60.0], &[1.0, f64::INFINITY], &[1.0, 2.0]).is_none());
        assert!(AxisBounds::from_series(&[0.0, 60.0], &[1.0, 2.0], &[f64::NAN, 2.0]).is_none());
        assert!(AxisBounds::from_series(&[0.0, 60.0], &[f64::MAX, 0.0], &[f64::MAX, 0.0]).is_none());
    }

    #[test]
    fn update_converts_watts_to_kilowatts() {
        let mut canvas = ResultsCanvas::new();
        let times = vec![base(), base() + Duration::minutes(1)];
        canvas.update_data(
            &times,
            &Array1::from(vec![9530.0, 8635.0]),
            &Array1::from(vec![9683.0, 9150.0]),
        );
        assert_eq!(canvas.sample_count(), 2);
        let bounds = canvas.bounds().unwrap();
        assert!((bounds.power_y.end - 9.683 * 1.1).abs() < 1e-9);
        assert!((canvas.error_line()[1].1 - 0.515).abs() < 1e-9);
    }

    #[test]
    fn set_spans_replaces_previous_bands() {
        let mut canvas = ResultsCanvas::new();
        let band = |minute: i64, tier| AnomalyBand {
            start: base() + Duration::minutes(minute),
            duration_minutes: 3,
            anomaly_sum: 1.0,
            tier,
        };
        let bands = vec![
            band(0, SeverityTier::Low),
            band(3, SeverityTier::None),
            band(6, SeverityTier::High),
        ];
        canvas.set_spans(&bands);
        canvas.set_spans(&bands);
        assert_eq!(canvas.spans().len(), 2);
        assert_eq!(canvas.spans()[0].end - canvas.spans()[0].start, 180.0);

        canvas.clear_spans();
        assert!(canvas.spans().is_empty());
    }

    #[test]
    fn span_past_last_time_ends_at_max() {
        let mut canvas = ResultsCanvas::new();
        let start = NaiveDateTime::MAX - Duration::minutes(1);
        canvas.color_span(start, 5, RED);
        canvas.color_span(start, usize::MAX, RED);
        assert_eq!(canvas.spans().len(), 2);
        for span in canvas.spans() {
            assert_eq!(span.end, to_plot_seconds(NaiveDateTime::MAX));
            assert!(span.end > span.start);
        }
    }

    #[test]
    fn empty_canvas_has_no_chart_configs() {
        let canvas = ResultsCanvas::new();
        let (power, error) = canvas.plot_configs();
        assert!(power.is_none() && error.is_none());
    }

    #[test]
    fn time_labels_use_date_format() {
        assert_eq!(format_time_label(&to_plot_seconds(base())), "2016-06-01 00:00:00");
    }
}

// src/plot_framework.rs
