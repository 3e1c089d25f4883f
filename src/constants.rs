// src/constants.rs

// Import specific colors needed
use plotters::style::colors::full_palette::{GREEN, ORANGE, RED};
use plotters::style::colors::{BLACK, BLUE};
use plotters::style::RGBColor;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1920;
pub const PLOT_HEIGHT: u32 = 1080;

// Fixed textual timestamp format accepted by the loader and used for axis labels.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Expected CSV header names (column order is positional, names are informational).
pub const COLUMN_TIMESTAMP: &str = "Timestamp";
pub const COLUMN_TARGET: &str = "Target";
pub const COLUMN_PREDICTION: &str = "Prediction";
pub const COLUMN_ANOMALY: &str = "Anomaly";

// Anomaly flag value that marks a sample as anomalous. Band sums add the raw
// values, so for 0/1 flags a bucket sum is its count of flagged samples.
pub const ANOMALY_FLAG: f64 = 1.0;

// Power values arrive in Watts and are plotted in kW.
pub const WATTS_PER_KILOWATT: f64 = 1000.0;

// Power plot y-max is this factor times the largest target/prediction value.
pub const POWER_Y_HEADROOM: f64 = 1.1;

// Padding applied when a range collapses to a single value.
pub const DEGENERATE_RANGE_PADDING: f64 = 0.5;

// Number of date-time labels on each x axis.
pub const X_AXIS_TICKS: usize = 7;
pub const Y_AXIS_TICKS: usize = 10;

// --- Plot Color Assignments ---
pub const COLOR_PREDICTION: &RGBColor = &BLACK;
pub const COLOR_TARGET: &RGBColor = &BLUE;
pub const COLOR_ERROR: &RGBColor = &RED;
pub const COLOR_TIER_LOW: &RGBColor = &GREEN;
pub const COLOR_TIER_MEDIUM: &RGBColor = &ORANGE;
pub const COLOR_TIER_HIGH: &RGBColor = &RED;

// Opacity of anomaly bands drawn behind the power lines.
pub const BAND_OPACITY: f64 = 0.2;

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 2;
pub const LINE_WIDTH_ERROR: u32 = 1;
pub const LINE_WIDTH_LEGEND: u32 = 2;

// Font sizes
pub const FONT_SIZE_MAIN_TITLE: i32 = 24;
pub const FONT_SIZE_CHART_TITLE: i32 = 20;
pub const FONT_SIZE_AXIS_LABEL: i32 = 14;
pub const FONT_SIZE_LEGEND: i32 = 16;
pub const FONT_SIZE_MESSAGE: i32 = 18;

// Suffix of the rendered image, appended to the input file stem.
pub const OUTPUT_FILE_SUFFIX: &str = "_results.png";

// src/constants.rs
