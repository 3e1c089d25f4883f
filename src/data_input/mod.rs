// src/data_input/mod.rs

pub mod power_data;
pub mod results_parser;

pub use power_data::PowerData;
pub use results_parser::{check_filename, load_results_file, parse_results, parse_timestamps};

// src/data_input/mod.rs
