// src/lib.rs - Library interface for internal module access

pub mod constants;
pub mod controls;
pub mod data_analysis;
pub mod data_input;
pub mod error;
pub mod plot_framework;
pub mod session;

pub use error::{GraphError, GraphResult};
pub use session::GraphSession;

/// Package version from Cargo.toml.
pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
