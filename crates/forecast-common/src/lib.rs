//! Common types and utilities shared by the downloader and the forecast API.

pub mod cycle;
pub mod error;
pub mod filename;
pub mod forecast;
pub mod grid_file;
pub mod units;

pub use cycle::Cycle;
pub use error::{ForecastError, ForecastResult};
pub use forecast::{render_table, Coordinate, FieldSample, ForecastPoint};
pub use grid_file::GridFile;
