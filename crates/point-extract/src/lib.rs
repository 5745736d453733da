//! Point forecast extraction.
//!
//! Reads the grid files published by the downloader, decodes the forecast
//! fields at a coordinate through an external decoder and merges the
//! per-file results into a single series ordered by valid time.

pub mod decoder;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod merge;

pub use decoder::{Field, PointDecoder, Wgrib2Decoder};
pub use engine::{EngineConfig, ForecastEngine};
pub use error::{DecodeError, EngineError};
pub use merge::ForecastMerger;
