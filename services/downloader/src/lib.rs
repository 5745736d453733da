//! GFS grid file downloader.
//!
//! Fetches the per-forecast-hour files of a model cycle with bounded
//! concurrency and per-file retry, assembles them in a staging directory and
//! publishes the complete set with a directory rename. Readers of the
//! published directory see either the previous cycle or the new one, never a
//! mixture.

pub mod config;
pub mod download;
pub mod orchestrator;
pub mod scheduler;
pub mod staging;

pub use config::ModelConfig;
pub use download::{format_size, DownloadConfig, DownloadError, DownloadManager};
pub use orchestrator::{DownloadJob, FetchError, FetchOrchestrator, FetchReport};
pub use scheduler::Scheduler;
pub use staging::StagingDir;
