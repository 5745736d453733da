//! Extraction and aggregation engine.
//!
//! A query runs in four phases:
//! 1. discover the published grid files,
//! 2. decode each file at the coordinate on a bounded worker pool,
//! 3. collect the per-file results once every worker has finished,
//! 4. derive forecast units and merge into one series ordered by valid time.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use forecast_common::{cycle, filename, Coordinate, Cycle, FieldSample, ForecastPoint, GridFile};
use futures::stream::{self, StreamExt};
use metrics::{counter, histogram};
use tracing::{debug, info, instrument, warn};

use crate::decoder::PointDecoder;
use crate::discovery;
use crate::error::{DecodeError, EngineError, Result};
use crate::merge::ForecastMerger;

/// Configuration for the extraction engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Published directory written by the downloader
    pub data_dir: PathBuf,
    /// Grid resolution token in file names
    pub resolution: String,
    /// Concurrent decoder invocations. Higher values finish queries sooner
    /// at the cost of more simultaneous decoder processes.
    pub max_workers: usize,
    /// Daily run hours of the model
    pub cycles: Vec<u32>,
    /// Hours after a run starts before its files are published
    pub delay_hours: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./gfs_data"),
            resolution: filename::DEFAULT_RESOLUTION.to_string(),
            max_workers: 4,
            cycles: cycle::GFS_CYCLES.to_vec(),
            delay_hours: cycle::GFS_AVAILABILITY_DELAY_HOURS,
        }
    }
}

/// Outcome of decoding one file.
type Extraction = (GridFile, std::result::Result<FieldSample, DecodeError>);

/// Builds point forecasts from the published grid files.
pub struct ForecastEngine {
    config: EngineConfig,
    decoder: Arc<dyn PointDecoder>,
}

impl ForecastEngine {
    pub fn new(config: EngineConfig, decoder: Arc<dyn PointDecoder>) -> Self {
        Self { config, decoder }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Forecast from the published files as of now.
    pub async fn forecast(&self, coord: Coordinate) -> Result<Vec<ForecastPoint>> {
        self.forecast_at(Utc::now(), coord).await
    }

    /// Forecast from the published files as of `now`.
    pub async fn forecast_at(
        &self,
        now: DateTime<Utc>,
        coord: Coordinate,
    ) -> Result<Vec<ForecastPoint>> {
        let latest = Cycle::resolve(now, &self.config.cycles, self.config.delay_hours);
        self.forecast_for_cycle(latest, coord).await
    }

    /// Forecast dating the published files against `latest`, the most
    /// recent run expected to be published.
    #[instrument(skip(self), fields(latest = %latest, lon = coord.lon, lat = coord.lat))]
    pub async fn forecast_for_cycle(
        &self,
        latest: Cycle,
        coord: Coordinate,
    ) -> Result<Vec<ForecastPoint>> {
        let started = Instant::now();
        let files = discovery::discover(&self.config.data_dir, &self.config.resolution, &latest)?;

        if files.is_empty() {
            info!(dir = %self.config.data_dir.display(), "No published grid files");
            return Ok(Vec::new());
        }

        let discovered = files.len();
        let extractions = self.extract_all(files, coord).await;

        if let Some(reason) = decoder_unavailable(&extractions) {
            counter!("extractions_total", "outcome" => "failed").increment(discovered as u64);
            return Err(EngineError::DecoderUnavailable {
                files: discovered,
                reason,
            });
        }

        let mut merger = ForecastMerger::new();
        for (file, outcome) in extractions {
            let sample = match outcome {
                Ok(sample) if sample.is_finite() => sample,
                Ok(sample) => {
                    warn!(file = %file.file_name(), ?sample, "Discarding non-finite sample");
                    counter!("extractions_total", "outcome" => "invalid").increment(1);
                    continue;
                }
                Err(e) => {
                    warn!(file = %file.file_name(), error = %e, "Skipping grid file");
                    counter!("extractions_total", "outcome" => "failed").increment(1);
                    continue;
                }
            };
            counter!("extractions_total", "outcome" => "ok").increment(1);

            let point = ForecastPoint::from_sample(file.valid_time, &sample);
            if !merger.insert(file.forecast_hour, point) {
                debug!(
                    file = %file.file_name(),
                    "Valid time already covered by a longer lead, dropping"
                );
            }
        }

        let points = merger.into_points();
        histogram!("forecast_query_duration_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        info!(
            files = discovered,
            points = points.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Forecast assembled"
        );
        Ok(points)
    }

    /// Decode every file on a pool of `max_workers` and gather the results.
    async fn extract_all(&self, files: Vec<GridFile>, coord: Coordinate) -> Vec<Extraction> {
        let workers = self.config.max_workers.max(1);

        stream::iter(files)
            .map(|file| {
                let decoder = Arc::clone(&self.decoder);
                async move {
                    let path = file.path.clone();
                    let outcome =
                        tokio::task::spawn_blocking(move || decoder.extract(&path, coord)).await;
                    let outcome = match outcome {
                        Ok(result) => result,
                        Err(join_error) => Err(DecodeError::Exit {
                            status: "worker aborted".to_string(),
                            stderr: join_error.to_string(),
                        }),
                    };
                    (file, outcome)
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await
    }
}

/// The spawn failure, when the decoder could not be started for any file.
fn decoder_unavailable(extractions: &[Extraction]) -> Option<String> {
    let mut reason = None;
    for (_, outcome) in extractions {
        match outcome {
            Err(e @ DecodeError::Spawn { .. }) => reason = Some(e.to_string()),
            _ => return None,
        }
    }
    reason
}
