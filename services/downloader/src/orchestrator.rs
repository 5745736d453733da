//! Fetch orchestration for one model cycle.
//!
//! Every forecast hour of the cycle becomes a [`DownloadJob`]. Jobs run on a
//! bounded pool and write into a [`StagingDir`]; the staging directory is
//! published only when every job succeeded.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use forecast_common::Cycle;
use futures::stream::{self, StreamExt};
use metrics::counter;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::config::ModelConfig;
use crate::download::{format_size, DownloadError, DownloadManager};
use crate::staging::StagingDir;

/// Errors that fail a whole fetch cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to prepare staging directory: {0}")]
    Staging(#[source] std::io::Error),

    #[error("{failed} of {total} forecast hours failed")]
    FailedHours { failed: usize, total: usize },

    #[error("Failed to publish download set: {0}")]
    Publish(#[source] std::io::Error),
}

/// One forecast hour to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub forecast_hour: u32,
    pub url: String,
    pub file_name: String,
}

/// How a job was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobOutcome {
    Downloaded(u64),
    Reused(u64),
}

impl JobOutcome {
    fn bytes(&self) -> u64 {
        match self {
            JobOutcome::Downloaded(b) | JobOutcome::Reused(b) => *b,
        }
    }
}

/// Summary of a successful fetch cycle.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub cycle: Cycle,
    pub published: PathBuf,
    pub downloaded: usize,
    pub reused: usize,
    pub bytes: u64,
}

/// Fetches and publishes the file set of a cycle.
pub struct FetchOrchestrator {
    manager: Arc<DownloadManager>,
    model: ModelConfig,
    output_dir: PathBuf,
    max_concurrent: usize,
}

impl FetchOrchestrator {
    pub fn new(
        manager: Arc<DownloadManager>,
        model: ModelConfig,
        output_dir: impl Into<PathBuf>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            manager,
            model,
            output_dir: output_dir.into(),
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// One job per configured forecast hour, in horizon order.
    pub fn jobs(&self, cycle: &Cycle) -> Vec<DownloadJob> {
        self.model
            .forecast_hours()
            .into_iter()
            .map(|hour| DownloadJob {
                forecast_hour: hour,
                url: self.model.remote_url(cycle, hour),
                file_name: self.model.file_name(cycle, hour),
            })
            .collect()
    }

    /// Fetch every forecast hour of `cycle` and publish the set.
    ///
    /// On any failure the published directory is left exactly as it was.
    #[instrument(skip_all, fields(cycle = %cycle))]
    pub async fn run(
        &self,
        cycle: Cycle,
        cancel: &CancellationToken,
    ) -> Result<FetchReport, FetchError> {
        let started = Instant::now();
        let staging = StagingDir::create(&self.output_dir).map_err(FetchError::Staging)?;
        let jobs = self.jobs(&cycle);
        let total = jobs.len();

        info!(
            jobs = total,
            workers = self.max_concurrent,
            staging = %staging.path().display(),
            "Starting fetch cycle"
        );

        let staging_path = staging.path();
        let results: Vec<(DownloadJob, Result<JobOutcome, DownloadError>)> = stream::iter(jobs)
            .map(|job| async move {
                let outcome = self.run_job(&job, &cycle, staging_path, cancel).await;
                (job, outcome)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut failed = 0;
        let mut downloaded = 0;
        let mut reused = 0;
        let mut bytes = 0;
        for (job, outcome) in &results {
            match outcome {
                Ok(outcome) => {
                    bytes += outcome.bytes();
                    match outcome {
                        JobOutcome::Downloaded(_) => downloaded += 1,
                        JobOutcome::Reused(_) => reused += 1,
                    }
                }
                Err(DownloadError::Cancelled) => failed += 1,
                Err(e) => {
                    error!(hour = job.forecast_hour, url = %job.url, error = %e, "Forecast hour failed");
                    counter!("downloads_failed_total").increment(1);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            counter!("fetch_cycles_total", "outcome" => "failed").increment(1);
            warn!(failed, total, "Fetch cycle failed, discarding staging directory");
            // dropping `staging` removes it
            return Err(FetchError::FailedHours { failed, total });
        }

        let published = staging.publish().await.map_err(FetchError::Publish)?;
        counter!("fetch_cycles_total", "outcome" => "published").increment(1);
        info!(
            downloaded,
            reused,
            size = %format_size(bytes),
            elapsed_secs = started.elapsed().as_secs(),
            "Fetch cycle complete"
        );

        Ok(FetchReport {
            cycle,
            published,
            downloaded,
            reused,
            bytes,
        })
    }

    async fn run_job(
        &self,
        job: &DownloadJob,
        cycle: &Cycle,
        staging: &Path,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, DownloadError> {
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        let dest = staging.join(&job.file_name);
        let previous = self.output_dir.join(&job.file_name);

        if let Some(size) = self.reusable_size(&previous, cycle).await {
            link_or_copy(&previous, &dest).await?;
            info!(file = %job.file_name, size = %format_size(size), "Reusing published file");
            counter!("downloads_reused_total").increment(1);
            return Ok(JobOutcome::Reused(size));
        }

        let bytes = self.manager.download(&job.url, &dest, cancel).await?;
        counter!("downloads_completed_total").increment(1);
        Ok(JobOutcome::Downloaded(bytes))
    }

    /// Size of a published file that can stand in for a fresh download.
    ///
    /// The file must exceed the minimum size and must not predate the
    /// cycle's reference time; an older file belongs to an earlier run.
    async fn reusable_size(&self, path: &Path, cycle: &Cycle) -> Option<u64> {
        let metadata = tokio::fs::metadata(path).await.ok()?;
        if !metadata.is_file() || metadata.len() <= self.manager.config().min_file_size {
            return None;
        }
        let modified = metadata.modified().ok()?;
        if modified < SystemTime::from(cycle.reference_time()) {
            return None;
        }
        Some(metadata.len())
    }
}

/// Place `from` at `to` without duplicating data where the filesystem allows.
async fn link_or_copy(from: &Path, to: &Path) -> Result<(), DownloadError> {
    if tokio::fs::hard_link(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|e| DownloadError::io(to, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::DownloadConfig;
    use chrono::NaiveDate;

    fn orchestrator() -> FetchOrchestrator {
        let mut model = ModelConfig::gfs_default();
        model.schedule.forecast_hours.end = 6;
        model.schedule.forecast_hours.step = 3;
        let manager = Arc::new(DownloadManager::new(DownloadConfig::default()).unwrap());
        FetchOrchestrator::new(manager, model, "/data/gfs_data", 0)
    }

    #[test]
    fn test_jobs_follow_horizon() {
        let orchestrator = orchestrator();
        let cycle = Cycle::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 18);
        let jobs = orchestrator.jobs(&cycle);

        let hours: Vec<u32> = jobs.iter().map(|j| j.forecast_hour).collect();
        assert_eq!(hours, vec![0, 3, 6]);
        assert_eq!(jobs[1].file_name, "gfs.t18z.pgrb2.0p25.f003");
        assert!(jobs[1].url.ends_with("/gfs.20240501/18/atmos/gfs.t18z.pgrb2.0p25.f003"));
    }

    #[test]
    fn test_pool_width_at_least_one() {
        assert_eq!(orchestrator().max_concurrent, 1);
    }

    #[test]
    fn test_fetch_error_display() {
        let e = FetchError::FailedHours { failed: 2, total: 25 };
        assert_eq!(e.to_string(), "2 of 25 forecast hours failed");
    }
}
