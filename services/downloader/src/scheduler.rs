//! Polling scheduler: fetch each new cycle once it should be available.

use std::time::Duration;

use chrono::{DateTime, Utc};
use forecast_common::Cycle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::orchestrator::{FetchError, FetchOrchestrator, FetchReport};

/// Drives a [`FetchOrchestrator`] once or on a fixed polling interval.
pub struct Scheduler {
    orchestrator: FetchOrchestrator,
    poll_interval: Duration,
}

impl Scheduler {
    pub fn new(orchestrator: FetchOrchestrator, poll_interval: Duration) -> Self {
        Self {
            orchestrator,
            poll_interval,
        }
    }

    /// Cycle expected to be available at `now` under the model schedule.
    pub fn current_cycle(&self, now: DateTime<Utc>) -> Cycle {
        self.orchestrator.model().resolve_cycle(now)
    }

    /// Fetch the current cycle once.
    pub async fn run_once(&self, cancel: &CancellationToken) -> Result<FetchReport, FetchError> {
        let cycle = self.current_cycle(Utc::now());
        info!(cycle = %cycle, "Running single fetch cycle");
        self.orchestrator.run(cycle, cancel).await
    }

    /// Poll until cancelled, fetching whenever the resolved cycle differs
    /// from the last one published.
    ///
    /// A failed cycle is retried on the next poll.
    pub async fn run_forever(&self, cancel: CancellationToken) {
        let mut last_published: Option<Cycle> = None;

        loop {
            let cycle = self.current_cycle(Utc::now());

            if last_published == Some(cycle) {
                debug!(cycle = %cycle, "Cycle already published");
            } else {
                match self.orchestrator.run(cycle, &cancel).await {
                    Ok(report) => {
                        info!(
                            cycle = %report.cycle,
                            downloaded = report.downloaded,
                            reused = report.reused,
                            "Published cycle"
                        );
                        last_published = Some(cycle);
                    }
                    Err(e) if cancel.is_cancelled() => {
                        info!(error = %e, "Fetch cycle interrupted by shutdown");
                    }
                    Err(e) => {
                        error!(cycle = %cycle, error = %e, "Scheduled fetch failed");
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutting down scheduler");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}
