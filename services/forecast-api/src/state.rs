//! Application state for the forecast API.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use point_extract::{EngineConfig, ForecastEngine, PointDecoder, Wgrib2Decoder};
use tracing::info;

use crate::config::ApiConfig;

/// Shared application state.
pub struct AppState {
    pub engine: ForecastEngine,

    /// Prometheus exporter, when installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state backed by the wgrib2 decoder named in `config`.
    ///
    /// Fails when the decoder cannot be run.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let decoder = Wgrib2Decoder::new(&config.wgrib2);
        decoder
            .check_available()
            .context("Grid decoder unavailable")?;
        info!(binary = %decoder.binary().display(), "Grid decoder available");

        Ok(Self::with_decoder(config.engine_config(), Arc::new(decoder)))
    }

    /// Build state around any decoder.
    pub fn with_decoder(config: EngineConfig, decoder: Arc<dyn PointDecoder>) -> Self {
        Self {
            engine: ForecastEngine::new(config, decoder),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.engine.config().data_dir
    }
}
