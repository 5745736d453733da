//! Discovery of published grid files.

use std::path::Path;

use forecast_common::{filename, Cycle, GridFile};
use tracing::debug;

use crate::error::{EngineError, Result};

/// List the published grid files of `resolution` in `dir`, ordered by
/// forecast hour.
///
/// Each file is dated against `latest`, the most recent run expected to be
/// published. A missing directory means nothing has been published yet and
/// yields an empty list. Names the filename codec rejects are skipped.
pub fn discover(dir: &Path, resolution: &str, latest: &Cycle) -> Result<Vec<GridFile>> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "Published directory does not exist yet");
        return Ok(Vec::new());
    }

    // Surface permission problems instead of an empty glob.
    std::fs::read_dir(dir).map_err(|e| EngineError::Discovery {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        filename::glob_pattern(resolution)
    );

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|e| EngineError::Discovery {
            path: e.path().to_path_buf(),
            reason: e.error().to_string(),
        })?;
        if !path.is_file() {
            continue;
        }
        match GridFile::from_path(&path, latest) {
            Some(file) => files.push(file),
            None => debug!(path = %path.display(), "Skipping file with unrecognised name"),
        }
    }

    files.sort_by(|a, b| {
        a.forecast_hour
            .cmp(&b.forecast_hour)
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(files)
}
