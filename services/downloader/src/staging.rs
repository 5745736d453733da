//! Staging directory for assembling one cycle's download set.
//!
//! A [`StagingDir`] is created next to the published directory so the final
//! rename stays on one filesystem. Dropping it removes the directory and
//! everything in it; only [`StagingDir::publish`] keeps its contents.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

const STAGING_PREFIX: &str = ".staging-";
const RETIRED_PREFIX: &str = ".retired-";

/// Uniquely named directory holding a not-yet-published download set.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
    published: PathBuf,
}

impl StagingDir {
    /// Create a fresh staging directory adjacent to `published`.
    pub fn create(published: &Path) -> io::Result<Self> {
        let parent = parent_of(published);
        std::fs::create_dir_all(&parent)?;

        let dir = tempfile::Builder::new()
            .prefix(&staging_prefix(published))
            .tempdir_in(&parent)?;
        debug!(staging = %dir.path().display(), "Created staging directory");

        Ok(Self {
            dir,
            published: published.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Replace the published directory with this staging directory.
    ///
    /// The previous published directory is first moved aside, then the
    /// staging directory is renamed into place and the old one deleted. If
    /// the second rename fails the previous directory is moved back.
    pub async fn publish(self) -> io::Result<PathBuf> {
        let published = self.published.clone();
        let retired = if tokio::fs::try_exists(&published).await? {
            let retired = tempfile::Builder::new()
                .prefix(&format!("{}{}", RETIRED_PREFIX, dir_name(&published)))
                .tempdir_in(parent_of(&published))?
                .into_path();
            // rename cannot replace a directory, so the placeholder goes first
            tokio::fs::remove_dir(&retired).await?;
            tokio::fs::rename(&published, &retired).await?;
            Some(retired)
        } else {
            None
        };

        let staged = self.dir.into_path();
        if let Err(e) = tokio::fs::rename(&staged, &published).await {
            warn!(
                staging = %staged.display(),
                published = %published.display(),
                error = %e,
                "Failed to publish staging directory"
            );
            if let Some(retired) = &retired {
                if let Err(restore) = tokio::fs::rename(retired, &published).await {
                    warn!(error = %restore, "Failed to restore previous published directory");
                }
            }
            remove_quietly(&staged).await;
            return Err(e);
        }

        if let Some(retired) = retired {
            remove_quietly(&retired).await;
        }

        info!(published = %published.display(), "Published download set");
        Ok(published)
    }
}

fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "published".to_string())
}

fn staging_prefix(published: &Path) -> String {
    format!("{}{}-", STAGING_PREFIX, dir_name(published))
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove directory");
    }
}
