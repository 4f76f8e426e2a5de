use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Process-unique staging directories for intermediate frame images.
///
/// Layout: `<temp>/pixvid_<pid>/raw` for decoded frames and
/// `<temp>/pixvid_<pid>/pixelated` for quantized frames. The whole root is
/// removed on cleanup and on drop, so concurrent runs never collide.
pub struct StagingDirs {
    root: PathBuf,
    raw: PathBuf,
    pixelated: PathBuf,
}

impl StagingDirs {
    pub fn new() -> Result<Self> {
        Self::under(std::env::temp_dir())
    }

    fn under(base: PathBuf) -> Result<Self> {
        let root = base.join(format!("pixvid_{}", std::process::id()));
        let raw = root.join("raw");
        let pixelated = root.join("pixelated");

        for dir in [&raw, &pixelated] {
            create_dir_all(dir).map_err(|e| PipelineError::StagingFailed {
                reason: format!("could not create {}: {e}", dir.display()),
            })?;
        }

        debug!("Staging directories ready under {:?}", root);

        Ok(Self {
            root,
            raw,
            pixelated,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw(&self) -> &Path {
        &self.raw
    }

    pub fn pixelated(&self) -> &Path {
        &self.pixelated
    }

    pub fn cleanup(&mut self) {
        if self.root.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.root) {
                warn!("Failed to remove staging directory {:?}: {}", self.root, e);
            }
        }
    }
}

impl Drop for StagingDirs {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_dirs_created_and_removed() {
        let base = tempfile::tempdir().unwrap();
        let root;

        {
            let staging = StagingDirs::under(base.path().to_path_buf()).unwrap();
            root = staging.root().to_path_buf();

            assert!(staging.raw().is_dir());
            assert!(staging.pixelated().is_dir());
        }

        // Dropped out of scope: the whole root is gone
        assert!(!root.exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let mut staging = StagingDirs::under(base.path().to_path_buf()).unwrap();

        staging.cleanup();
        staging.cleanup();
        assert!(!staging.root().exists());
    }
}
