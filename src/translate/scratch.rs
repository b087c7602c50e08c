use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::config::PathsConfig;
use crate::error::Result;

pub const SEPARATOR: &str = "-----------";

/// Fixed-name files for crash inspection: the running checkpoint and the
/// last rejected exchange. Both are overwritten, never appended.
#[derive(Debug, Clone, Default)]
pub struct ScratchFiles {
    checkpoint: Option<PathBuf>,
    error_log: Option<PathBuf>,
}

impl ScratchFiles {
    pub fn new(checkpoint: impl Into<PathBuf>, error_log: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint: Some(checkpoint.into()),
            error_log: Some(error_log.into()),
        }
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        Self::new(&paths.checkpoint, &paths.error_log)
    }

    /// No scratch output at all
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Snapshot of everything committed so far, headed by the final destination.
    pub async fn write_checkpoint(&self, destination: &Path, output: &str) -> Result<()> {
        let Some(path) = &self.checkpoint else {
            return Ok(());
        };
        let content = format!("{}\n\n{}\n\n{}", destination.display(), SEPARATOR, output);
        write_creating_parent(path, content).await?;
        debug!("Checkpoint written to {}", path.display());
        Ok(())
    }

    pub async fn write_error(&self, prompt: &str, response: &str) -> Result<()> {
        let Some(path) = &self.error_log else {
            return Ok(());
        };
        let content = format!("{SEPARATOR}\n\n{prompt}\n\n\n\n{response}\n\n{SEPARATOR}");
        write_creating_parent(path, content).await
    }
}

async fn write_creating_parent(path: &Path, content: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_checkpoint_layout_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = dir.path().join("work").join("tmp.srt");
        let scratch = ScratchFiles::new(&checkpoint, dir.path().join("error.log"));

        scratch.write_checkpoint(Path::new("out/a.fr.srt"), "1\nt\nx\n\n").await.unwrap();
        scratch.write_checkpoint(Path::new("out/a.fr.srt"), "1\nt\ny\n\n").await.unwrap();

        let content = std::fs::read_to_string(&checkpoint).unwrap();
        assert_eq!(content, "out/a.fr.srt\n\n-----------\n\n1\nt\ny\n\n");
    }

    #[tokio::test]
    async fn test_error_log_layout() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("error.log");
        let scratch = ScratchFiles::new(dir.path().join("tmp.srt"), &log);

        scratch.write_error("PROMPT", "RESPONSE").await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&log).unwrap(),
            "-----------\n\nPROMPT\n\n\n\nRESPONSE\n\n-----------"
        );
    }

    #[tokio::test]
    async fn test_disabled_writes_nothing() {
        let scratch = ScratchFiles::disabled();
        scratch.write_checkpoint(Path::new("x"), "y").await.unwrap();
        scratch.write_error("a", "b").await.unwrap();
    }
}
