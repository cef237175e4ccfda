use std::{
    io,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use clean_domain::{ArtifactPaths, DomainError, ScratchSpace, ScratchSpacePort};
use tempfile::TempDir;

const SCRATCH_PREFIX: &str = "clean-";

/// Allocates one fresh directory per request under `root`, or under the
/// platform temp directory when no root is configured.
#[derive(Debug, Clone, Default)]
pub struct TempScratchSpaceProvider {
    root: Option<PathBuf>,
}

impl TempScratchSpaceProvider {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[async_trait]
impl ScratchSpacePort for TempScratchSpaceProvider {
    async fn allocate(&self, file_name: &str) -> Result<Box<dyn ScratchSpace>, DomainError> {
        let root = self.root();
        tokio::fs::create_dir_all(&root).await.map_err(|err| {
            DomainError::io(
                format!("failed to create scratch root {}", root.display()),
                err,
            )
        })?;
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&root)
            .map_err(|err| {
                DomainError::io(
                    format!("failed to create scratch directory in {}", root.display()),
                    err,
                )
            })?;

        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let paths = ArtifactPaths::in_dir(dir.path(), file_name, timestamp_ms);

        tracing::debug!(
            scratch_dir = %dir.path().display(),
            input = %paths.input.display(),
            output = %paths.output.display(),
            "scratch space allocated"
        );

        Ok(Box::new(TempScratchSpace {
            dir: Some(dir),
            paths,
        }))
    }
}

/// Owns a request's scratch directory. The directory and both artifacts are
/// removed on `release` or on drop.
pub struct TempScratchSpace {
    dir: Option<TempDir>,
    paths: ArtifactPaths,
}

impl TempScratchSpace {
    fn remove(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => tracing::debug!(scratch_dir = %path.display(), "scratch space released"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(scratch_dir = %path.display(), "scratch space already gone")
            }
            Err(err) => tracing::warn!(
                scratch_dir = %path.display(),
                error = %err,
                "failed to release scratch space"
            ),
        }
    }
}

#[async_trait]
impl ScratchSpace for TempScratchSpace {
    fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    async fn write_input(&self, content: &[u8]) -> Result<(), DomainError> {
        tokio::fs::write(&self.paths.input, content)
            .await
            .map_err(|err| {
                DomainError::io(
                    format!("failed to write input artifact {}", self.paths.input.display()),
                    err,
                )
            })
    }

    async fn read_output(&self) -> Result<Vec<u8>, DomainError> {
        tokio::fs::read(&self.paths.output)
            .await
            .map_err(|err| DomainError::OutputUnreadable {
                reason: format!("{}: {err}", self.paths.output.display()),
            })
    }

    async fn release(&mut self) {
        self.remove();
    }
}

impl Drop for TempScratchSpace {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn provider(root: &Path) -> TempScratchSpaceProvider {
        TempScratchSpaceProvider::new(Some(root.to_path_buf()))
    }

    fn entries(root: &Path) -> usize {
        std::fs::read_dir(root).expect("read root").count()
    }

    #[tokio::test]
    async fn allocate_creates_isolated_directory() {
        let root = TempDir::new().expect("root");
        let scratch = provider(root.path())
            .allocate("contacts.csv")
            .await
            .expect("allocate");

        let paths = scratch.paths();
        assert_eq!(paths.input.parent(), paths.output.parent());
        assert_eq!(paths.input.parent().and_then(Path::parent), Some(root.path()));
        assert!(paths
            .input
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("input-") && name.ends_with("-contacts.csv")));
        assert_eq!(entries(root.path()), 1);
    }

    #[tokio::test]
    async fn write_then_read_round_trips_through_disk() {
        let root = TempDir::new().expect("root");
        let scratch = provider(root.path()).allocate("a.csv").await.expect("allocate");

        scratch.write_input(b"raw").await.expect("write");
        assert_eq!(std::fs::read(&scratch.paths().input).expect("read input"), b"raw");

        std::fs::write(&scratch.paths().output, b"cleaned").expect("write output");
        assert_eq!(scratch.read_output().await.expect("read output"), b"cleaned");
    }

    #[tokio::test]
    async fn missing_output_is_reported_as_unreadable() {
        let root = TempDir::new().expect("root");
        let scratch = provider(root.path()).allocate("a.csv").await.expect("allocate");

        let err = scratch.read_output().await.expect_err("no output written");
        assert!(matches!(err, DomainError::OutputUnreadable { .. }));
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let root = TempDir::new().expect("root");
        let mut scratch = provider(root.path()).allocate("a.csv").await.expect("allocate");
        scratch.write_input(b"raw").await.expect("write");
        let input = scratch.paths().input.clone();

        scratch.release().await;
        scratch.release().await;

        assert!(!input.exists());
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn release_tolerates_externally_removed_directory() {
        let root = TempDir::new().expect("root");
        let mut scratch = provider(root.path()).allocate("a.csv").await.expect("allocate");
        let dir = scratch
            .paths()
            .input
            .parent()
            .expect("scratch dir")
            .to_path_buf();
        std::fs::remove_dir_all(&dir).expect("remove");

        scratch.release().await;
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn drop_removes_artifacts() {
        let root = TempDir::new().expect("root");
        {
            let scratch = provider(root.path()).allocate("a.csv").await.expect("allocate");
            scratch.write_input(b"raw").await.expect("write");
        }
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn identical_names_never_share_a_directory() {
        let root = TempDir::new().expect("root");
        let provider = provider(root.path());
        let (first, second) = tokio::join!(provider.allocate("same.csv"), provider.allocate("same.csv"));
        let first = first.expect("first");
        let second = second.expect("second");

        assert_ne!(first.paths().input, second.paths().input);
        assert_ne!(first.paths().output, second.paths().output);
    }

    #[tokio::test]
    async fn missing_root_is_created() {
        let root = TempDir::new().expect("root");
        let nested = root.path().join("nested").join("scratch");
        let scratch = provider(&nested).allocate("a.csv").await.expect("allocate");
        assert!(scratch.paths().input.starts_with(&nested));
    }
}
