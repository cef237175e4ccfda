use async_trait::async_trait;

use crate::{ArtifactPaths, DomainError, TransformOutcome};

/// Request-scoped storage for the input and output artifacts.
///
/// Implementations must remove everything they created when `release` is
/// called or when the value is dropped, whichever comes first. `release` is
/// idempotent and never fails.
#[async_trait]
pub trait ScratchSpace: Send + Sync {
    fn paths(&self) -> &ArtifactPaths;
    async fn write_input(&self, content: &[u8]) -> Result<(), DomainError>;
    async fn read_output(&self) -> Result<Vec<u8>, DomainError>;
    async fn release(&mut self);
}

#[async_trait]
pub trait ScratchSpacePort: Send + Sync {
    async fn allocate(&self, file_name: &str) -> Result<Box<dyn ScratchSpace>, DomainError>;
}

/// Turns the artifact at `paths.input` into a CSV at `paths.output`.
#[async_trait]
pub trait TransformPort: Send + Sync {
    fn name(&self) -> &'static str;
    async fn transform(&self, paths: &ArtifactPaths) -> Result<TransformOutcome, DomainError>;
}
