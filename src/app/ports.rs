use async_trait::async_trait;
use std::path::PathBuf;

use crate::pipeline::processing::export::ProviderDocument;
use crate::types::ProviderTable;

/// A file committed by an output adapter, with its content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
    /// Hex-encoded SHA-256 of the file contents
    pub sha256: String,
}

#[async_trait]
pub trait ProviderSourcePort: Send + Sync {
    /// Read the whole provider table, failing on a schema mismatch.
    async fn load(&self) -> anyhow::Result<ProviderTable>;
}

/// What a cleaning run left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedTables {
    pub canonical: WrittenFile,
    /// Present only when a flagged table was written
    pub flagged: Option<WrittenFile>,
    /// A flagged table from an earlier run was removed
    pub stale_flagged_removed: bool,
}

#[async_trait]
pub trait CleanOutputPort: Send + Sync {
    /// Replace the canonical table and either write the flagged table or, when `flagged` is
    /// `None`, remove any earlier one. On error neither output has changed.
    async fn publish(
        &self,
        canonical: &ProviderTable,
        flagged: Option<&ProviderTable>,
    ) -> anyhow::Result<PublishedTables>;
}

#[async_trait]
pub trait ProjectionSinkPort: Send + Sync {
    async fn write_documents(&self, documents: &[ProviderDocument]) -> anyhow::Result<WrittenFile>;
}
