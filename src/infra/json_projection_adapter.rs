use std::path::PathBuf;
use tracing::info;

use crate::app::ports::{ProjectionSinkPort, WrittenFile};
use crate::infra::file_commit;
use crate::pipeline::processing::export::ProviderDocument;

/// File-based implementation of ProjectionSinkPort
/// Writes the provider documents as one pretty-printed JSON array
pub struct JsonProjectionWriter {
    path: PathBuf,
}

impl JsonProjectionWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ProjectionSinkPort for JsonProjectionWriter {
    async fn write_documents(&self, documents: &[ProviderDocument]) -> anyhow::Result<WrittenFile> {
        let mut bytes = serde_json::to_vec_pretty(documents)?;
        bytes.push(b'\n');
        let written = file_commit::commit(&self.path, &bytes)?;
        info!(path = %written.path.display(), documents = documents.len(), "Wrote provider documents");
        Ok(written)
    }
}
