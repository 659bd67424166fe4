use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::app::ports::{ProjectionSinkPort, WrittenFile};
use crate::config::ColumnMap;
use crate::pipeline::processing::export::project;
use crate::types::ProviderTable;

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub documents: usize,
    pub output: WrittenFile,
}

/// Use case for projecting the canonical table into website documents
pub struct ExportUseCase {
    columns: ColumnMap,
    output: Box<dyn ProjectionSinkPort>,
}

impl ExportUseCase {
    pub fn new(columns: ColumnMap, output: Box<dyn ProjectionSinkPort>) -> Self {
        Self { columns, output }
    }

    pub async fn run(&self, table: &ProviderTable, generated_at: DateTime<Utc>) -> Result<ExportOutcome> {
        let documents = project(&table.records, &self.columns, generated_at);
        let output = self.output.write_documents(&documents).await?;
        crate::observability::metrics::output::file_written("projection", output.bytes);
        info!(
            documents = documents.len(),
            path = %output.path.display(),
            sha256 = %output.sha256,
            "Exported provider documents"
        );

        Ok(ExportOutcome {
            documents: documents.len(),
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::export::ProviderDocument;
    use crate::types::ProviderRecord;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockProjectionSink {
        documents: Arc<Mutex<Vec<ProviderDocument>>>,
    }

    #[async_trait]
    impl ProjectionSinkPort for MockProjectionSink {
        async fn write_documents(&self, documents: &[ProviderDocument]) -> anyhow::Result<WrittenFile> {
            self.documents.lock().await.extend_from_slice(documents);
            Ok(WrittenFile {
                path: PathBuf::from("providers.json"),
                bytes: 0,
                sha256: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_export_projects_every_record_in_order() {
        let sink = MockProjectionSink::default();
        let written = sink.documents.clone();
        let use_case = ExportUseCase::new(ColumnMap::default(), Box::new(sink));

        let table = ProviderTable::new(
            Vec::new(),
            vec![
                ProviderRecord {
                    name: "First Draw".to_string(),
                    ..Default::default()
                },
                ProviderRecord {
                    name: "Second Draw".to_string(),
                    ..Default::default()
                },
            ],
        );

        let outcome = use_case.run(&table, Utc::now()).await.unwrap();
        assert_eq!(outcome.documents, 2);

        let written = written.lock().await;
        assert_eq!(written[0].id, "1");
        assert_eq!(written[1].slug, "second-draw");
    }
}
