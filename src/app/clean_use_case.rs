use anyhow::Result;
use tracing::{info, warn};

use crate::app::normalize_use_case::{NormalizeUseCase, NormalizedTable};
use crate::app::ports::{CleanOutputPort, ProviderSourcePort, WrittenFile};
use crate::app::quality_gate_use_case::{QualityGateBatchStats, QualityGateUseCase};
use crate::pipeline::processing::quality_gate::QualityAssessment;

/// Result of one cleaning run
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub normalized: NormalizedTable,
    pub assessments: Vec<QualityAssessment>,
    pub stats: QualityGateBatchStats,
    pub canonical: WrittenFile,
    /// Present only when at least one record was flagged
    pub flagged: Option<WrittenFile>,
    /// A flagged file from an earlier run was removed
    pub stale_flagged_removed: bool,
}

/// Load, normalize, assess, then publish the canonical and flagged tables.
///
/// Nothing is written until every record has been normalized and assessed, and both tables
/// are published in a single step.
pub struct CleanUseCase {
    source: Box<dyn ProviderSourcePort>,
    normalize: NormalizeUseCase,
    quality_gate: QualityGateUseCase,
    output: Box<dyn CleanOutputPort>,
}

impl CleanUseCase {
    pub fn new(
        source: Box<dyn ProviderSourcePort>,
        normalize: NormalizeUseCase,
        quality_gate: QualityGateUseCase,
        output: Box<dyn CleanOutputPort>,
    ) -> Self {
        Self {
            source,
            normalize,
            quality_gate,
            output,
        }
    }

    pub async fn run(&self) -> Result<CleanOutcome> {
        let raw = self.source.load().await?;
        info!(records = raw.len(), "Loaded provider table");

        let normalized = self.normalize.normalize_table(&raw);
        let assessments = self.quality_gate.assess_batch(&normalized.table.records);
        let stats = QualityGateUseCase::get_batch_stats(&assessments);

        let flagged_records: Vec<_> = normalized
            .table
            .records
            .iter()
            .zip(&assessments)
            .filter(|(_, assessment)| assessment.is_flagged())
            .map(|(record, _)| record.clone())
            .collect();
        let flagged_table =
            (!flagged_records.is_empty()).then(|| normalized.table.with_records(flagged_records));

        let published = self
            .output
            .publish(&normalized.table, flagged_table.as_ref())
            .await?;

        crate::observability::metrics::output::file_written("canonical", published.canonical.bytes);
        info!(
            path = %published.canonical.path.display(),
            sha256 = %published.canonical.sha256,
            "Wrote canonical table"
        );
        match &published.flagged {
            Some(written) => {
                crate::observability::metrics::output::file_written("flagged", written.bytes);
                warn!(
                    flagged = stats.flagged_count,
                    path = %written.path.display(),
                    "Records missing name or phone were flagged"
                );
            }
            None if published.stale_flagged_removed => {
                info!("Removed stale flagged table from an earlier run");
            }
            None => {}
        }

        Ok(CleanOutcome {
            normalized,
            assessments,
            stats,
            canonical: published.canonical,
            flagged: published.flagged,
            stale_flagged_removed: published.stale_flagged_removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::PublishedTables;
    use crate::types::{ProviderRecord, ProviderTable};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct MockSource {
        table: ProviderTable,
    }

    #[async_trait]
    impl ProviderSourcePort for MockSource {
        async fn load(&self) -> anyhow::Result<ProviderTable> {
            Ok(self.table.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ProviderSourcePort for FailingSource {
        async fn load(&self) -> anyhow::Result<ProviderTable> {
            anyhow::bail!("missing required column(s) phone")
        }
    }

    fn written(path: &str, table: &ProviderTable) -> WrittenFile {
        WrittenFile {
            path: PathBuf::from(path),
            bytes: table.len() as u64,
            sha256: String::new(),
        }
    }

    /// Keeps published tables in memory; with `fail_flagged` set, refuses any run that
    /// has flagged records and keeps nothing.
    #[derive(Default)]
    struct MockOutput {
        canonical: Arc<Mutex<Vec<ProviderTable>>>,
        flagged: Arc<Mutex<Vec<ProviderTable>>>,
        has_stale_flagged: bool,
        fail_flagged: bool,
    }

    #[async_trait]
    impl CleanOutputPort for MockOutput {
        async fn publish(
            &self,
            canonical: &ProviderTable,
            flagged: Option<&ProviderTable>,
        ) -> anyhow::Result<PublishedTables> {
            if self.fail_flagged && flagged.is_some() {
                anyhow::bail!("disk full");
            }
            self.canonical.lock().await.push(canonical.clone());
            if let Some(table) = flagged {
                self.flagged.lock().await.push(table.clone());
            }
            Ok(PublishedTables {
                canonical: written("cleaned.csv", canonical),
                flagged: flagged.map(|table| written("flagged.csv", table)),
                stale_flagged_removed: flagged.is_none() && self.has_stale_flagged,
            })
        }
    }

    fn provider(name: &str, phone: &str) -> ProviderRecord {
        ProviderRecord {
            name: name.to_string(),
            phone: phone.to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            ..Default::default()
        }
    }

    fn use_case(source: Box<dyn ProviderSourcePort>, output: MockOutput) -> CleanUseCase {
        CleanUseCase::new(
            source,
            NormalizeUseCase::with_default_normalizer(),
            QualityGateUseCase::with_default_quality_gate(),
            Box::new(output),
        )
    }

    fn source(records: Vec<ProviderRecord>) -> Box<dyn ProviderSourcePort> {
        Box::new(MockSource {
            table: ProviderTable::new(vec!["name".to_string(), "phone".to_string()], records),
        })
    }

    #[tokio::test]
    async fn test_clean_publishes_canonical_and_flagged() {
        let output = MockOutput::default();
        let canonical = output.canonical.clone();
        let flagged = output.flagged.clone();

        let outcome = use_case(
            source(vec![provider("Acme Labs", "555-0100"), provider("", "555-0101")]),
            output,
        )
        .run()
        .await
        .unwrap();

        let canonical = canonical.lock().await;
        assert_eq!(canonical[0].len(), 2);
        let flagged = flagged.lock().await;
        assert_eq!(flagged[0].len(), 1);
        assert_eq!(flagged[0].records[0].phone, "555-0101");
        assert!(outcome.flagged.is_some());
        assert_eq!(outcome.stats.flagged_count, 1);
        assert_eq!(
            outcome.normalized.table.records[0].bio,
            "Acme Labs provides mobile phlebotomy services in Austin, TX."
        );
    }

    #[tokio::test]
    async fn test_clean_without_flagged_records_reports_stale_removal() {
        let output = MockOutput {
            has_stale_flagged: true,
            ..Default::default()
        };
        let flagged = output.flagged.clone();

        let outcome = use_case(source(vec![provider("Acme Labs", "555-0100")]), output)
            .run()
            .await
            .unwrap();

        assert!(outcome.flagged.is_none());
        assert!(outcome.stale_flagged_removed);
        assert!(flagged.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_flagged_output_fails_run_without_canonical() {
        let output = MockOutput {
            fail_flagged: true,
            ..Default::default()
        };
        let canonical = output.canonical.clone();

        let result = use_case(
            source(vec![provider("Acme Labs", "555-0100"), provider("", "555-0101")]),
            output,
        )
        .run()
        .await;

        assert!(result.is_err());
        assert!(canonical.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_clean_writes_nothing_when_load_fails() {
        let output = MockOutput::default();
        let canonical = output.canonical.clone();

        assert!(use_case(Box::new(FailingSource), output).run().await.is_err());
        assert!(canonical.lock().await.is_empty());
    }
}
