use std::time::Instant;
use tracing::{debug, info};

use crate::pipeline::processing::normalize::{
    normalize_batch, DefaultNormalizer, NormalizationTally, Normalizer,
};
use crate::types::ProviderTable;

/// A normalized table plus the rules that fired across it
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub table: ProviderTable,
    pub tally: NormalizationTally,
}

/// Use case for normalizing a raw provider table into canonical form
pub struct NormalizeUseCase {
    normalizer: Box<dyn Normalizer + Send + Sync>,
}

impl NormalizeUseCase {
    pub fn new(normalizer: Box<dyn Normalizer + Send + Sync>) -> Self {
        Self { normalizer }
    }

    /// Create a use case with the default normalizer
    pub fn with_default_normalizer() -> Self {
        Self {
            normalizer: Box::new(DefaultNormalizer::new()),
        }
    }

    /// Normalize every record, keeping headers and order
    pub fn normalize_table(&self, table: &ProviderTable) -> NormalizedTable {
        let started = Instant::now();
        let (records, tally) = normalize_batch(&*self.normalizer, &table.records);

        crate::observability::metrics::normalize::batch_processed(
            records.len(),
            &tally,
            started.elapsed().as_secs_f64(),
        );
        for (rule, count) in tally.entries().filter(|(_, count)| *count > 0) {
            debug!(rule = rule.key(), count, "Normalization rule applied");
        }
        info!(
            records = records.len(),
            changes = tally.total(),
            "Normalized provider table"
        );

        NormalizedTable {
            table: table.with_records(records),
            tally,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::{NormalizationRule, NormalizedRecord};
    use crate::types::ProviderRecord;

    struct UppercaseNameNormalizer;

    impl Normalizer for UppercaseNameNormalizer {
        fn normalize(&self, record: &ProviderRecord) -> NormalizedRecord {
            let mut record = record.clone();
            record.name = record.name.to_uppercase();
            NormalizedRecord {
                record,
                tally: NormalizationTally::default(),
            }
        }
    }

    fn table() -> ProviderTable {
        ProviderTable::new(
            vec!["name".to_string(), "email".to_string()],
            vec![
                ProviderRecord {
                    name: "acme".to_string(),
                    email: "bad".to_string(),
                    ..Default::default()
                },
                ProviderRecord {
                    name: "beta".to_string(),
                    ..Default::default()
                },
            ],
        )
    }

    #[test]
    fn test_normalize_use_case_with_default_normalizer() {
        let use_case = NormalizeUseCase::with_default_normalizer();
        let result = use_case.normalize_table(&table());

        assert_eq!(result.table.len(), 2);
        assert_eq!(result.table.headers, table().headers);
        assert_eq!(result.table.records[0].email, "");
        assert_eq!(result.tally.get(NormalizationRule::EmailCleared), 1);
        assert_eq!(result.tally.get(NormalizationRule::LanguagesDefaulted), 2);
    }

    #[test]
    fn test_normalize_use_case_uses_injected_normalizer() {
        let use_case = NormalizeUseCase::new(Box::new(UppercaseNameNormalizer));
        let result = use_case.normalize_table(&table());

        assert_eq!(result.table.records[1].name, "BETA");
        assert_eq!(result.tally.total(), 0);
    }
}
