use tracing::info;

use crate::pipeline::processing::coverage::{count_coverage, CoverageOutcome, CoverageQuery, CoverageReport};
use crate::types::{Field, ProviderTable};

/// Columns a coverage run cannot do without. The flag and service-area columns are optional.
pub const COVERAGE_REQUIRED_FIELDS: [Field; 3] = [Field::Name, Field::City, Field::State];

/// Use case for counting metro coverage over a normalized provider table
#[derive(Debug, Clone, Default)]
pub struct CoverageUseCase {
    queries: Vec<CoverageQuery>,
}

impl CoverageUseCase {
    pub fn new(queries: Vec<CoverageQuery>) -> Self {
        Self { queries }
    }

    /// One report per query, in query order
    pub fn run(&self, table: &ProviderTable) -> Vec<CoverageReport> {
        self.queries
            .iter()
            .map(|query| {
                let report = count_coverage(query, &table.records);
                crate::observability::metrics::coverage::query_answered(
                    &query.city,
                    &[
                        (CoverageOutcome::Nationwide.label(), report.nationwide),
                        (CoverageOutcome::DirectCity.label(), report.direct_city),
                        (CoverageOutcome::ServiceArea.label(), report.service_area),
                        (CoverageOutcome::Regional.label(), report.regional),
                    ],
                );
                info!(
                    query = %query,
                    total = report.total,
                    city_specific = report.city_specific(),
                    regional = report.regional,
                    nationwide = report.nationwide,
                    excluded = report.excluded,
                    "Coverage counted"
                );
                report
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Flag, ProviderRecord};

    fn provider(city: &str, state: &str) -> ProviderRecord {
        ProviderRecord {
            name: format!("{} Draws", city),
            phone: "555-0100".to_string(),
            city: city.to_string(),
            state: state.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_coverage_counts_every_query_independently() {
        let mut nationwide = provider("Denver", "CO");
        nationwide.is_nationwide = Flag::Yes;
        let mut not_mobile = provider("Houston", "TX");
        not_mobile.is_mobile_phlebotomy = Flag::No;
        not_mobile.is_nationwide = Flag::Yes;

        let table = ProviderTable::new(
            Vec::new(),
            vec![provider("Houston", "TX"), provider("Dallas", "Texas"), nationwide, not_mobile],
        );
        let use_case = CoverageUseCase::new(vec![
            CoverageQuery::new("Houston", "TX").unwrap(),
            CoverageQuery::new("Dallas", "TX").unwrap(),
            CoverageQuery::new("Chicago", "IL").unwrap(),
        ]);

        let reports = use_case.run(&table);
        assert_eq!(reports.len(), 3);

        // The nationwide provider counts toward every query, the non-mobile one toward none
        assert_eq!(reports[0].total, 3);
        assert_eq!(reports[0].direct_city, 1);
        assert_eq!(reports[0].regional, 1);
        assert_eq!(reports[1].total, 3);
        assert_eq!(reports[2].total, 1);
        assert!(reports.iter().all(|r| r.excluded == 1));
    }
}
