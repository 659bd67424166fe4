use tracing::{debug, info};

use crate::pipeline::processing::quality_gate::{
    DefaultQualityGate, QualityAssessment, QualityDecision, QualityGate, QualityIssueType,
    QualitySeverity,
};
use crate::types::{Field, ProviderRecord};

/// Use case for assessing normalized provider records through the Quality Gate
pub struct QualityGateUseCase {
    quality_gate: Box<dyn QualityGate + Send + Sync>,
}

impl QualityGateUseCase {
    pub fn new(quality_gate: Box<dyn QualityGate + Send + Sync>) -> Self {
        Self { quality_gate }
    }

    /// Create a use case with the default quality gate
    pub fn with_default_quality_gate() -> Self {
        Self {
            quality_gate: Box::new(DefaultQualityGate::new()),
        }
    }

    /// Assess a single record
    pub fn assess_record(&self, record: &ProviderRecord) -> QualityAssessment {
        let assessment = self.quality_gate.assess(record);

        match assessment.decision {
            QualityDecision::Accept => {
                crate::observability::metrics::quality_gate::record_accepted();
            }
            QualityDecision::AcceptWithWarnings => {
                crate::observability::metrics::quality_gate::record_accepted_with_warnings();
            }
            QualityDecision::Flag => {
                crate::observability::metrics::quality_gate::record_flagged();
                debug!(provider = record.display_name(), "Provider flagged");
            }
        }
        for issue in &assessment.issues {
            crate::observability::metrics::quality_gate::issues_detected(
                &format!("{:?}", issue.issue_type),
                1,
            );
        }

        assessment
    }

    /// Assess every record, in order
    pub fn assess_batch(&self, records: &[ProviderRecord]) -> Vec<QualityAssessment> {
        let assessments: Vec<QualityAssessment> =
            records.iter().map(|record| self.assess_record(record)).collect();

        let flagged = assessments.iter().filter(|a| a.is_flagged()).count();
        info!(records = records.len(), flagged, "Quality gate assessed batch");
        assessments
    }

    /// Get statistics for a batch assessment
    pub fn get_batch_stats(assessments: &[QualityAssessment]) -> QualityGateBatchStats {
        let mut stats = QualityGateBatchStats::default();

        for assessment in assessments {
            stats.total_records += 1;

            match assessment.decision {
                QualityDecision::Accept => stats.accepted_count += 1,
                QualityDecision::AcceptWithWarnings => stats.accepted_with_warnings_count += 1,
                QualityDecision::Flag => stats.flagged_count += 1,
            }

            for issue in &assessment.issues {
                match issue.severity {
                    QualitySeverity::Info => stats.info_issues += 1,
                    QualitySeverity::Warning => stats.warning_issues += 1,
                    QualitySeverity::Error => stats.error_issues += 1,
                    QualitySeverity::Critical => stats.critical_issues += 1,
                }
                if matches!(
                    issue.issue_type,
                    QualityIssueType::MissingData | QualityIssueType::IncompleteGeography
                ) {
                    match issue.field {
                        Some(Field::Name) => stats.missing_name += 1,
                        Some(Field::Phone) => stats.missing_phone += 1,
                        Some(Field::City) => stats.missing_city += 1,
                        Some(Field::State) => stats.missing_state += 1,
                        _ => {}
                    }
                }
            }

            if assessment.issues.is_empty() {
                stats.complete_records += 1;
            }
        }

        stats
    }
}

/// Statistics for a batch of quality gate assessments
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QualityGateBatchStats {
    pub total_records: usize,
    pub accepted_count: usize,
    pub accepted_with_warnings_count: usize,
    pub flagged_count: usize,
    pub info_issues: usize,
    pub warning_issues: usize,
    pub error_issues: usize,
    pub critical_issues: usize,
    pub missing_name: usize,
    pub missing_phone: usize,
    pub missing_city: usize,
    pub missing_state: usize,
    /// Records with name, phone, city and state all present
    pub complete_records: usize,
}

impl QualityGateBatchStats {
    fn percent(count: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        count as f64 / total as f64 * 100.0
    }

    /// Calculate acceptance rate as percentage
    pub fn acceptance_rate(&self) -> f64 {
        Self::percent(
            self.accepted_count + self.accepted_with_warnings_count,
            self.total_records,
        )
    }

    /// Calculate flag rate as percentage
    pub fn flag_rate(&self) -> f64 {
        Self::percent(self.flagged_count, self.total_records)
    }

    /// Share of records with every critical and location field filled
    pub fn completeness_rate(&self) -> f64 {
        Self::percent(self.complete_records, self.total_records)
    }
}
