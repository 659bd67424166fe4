//! Metrics for the cleaning pipeline
//!
//! Metric names live in one enum so call sites never carry magic strings. A Prometheus
//! recorder is installed at startup; its handle renders the run's snapshot.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::info;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Normalize metrics
    NormalizeRecordsProcessed,
    NormalizeRulesApplied,
    NormalizeBatchSize,
    NormalizeDuration,

    // Quality Gate metrics
    QualityGateRecordsAccepted,
    QualityGateRecordsAcceptedWithWarnings,
    QualityGateRecordsFlagged,
    QualityGateIssuesDetected,

    // Coverage metrics
    CoverageQueries,
    CoverageProvidersMatched,

    // Output metrics
    OutputFilesWritten,
    OutputBytesWritten,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NormalizeRecordsProcessed => "phleb_normalize_records_processed_total",
            MetricName::NormalizeRulesApplied => "phleb_normalize_rules_applied_total",
            MetricName::NormalizeBatchSize => "phleb_normalize_batch_size",
            MetricName::NormalizeDuration => "phleb_normalize_duration_seconds",

            MetricName::QualityGateRecordsAccepted => "phleb_quality_gate_records_accepted_total",
            MetricName::QualityGateRecordsAcceptedWithWarnings => {
                "phleb_quality_gate_records_accepted_with_warnings_total"
            }
            MetricName::QualityGateRecordsFlagged => "phleb_quality_gate_records_flagged_total",
            MetricName::QualityGateIssuesDetected => "phleb_quality_gate_issues_detected_total",

            MetricName::CoverageQueries => "phleb_coverage_queries_total",
            MetricName::CoverageProvidersMatched => "phleb_coverage_providers_matched_total",

            MetricName::OutputFilesWritten => "phleb_output_files_written_total",
            MetricName::OutputBytesWritten => "phleb_output_bytes_written",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            NormalizeRecordsProcessed,
            NormalizeRulesApplied,
            NormalizeBatchSize,
            NormalizeDuration,
            QualityGateRecordsAccepted,
            QualityGateRecordsAcceptedWithWarnings,
            QualityGateRecordsFlagged,
            QualityGateIssuesDetected,
            CoverageQueries,
            CoverageProvidersMatched,
            OutputFilesWritten,
            OutputBytesWritten,
        ]
        .into_iter()
    }
}

/// Install the Prometheus recorder and return the handle used to render snapshots
pub fn init() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("Metrics system initialized");
    Ok(handle)
}

// ============================================================================
// Normalize Metrics
// ============================================================================

pub mod normalize {
    use super::MetricName;
    use crate::pipeline::processing::normalize::NormalizationTally;

    /// Record a finished normalization batch with its per-rule tally
    pub fn batch_processed(size: usize, tally: &NormalizationTally, secs: f64) {
        ::metrics::counter!(MetricName::NormalizeRecordsProcessed.as_str()).increment(size as u64);
        ::metrics::histogram!(MetricName::NormalizeBatchSize.as_str()).record(size as f64);
        ::metrics::histogram!(MetricName::NormalizeDuration.as_str()).record(secs);

        for (rule, count) in tally.entries() {
            if count > 0 {
                ::metrics::counter!(MetricName::NormalizeRulesApplied.as_str(), "rule" => rule.key())
                    .increment(count as u64);
            }
        }
    }
}

// ============================================================================
// Quality Gate Metrics
// ============================================================================

pub mod quality_gate {
    use super::MetricName;

    pub fn record_accepted() {
        ::metrics::counter!(MetricName::QualityGateRecordsAccepted.as_str()).increment(1);
    }

    pub fn record_accepted_with_warnings() {
        ::metrics::counter!(MetricName::QualityGateRecordsAcceptedWithWarnings.as_str()).increment(1);
    }

    pub fn record_flagged() {
        ::metrics::counter!(MetricName::QualityGateRecordsFlagged.as_str()).increment(1);
    }

    /// Record detected issues by type
    pub fn issues_detected(issue_type: &str, count: usize) {
        ::metrics::counter!(
            MetricName::QualityGateIssuesDetected.as_str(),
            "issue_type" => issue_type.to_string()
        )
        .increment(count as u64);
    }
}

// ============================================================================
// Coverage Metrics
// ============================================================================

pub mod coverage {
    use super::MetricName;

    /// Record one answered query and how many providers it matched, by tier
    pub fn query_answered(city: &str, matches_by_tier: &[(&'static str, usize)]) {
        ::metrics::counter!(MetricName::CoverageQueries.as_str(), "city" => city.to_string()).increment(1);
        for (tier, count) in matches_by_tier {
            ::metrics::counter!(
                MetricName::CoverageProvidersMatched.as_str(),
                "city" => city.to_string(),
                "tier" => *tier
            )
            .increment(*count as u64);
        }
    }
}

// ============================================================================
// Output Metrics
// ============================================================================

pub mod output {
    use super::MetricName;

    pub fn file_written(kind: &'static str, bytes: u64) {
        ::metrics::counter!(MetricName::OutputFilesWritten.as_str(), "kind" => kind).increment(1);
        ::metrics::histogram!(MetricName::OutputBytesWritten.as_str(), "kind" => kind).record(bytes as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let names: HashSet<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), MetricName::all_metrics().count());
        assert!(names.iter().all(|n| n.starts_with("phleb_")));
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(
            MetricName::QualityGateRecordsFlagged.to_string(),
            "phleb_quality_gate_records_flagged_total"
        );
    }
}
