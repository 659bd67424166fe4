use serde::{Deserialize, Serialize};

use crate::types::{is_absent, Field, ProviderRecord};

/// Quality assessment result from the Quality Gate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityAssessment {
    /// The quality gate decision
    pub decision: QualityDecision,
    /// Specific quality issues found
    pub issues: Vec<QualityIssue>,
    /// The quality rule set version used
    pub rule_version: String,
}

impl QualityAssessment {
    pub fn is_flagged(&self) -> bool {
        self.decision == QualityDecision::Flag
    }

    /// Whether an issue was raised against `field`
    pub fn has_issue_for(&self, field: Field) -> bool {
        self.issues.iter().any(|issue| issue.field == Some(field))
    }
}

/// Quality Gate decision for a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityDecision {
    /// Record is complete
    Accept,
    /// Record is usable but has location gaps
    AcceptWithWarnings,
    /// Record lacks a critical field and goes to the flagged output
    Flag,
}

/// Individual quality issue found during assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityIssue {
    pub issue_type: QualityIssueType,
    pub severity: QualitySeverity,
    /// Human-readable description of the issue
    pub description: String,
    pub field: Option<Field>,
    pub suggestion: Option<String>,
}

/// Types of quality issues that can be detected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityIssueType {
    /// Missing required data
    MissingData,
    /// City or state missing, so coverage and templates cannot use the record
    IncompleteGeography,
}

/// Severity levels for quality issues
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualitySeverity {
    Info,
    Warning,
    Error,
    /// Critical issue, record is flagged
    Critical,
}

/// Trait for implementing Quality Gate assessment logic
pub trait QualityGate {
    /// Assess a normalized provider record
    fn assess(&self, record: &ProviderRecord) -> QualityAssessment;
}

/// Configuration for Quality Gate assessment rules
#[derive(Debug, Clone)]
pub struct QualityGateConfig {
    /// Rule version identifier
    pub rule_version: String,
    /// Fields whose absence flags the record
    pub critical_fields: Vec<Field>,
    /// Fields whose absence only warns
    pub geography_fields: Vec<Field>,
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self {
            rule_version: "v1.0.0".to_string(),
            critical_fields: vec![Field::Name, Field::Phone],
            geography_fields: vec![Field::City, Field::State],
        }
    }
}

/// Default Quality Gate: flags records missing name or phone
#[derive(Debug, Clone, Default)]
pub struct DefaultQualityGate {
    pub config: QualityGateConfig,
}

impl DefaultQualityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QualityGateConfig) -> Self {
        Self { config }
    }

    fn missing_issue(field: Field, critical: bool) -> QualityIssue {
        let label = format!("{:?}", field).to_lowercase();
        if critical {
            QualityIssue {
                issue_type: QualityIssueType::MissingData,
                severity: QualitySeverity::Critical,
                description: format!("Provider {} is missing", label),
                field: Some(field),
                suggestion: Some(format!("Provider must have a {}", label)),
            }
        } else {
            QualityIssue {
                issue_type: QualityIssueType::IncompleteGeography,
                severity: QualitySeverity::Warning,
                description: format!("Provider {} is missing", label),
                field: Some(field),
                suggestion: Some("Coverage queries cannot match this provider".to_string()),
            }
        }
    }

    /// Determine quality decision based on issues
    fn determine_decision(issues: &[QualityIssue]) -> QualityDecision {
        if issues.iter().any(|i| i.severity == QualitySeverity::Critical) {
            return QualityDecision::Flag;
        }
        if issues.iter().any(|i| i.severity >= QualitySeverity::Warning) {
            return QualityDecision::AcceptWithWarnings;
        }
        QualityDecision::Accept
    }
}

impl QualityGate for DefaultQualityGate {
    fn assess(&self, record: &ProviderRecord) -> QualityAssessment {
        let mut issues = Vec::new();

        for field in &self.config.critical_fields {
            if is_absent(&record.get(*field)) {
                issues.push(Self::missing_issue(*field, true));
            }
        }
        for field in &self.config.geography_fields {
            if is_absent(&record.get(*field)) {
                issues.push(Self::missing_issue(*field, false));
            }
        }

        QualityAssessment {
            decision: Self::determine_decision(&issues),
            issues,
            rule_version: self.config.rule_version.clone(),
        }
    }
}

/// The flag predicate on its own: name or phone is blank.
pub fn is_flagged(record: &ProviderRecord) -> bool {
    is_absent(&record.name) || is_absent(&record.phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_provider() -> ProviderRecord {
        ProviderRecord {
            name: "Acme Labs".to_string(),
            phone: "(512) 555-0100".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_quality_gate_accepts_complete_provider() {
        let gate = DefaultQualityGate::new();
        let result = gate.assess(&complete_provider());
        assert_eq!(result.decision, QualityDecision::Accept);
        assert!(result.issues.is_empty());
        assert!(!is_flagged(&complete_provider()));
    }

    #[test]
    fn test_quality_gate_flags_missing_phone() {
        let gate = DefaultQualityGate::new();
        let mut record = complete_provider();
        record.phone = "  ".to_string();

        let result = gate.assess(&record);
        assert!(result.is_flagged());
        assert!(result.has_issue_for(Field::Phone));
        assert!(is_flagged(&record));
    }

    #[test]
    fn test_quality_gate_flags_nan_name() {
        let gate = DefaultQualityGate::new();
        let mut record = complete_provider();
        record.name = "nan".to_string();

        let result = gate.assess(&record);
        assert_eq!(result.decision, QualityDecision::Flag);
        assert_eq!(result.issues[0].issue_type, QualityIssueType::MissingData);
        assert_eq!(result.issues[0].severity, QualitySeverity::Critical);
    }

    #[test]
    fn test_quality_gate_warns_on_missing_state() {
        let gate = DefaultQualityGate::new();
        let mut record = complete_provider();
        record.state.clear();

        let result = gate.assess(&record);
        assert_eq!(result.decision, QualityDecision::AcceptWithWarnings);
        assert!(!result.is_flagged());
        assert!(result
            .issues
            .iter()
            .any(|i| i.issue_type == QualityIssueType::IncompleteGeography));
    }

    #[test]
    fn test_gate_and_predicate_agree() {
        let gate = DefaultQualityGate::new();
        let mut record = ProviderRecord::default();
        assert_eq!(gate.assess(&record).is_flagged(), is_flagged(&record));
        record.name = "Only Name".to_string();
        assert_eq!(gate.assess(&record).is_flagged(), is_flagged(&record));
        record.phone = "555".to_string();
        assert_eq!(gate.assess(&record).is_flagged(), is_flagged(&record));
        assert!(!is_flagged(&record));
    }
}
