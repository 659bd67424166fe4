//! Post-cleaning checks over the canonical table.
//!
//! A clean run reports no violations; anything found here means a rule did not hold.

use std::fmt;

use crate::pipeline::processing::normalize::{contains_place_id, is_valid_email};
use crate::types::{is_absent, Field, ProviderRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    InvalidEmail,
    Contaminated(Field),
    EmptyDefault(Field),
    MissingBio,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InvalidEmail => write!(f, "email is neither empty nor valid"),
            Violation::Contaminated(field) => write!(f, "{:?} still has place IDs", field),
            Violation::EmptyDefault(field) => write!(f, "{:?} is still empty", field),
            Violation::MissingBio => write!(f, "bio is empty despite name, city and state"),
        }
    }
}

/// Violations found in one canonical record
pub fn check_record(record: &ProviderRecord) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !record.email.is_empty() && !is_valid_email(&record.email) {
        violations.push(Violation::InvalidEmail);
    }
    for field in [Field::Testimonials, Field::InsuranceAmount, Field::Bio] {
        if contains_place_id(&record.get(field)) {
            violations.push(Violation::Contaminated(field));
        }
    }
    for field in [
        Field::Languages,
        Field::Certifications,
        Field::EmergencyAvailable,
        Field::WeekendAvailable,
    ] {
        if is_absent(&record.get(field)) {
            violations.push(Violation::EmptyDefault(field));
        }
    }
    if record.has_location_identity() && is_absent(&record.bio) {
        violations.push(Violation::MissingBio);
    }

    violations
}

/// Violation counts across the canonical table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub records_checked: usize,
    pub violations: Vec<(Violation, usize)>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn verify(records: &[ProviderRecord]) -> VerificationReport {
    let mut report = VerificationReport {
        records_checked: records.len(),
        ..Default::default()
    };
    for violation in records.iter().flat_map(check_record) {
        match report.violations.iter_mut().find(|(v, _)| *v == violation) {
            Some((_, count)) => *count += 1,
            None => report.violations.push((violation, 1)),
        }
    }
    report
}
