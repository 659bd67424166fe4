//! Metro coverage classification.
//!
//! A provider counts toward a `(city, state)` query through exactly one tier. Exclusion of
//! non-mobile providers is checked before the nationwide flag.

use serde::Serialize;
use std::fmt;

use crate::error::{CleanerError, Result};
use crate::states::{self, UsState};
use crate::types::{Flag, ProviderRecord};

/// A metro to count providers for, with the state resolved to both spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageQuery {
    pub city: String,
    pub state: UsState,
}

impl CoverageQuery {
    /// Build a query from a city and a state abbreviation or full name.
    pub fn new(city: &str, state: &str) -> Result<Self> {
        let state = states::lookup(state).ok_or_else(|| CleanerError::UnknownState(state.trim().to_string()))?;
        Ok(Self {
            city: city.trim().to_string(),
            state,
        })
    }
}

impl fmt::Display for CoverageQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.state.abbreviation)
    }
}

/// How a single provider relates to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CoverageOutcome {
    /// Not a mobile phlebotomy provider
    Excluded,
    /// Different state and not nationwide
    OutOfArea,
    Nationwide,
    DirectCity,
    ServiceArea,
    /// Same state, no city evidence
    Regional,
}

impl CoverageOutcome {
    /// Whether the outcome counts toward the query total.
    pub fn is_covered(&self) -> bool {
        !matches!(self, CoverageOutcome::Excluded | CoverageOutcome::OutOfArea)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CoverageOutcome::Excluded => "excluded",
            CoverageOutcome::OutOfArea => "out_of_area",
            CoverageOutcome::Nationwide => "nationwide",
            CoverageOutcome::DirectCity => "direct_city",
            CoverageOutcome::ServiceArea => "service_area",
            CoverageOutcome::Regional => "regional",
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Classify one provider against one query.
pub fn classify(query: &CoverageQuery, record: &ProviderRecord) -> CoverageOutcome {
    if record.is_mobile_phlebotomy == Flag::No {
        return CoverageOutcome::Excluded;
    }
    if record.is_nationwide == Flag::Yes {
        return CoverageOutcome::Nationwide;
    }
    if !query.state.matches(&record.state) {
        return CoverageOutcome::OutOfArea;
    }
    if record.city.trim().to_lowercase() == query.city.to_lowercase() {
        return CoverageOutcome::DirectCity;
    }
    if contains_ignore_case(&record.verified_service_areas, &query.city)
        || contains_ignore_case(&record.validation_notes, &query.city)
    {
        return CoverageOutcome::ServiceArea;
    }
    CoverageOutcome::Regional
}

/// A provider counted toward a query, for the verbose listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageMatch {
    pub name: String,
    pub city: String,
    pub outcome: CoverageOutcome,
}

/// Per-query counts with the breakdown by tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub city: String,
    pub state: String,
    pub total: usize,
    pub nationwide: usize,
    pub direct_city: usize,
    pub service_area: usize,
    pub regional: usize,
    pub excluded: usize,
    pub out_of_area: usize,
    pub matches: Vec<CoverageMatch>,
}

impl CoverageReport {
    /// Direct city plus service-area matches
    pub fn city_specific(&self) -> usize {
        self.direct_city + self.service_area
    }

    fn add(&mut self, record: &ProviderRecord, outcome: CoverageOutcome) {
        match outcome {
            CoverageOutcome::Excluded => self.excluded += 1,
            CoverageOutcome::OutOfArea => self.out_of_area += 1,
            CoverageOutcome::Nationwide => self.nationwide += 1,
            CoverageOutcome::DirectCity => self.direct_city += 1,
            CoverageOutcome::ServiceArea => self.service_area += 1,
            CoverageOutcome::Regional => self.regional += 1,
        }
        if outcome.is_covered() {
            self.total += 1;
            self.matches.push(CoverageMatch {
                name: record.display_name().to_string(),
                city: record.city.trim().to_string(),
                outcome,
            });
        }
    }
}

/// Count the providers covering a query.
pub fn count_coverage(query: &CoverageQuery, records: &[ProviderRecord]) -> CoverageReport {
    let mut report = CoverageReport {
        city: query.city.clone(),
        state: query.state.abbreviation.to_string(),
        ..Default::default()
    };
    for record in records {
        report.add(record, classify(query, record));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn la() -> CoverageQuery {
        CoverageQuery::new("Los Angeles", "CA").unwrap()
    }

    fn provider(city: &str, state: &str) -> ProviderRecord {
        ProviderRecord {
            name: "Draw Co".to_string(),
            phone: "555-0100".to_string(),
            city: city.to_string(),
            state: state.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exclusion_beats_nationwide() {
        let mut record = provider("Los Angeles", "CA");
        record.is_nationwide = Flag::Yes;
        record.is_mobile_phlebotomy = Flag::No;

        assert_eq!(classify(&la(), &record), CoverageOutcome::Excluded);
        let report = count_coverage(&la(), &[record]);
        assert_eq!(report.total, 0);
        assert_eq!(report.excluded, 1);
    }

    #[test]
    fn test_service_area_match() {
        let mut record = provider("San Jose", "CA");
        record.verified_service_areas = "Los Angeles metro area".to_string();

        assert_eq!(classify(&la(), &record), CoverageOutcome::ServiceArea);
        assert_eq!(count_coverage(&la(), &[record]).total, 1);
    }

    #[test]
    fn test_validation_notes_also_match() {
        let mut record = provider("Pasadena", "California");
        record.validation_notes = "confirmed serving los angeles county".to_string();
        assert_eq!(classify(&la(), &record), CoverageOutcome::ServiceArea);
    }

    #[test]
    fn test_nationwide_ignores_state() {
        let mut record = provider("Miami", "FL");
        record.is_nationwide = Flag::Yes;
        assert_eq!(classify(&la(), &record), CoverageOutcome::Nationwide);
    }

    #[test]
    fn test_state_gate_accepts_full_name_and_rejects_other_states() {
        assert_eq!(
            classify(&la(), &provider("los angeles", " california ")),
            CoverageOutcome::DirectCity
        );
        assert_eq!(classify(&la(), &provider("Los Angeles", "NV")), CoverageOutcome::OutOfArea);
        assert_eq!(classify(&la(), &provider("Los Angeles", "")), CoverageOutcome::OutOfArea);
    }

    #[test]
    fn test_regional_fallback_counts_statewide() {
        let record = provider("Fresno", "CA");
        assert_eq!(classify(&la(), &record), CoverageOutcome::Regional);
    }

    #[test]
    fn test_report_breakdown() {
        let mut nationwide = provider("Boston", "MA");
        nationwide.is_nationwide = Flag::Yes;
        let mut service_area = provider("Long Beach", "CA");
        service_area.verified_service_areas = "Los Angeles".to_string();
        let records = vec![
            provider("Los Angeles", "CA"),
            service_area,
            provider("Fresno", "CA"),
            nationwide,
            provider("Austin", "TX"),
        ];

        let report = count_coverage(&la(), &records);
        assert_eq!(report.total, 4);
        assert_eq!(report.city_specific(), 2);
        assert_eq!(report.regional, 1);
        assert_eq!(report.nationwide, 1);
        assert_eq!(report.out_of_area, 1);
        assert_eq!(report.matches.len(), 4);
        assert_eq!(report.state, "CA");
    }

    #[test]
    fn test_unknown_query_state_is_an_error() {
        let err = CoverageQuery::new("Gotham", "Atlantis").unwrap_err();
        assert!(matches!(err, CleanerError::UnknownState(ref s) if s == "Atlantis"));
    }
}
