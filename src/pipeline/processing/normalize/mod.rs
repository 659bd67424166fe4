use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{BioConfig, DefaultsConfig};
use crate::types::{is_absent, Flag, ProviderRecord};

pub mod bio;
pub mod contamination;

pub use contamination::{contains_place_id, scrub_place_ids};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

/// Whether an email address is well formed enough to keep.
pub fn is_valid_email(email: &str) -> bool {
    !is_absent(email) && EMAIL_RE.is_match(email)
}

/// Individual cleaning rules, used to label tally entries, metrics and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizationRule {
    EmailCleared,
    LanguagesDefaulted,
    TestimonialsCleared,
    InsuranceAmountReplaced,
    BioScrubbed,
    BioCreated,
    BioExpanded,
    BioAsteriskRemoved,
    BioCondensed,
    BioTruncated,
    CertificationsDefaulted,
    EmergencyAvailableDefaulted,
    WeekendAvailableDefaulted,
    RegionsServicedCreated,
}

impl NormalizationRule {
    pub const ALL: [NormalizationRule; 14] = [
        NormalizationRule::EmailCleared,
        NormalizationRule::LanguagesDefaulted,
        NormalizationRule::TestimonialsCleared,
        NormalizationRule::InsuranceAmountReplaced,
        NormalizationRule::BioScrubbed,
        NormalizationRule::BioCreated,
        NormalizationRule::BioExpanded,
        NormalizationRule::BioAsteriskRemoved,
        NormalizationRule::BioCondensed,
        NormalizationRule::BioTruncated,
        NormalizationRule::CertificationsDefaulted,
        NormalizationRule::EmergencyAvailableDefaulted,
        NormalizationRule::WeekendAvailableDefaulted,
        NormalizationRule::RegionsServicedCreated,
    ];

    /// Stable snake_case key for metric labels
    pub fn key(&self) -> &'static str {
        match self {
            NormalizationRule::EmailCleared => "emails_cleaned",
            NormalizationRule::LanguagesDefaulted => "languages_set",
            NormalizationRule::TestimonialsCleared => "testimonials_cleaned",
            NormalizationRule::InsuranceAmountReplaced => "insurance_amount_cleaned",
            NormalizationRule::BioScrubbed => "bio_scrubbed",
            NormalizationRule::BioCreated => "bio_created",
            NormalizationRule::BioExpanded => "bio_expanded",
            NormalizationRule::BioAsteriskRemoved => "bio_asterisk_removed",
            NormalizationRule::BioCondensed => "bio_condensed",
            NormalizationRule::BioTruncated => "bio_truncated",
            NormalizationRule::CertificationsDefaulted => "certifications_set",
            NormalizationRule::EmergencyAvailableDefaulted => "emergency_available_set",
            NormalizationRule::WeekendAvailableDefaulted => "weekend_available_set",
            NormalizationRule::RegionsServicedCreated => "regions_serviced_set",
        }
    }
}

impl fmt::Display for NormalizationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NormalizationRule::EmailCleared => "Emails cleaned (set to empty)",
            NormalizationRule::LanguagesDefaulted => "Languages set to default",
            NormalizationRule::TestimonialsCleared => "Testimonials with place IDs removed",
            NormalizationRule::InsuranceAmountReplaced => "Insurance amounts with place IDs fixed",
            NormalizationRule::BioScrubbed => "Bios with place IDs scrubbed",
            NormalizationRule::BioCreated => "Bios created from template",
            NormalizationRule::BioExpanded => "Bios expanded from short text",
            NormalizationRule::BioAsteriskRemoved => "Bios with asterisks removed",
            NormalizationRule::BioCondensed => "Bios condensed for readability",
            NormalizationRule::BioTruncated => "Bios truncated",
            NormalizationRule::CertificationsDefaulted => "Certifications set to default",
            NormalizationRule::EmergencyAvailableDefaulted => "Emergency available defaulted",
            NormalizationRule::WeekendAvailableDefaulted => "Weekend available defaulted",
            NormalizationRule::RegionsServicedCreated => "Regions serviced generated",
        };
        f.write_str(label)
    }
}

/// How many times each rule changed a record. Tallies add up across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationTally {
    counts: [usize; 14],
}

impl NormalizationTally {
    fn slot(rule: NormalizationRule) -> usize {
        NormalizationRule::ALL
            .iter()
            .position(|r| *r == rule)
            .unwrap_or_default()
    }

    pub fn record(&mut self, rule: NormalizationRule) {
        self.counts[Self::slot(rule)] += 1;
    }

    pub fn get(&self, rule: NormalizationRule) -> usize {
        self.counts[Self::slot(rule)]
    }

    pub fn merge(&mut self, other: &NormalizationTally) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    /// Total rule applications
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = (NormalizationRule, usize)> + '_ {
        NormalizationRule::ALL.iter().map(move |rule| (*rule, self.get(*rule)))
    }
}

/// A record in canonical form plus the rules that fired to get it there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub record: ProviderRecord,
    pub tally: NormalizationTally,
}

/// Trait for turning raw provider rows into canonical ones
pub trait Normalizer {
    fn normalize(&self, record: &ProviderRecord) -> NormalizedRecord;
}

/// Normalize a whole record set, keeping order and count.
pub fn normalize_batch(
    normalizer: &dyn Normalizer,
    records: &[ProviderRecord],
) -> (Vec<ProviderRecord>, NormalizationTally) {
    let mut tally = NormalizationTally::default();
    let records = records
        .iter()
        .map(|record| {
            let normalized = normalizer.normalize(record);
            tally.merge(&normalized.tally);
            normalized.record
        })
        .collect();
    (records, tally)
}

/// Field rules for the provider directory.
///
/// Rules run in a fixed order because the bio and region defaults read the city and
/// state fields. Every rule leaves an already-clean value untouched.
#[derive(Debug, Clone, Default)]
pub struct DefaultNormalizer {
    pub defaults: DefaultsConfig,
    pub bio_limits: BioConfig,
}

impl DefaultNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(defaults: DefaultsConfig, bio_limits: BioConfig) -> Self {
        Self {
            defaults,
            bio_limits,
        }
    }

    fn clean_email(&self, record: &mut ProviderRecord, tally: &mut NormalizationTally) {
        if !is_valid_email(&record.email) && !record.email.is_empty() {
            record.email.clear();
            tally.record(NormalizationRule::EmailCleared);
        }
    }

    fn fill_text(
        value: &mut String,
        default: &str,
        rule: NormalizationRule,
        tally: &mut NormalizationTally,
    ) {
        if is_absent(value) {
            *value = default.to_string();
            tally.record(rule);
        }
    }

    fn fill_flag(value: &mut Flag, default: Flag, rule: NormalizationRule, tally: &mut NormalizationTally) {
        if !value.is_set() {
            *value = default;
            tally.record(rule);
        }
    }

    fn clean_testimonials(&self, record: &mut ProviderRecord, tally: &mut NormalizationTally) {
        if contains_place_id(&record.testimonials) {
            record.testimonials.clear();
            tally.record(NormalizationRule::TestimonialsCleared);
        }
    }

    fn clean_insurance_amount(&self, record: &mut ProviderRecord, tally: &mut NormalizationTally) {
        if contains_place_id(&record.insurance_amount) {
            record.insurance_amount = self.defaults.insurance_phrase.clone();
            tally.record(NormalizationRule::InsuranceAmountReplaced);
        }
    }

    fn clean_bio(&self, record: &mut ProviderRecord, tally: &mut NormalizationTally) {
        // A contaminated name would otherwise carry an identifier into the template
        let template = record
            .has_location_identity()
            .then(|| scrub_place_ids(&bio::synthesize(&record.name, &record.city, &record.state)));

        let mut text = record.bio.clone();

        if contains_place_id(&text) {
            text = scrub_place_ids(&text);
            tally.record(NormalizationRule::BioScrubbed);
        }

        if !is_absent(&text) {
            let stripped = bio::strip_trailing_asterisks(&text);
            if stripped.len() != text.trim_end().len() {
                tally.record(NormalizationRule::BioAsteriskRemoved);
            }
            text = stripped.to_string();
        }

        // Readability pass never touches the template itself
        if !is_absent(&text) && template.as_deref() != Some(text.as_str()) {
            let condensed = bio::condense(&text, &self.bio_limits);
            if condensed.text != text {
                text = condensed.text;
                tally.record(NormalizationRule::BioCondensed);
                if condensed.truncated {
                    tally.record(NormalizationRule::BioTruncated);
                }
            }
        }

        if let Some(template) = &template {
            if !is_absent(&text) && bio::is_location_placeholder(&text, &record.city, &record.state) {
                text = template.clone();
                tally.record(NormalizationRule::BioExpanded);
            } else if is_absent(&text) {
                text = template.clone();
                tally.record(NormalizationRule::BioCreated);
            }
        }

        record.bio = text;
    }

    fn fill_regions_serviced(&self, record: &mut ProviderRecord, tally: &mut NormalizationTally) {
        if is_absent(&record.regions_serviced) && !is_absent(&record.city) && !is_absent(&record.state) {
            record.regions_serviced = format!("{}, {} area", record.city.trim(), record.state.trim());
            tally.record(NormalizationRule::RegionsServicedCreated);
        }
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, record: &ProviderRecord) -> NormalizedRecord {
        let mut record = record.clone();
        let mut tally = NormalizationTally::default();

        self.clean_email(&mut record, &mut tally);
        Self::fill_text(
            &mut record.languages,
            &self.defaults.languages,
            NormalizationRule::LanguagesDefaulted,
            &mut tally,
        );
        self.clean_testimonials(&mut record, &mut tally);
        self.clean_insurance_amount(&mut record, &mut tally);
        self.clean_bio(&mut record, &mut tally);
        Self::fill_text(
            &mut record.certifications,
            &self.defaults.certifications,
            NormalizationRule::CertificationsDefaulted,
            &mut tally,
        );
        Self::fill_flag(
            &mut record.emergency_available,
            self.defaults.emergency_available,
            NormalizationRule::EmergencyAvailableDefaulted,
            &mut tally,
        );
        Self::fill_flag(
            &mut record.weekend_available,
            self.defaults.weekend_available,
            NormalizationRule::WeekendAvailableDefaulted,
            &mut tally,
        );
        self.fill_regions_serviced(&mut record, &mut tally);

        NormalizedRecord { record, tally }
    }
}
