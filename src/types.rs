use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Whether a cell counts as missing: empty, whitespace-only, or the literal `nan`
/// that dataframe exports leave behind.
pub fn is_absent(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Yes/No/unset flag. Only the I/O boundary sees the `"Yes"`/`"No"`/`""` strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    Yes,
    No,
    #[default]
    Unset,
}

impl Flag {
    /// Parse a cell value. Unrecognized text is treated as unset.
    pub fn parse(value: &str) -> Self {
        if is_absent(value) {
            return Flag::Unset;
        }
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "1" => Flag::Yes,
            "no" | "n" | "false" | "0" => Flag::No,
            other => {
                warn!(value = other, "Unrecognized yes/no value, treating as unset");
                Flag::Unset
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Yes => "Yes",
            Flag::No => "No",
            Flag::Unset => "",
        }
    }

    pub fn is_set(&self) -> bool {
        *self != Flag::Unset
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns the engine understands. Header names for each are configured in `ColumnMap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Name,
    Phone,
    Email,
    City,
    State,
    Languages,
    Bio,
    Certifications,
    EmergencyAvailable,
    WeekendAvailable,
    RegionsServiced,
    Testimonials,
    InsuranceAmount,
    IsMobilePhlebotomy,
    IsNationwide,
    VerifiedServiceAreas,
    ValidationNotes,
}

impl Field {
    /// Columns the field normalizer and validator read or write.
    pub const CLEANING: [Field; 13] = [
        Field::Name,
        Field::Phone,
        Field::Email,
        Field::City,
        Field::State,
        Field::Languages,
        Field::Bio,
        Field::Certifications,
        Field::EmergencyAvailable,
        Field::WeekendAvailable,
        Field::RegionsServiced,
        Field::Testimonials,
        Field::InsuranceAmount,
    ];

    pub const ALL: [Field; 17] = [
        Field::Name,
        Field::Phone,
        Field::Email,
        Field::City,
        Field::State,
        Field::Languages,
        Field::Bio,
        Field::Certifications,
        Field::EmergencyAvailable,
        Field::WeekendAvailable,
        Field::RegionsServiced,
        Field::Testimonials,
        Field::InsuranceAmount,
        Field::IsMobilePhlebotomy,
        Field::IsNationwide,
        Field::VerifiedServiceAreas,
        Field::ValidationNotes,
    ];
}

/// One provider row of the directory table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub languages: String,
    pub bio: String,
    pub certifications: String,
    pub emergency_available: Flag,
    pub weekend_available: Flag,
    pub regions_serviced: String,
    pub testimonials: String,
    pub insurance_amount: String,
    pub is_mobile_phlebotomy: Flag,
    pub is_nationwide: Flag,
    pub verified_service_areas: String,
    pub validation_notes: String,
    /// Columns the engine does not interpret, keyed by header, carried through unchanged
    pub passthrough: BTreeMap<String, String>,
}

impl ProviderRecord {
    pub fn get(&self, field: Field) -> Cow<'_, str> {
        let text = match field {
            Field::Name => &self.name,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Languages => &self.languages,
            Field::Bio => &self.bio,
            Field::Certifications => &self.certifications,
            Field::RegionsServiced => &self.regions_serviced,
            Field::Testimonials => &self.testimonials,
            Field::InsuranceAmount => &self.insurance_amount,
            Field::VerifiedServiceAreas => &self.verified_service_areas,
            Field::ValidationNotes => &self.validation_notes,
            Field::EmergencyAvailable => return Cow::Borrowed(self.emergency_available.as_str()),
            Field::WeekendAvailable => return Cow::Borrowed(self.weekend_available.as_str()),
            Field::IsMobilePhlebotomy => return Cow::Borrowed(self.is_mobile_phlebotomy.as_str()),
            Field::IsNationwide => return Cow::Borrowed(self.is_nationwide.as_str()),
        };
        Cow::Borrowed(text.as_str())
    }

    pub fn set(&mut self, field: Field, value: &str) {
        let value = value.to_string();
        match field {
            Field::Name => self.name = value,
            Field::Phone => self.phone = value,
            Field::Email => self.email = value,
            Field::City => self.city = value,
            Field::State => self.state = value,
            Field::Languages => self.languages = value,
            Field::Bio => self.bio = value,
            Field::Certifications => self.certifications = value,
            Field::RegionsServiced => self.regions_serviced = value,
            Field::Testimonials => self.testimonials = value,
            Field::InsuranceAmount => self.insurance_amount = value,
            Field::VerifiedServiceAreas => self.verified_service_areas = value,
            Field::ValidationNotes => self.validation_notes = value,
            Field::EmergencyAvailable => self.emergency_available = Flag::parse(&value),
            Field::WeekendAvailable => self.weekend_available = Flag::parse(&value),
            Field::IsMobilePhlebotomy => self.is_mobile_phlebotomy = Flag::parse(&value),
            Field::IsNationwide => self.is_nationwide = Flag::parse(&value),
        }
    }

    /// Name, city and state are all present, so a bio/region can be synthesized.
    pub fn has_location_identity(&self) -> bool {
        !is_absent(&self.name) && !is_absent(&self.city) && !is_absent(&self.state)
    }

    /// Label used in reports; falls back for rows with no name.
    pub fn display_name(&self) -> &str {
        if is_absent(&self.name) {
            "[NO NAME]"
        } else {
            self.name.trim()
        }
    }
}

/// The full record set with the header row it was read with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderTable {
    pub headers: Vec<String>,
    pub records: Vec<ProviderRecord>,
}

impl ProviderTable {
    pub fn new(headers: Vec<String>, records: Vec<ProviderRecord>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same headers, a different set of rows.
    pub fn with_records(&self, records: Vec<ProviderRecord>) -> Self {
        Self {
            headers: self.headers.clone(),
            records,
        }
    }
}
