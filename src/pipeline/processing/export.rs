//! Projection of canonical records into the website's provider documents.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ColumnMap;
use crate::constants::{PROJECTION_BADGES, PROJECTION_PAYMENT, PROJECTION_SERVICES};
use crate::types::{is_absent, Flag, ProviderRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDocument {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub description: String,
    pub services: Vec<String>,
    pub coverage: CoverageDocument,
    pub address: AddressDocument,
    pub availability: Vec<String>,
    pub languages: Vec<String>,
    pub certifications: String,
    pub payment: Vec<String>,
    pub badges: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageDocument {
    pub states: Vec<String>,
    pub cities: Vec<String>,
    pub regions: Vec<String>,
    pub nationwide: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressDocument {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// URL slug: lowercase, spaces to `-`, `&` to `and`, commas and periods dropped.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "-")
        .replace('&', "and")
        .replace([',', '.'], "")
}

fn present(value: &str) -> Vec<String> {
    if is_absent(value) {
        Vec::new()
    } else {
        vec![value.trim().to_string()]
    }
}

/// Trimmed value, or `""` for a missing one
fn text(value: &str) -> String {
    if is_absent(value) {
        String::new()
    } else {
        value.trim().to_string()
    }
}

fn passthrough(record: &ProviderRecord, header: &str) -> String {
    record.passthrough.get(header).map(|v| text(v)).unwrap_or_default()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Build the document for the record at zero-based `index`.
pub fn project_record(
    index: usize,
    record: &ProviderRecord,
    columns: &ColumnMap,
    generated_at: DateTime<Utc>,
) -> ProviderDocument {
    let timestamp = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut availability = vec!["Weekdays".to_string()];
    if record.weekend_available == Flag::Yes {
        availability.push("Weekends".to_string());
    }
    if record.emergency_available == Flag::Yes {
        availability.push("Emergency".to_string());
    }

    let languages = record
        .languages
        .split(',')
        .map(str::trim)
        .filter(|l| !is_absent(l))
        .map(str::to_string)
        .collect();

    let name = text(&record.name);
    ProviderDocument {
        id: (index + 1).to_string(),
        slug: slugify(&name),
        name,
        phone: text(&record.phone),
        email: text(&record.email),
        website: passthrough(record, &columns.website),
        description: text(&record.bio),
        services: to_strings(&PROJECTION_SERVICES),
        coverage: CoverageDocument {
            states: present(&record.state),
            cities: present(&record.city),
            regions: present(&record.regions_serviced),
            nationwide: record.is_nationwide == Flag::Yes,
        },
        address: AddressDocument {
            street: passthrough(record, &columns.street),
            city: text(&record.city),
            state: text(&record.state),
            zip: passthrough(record, &columns.zip),
        },
        availability,
        languages,
        certifications: text(&record.certifications),
        payment: to_strings(&PROJECTION_PAYMENT),
        badges: to_strings(&PROJECTION_BADGES),
        created_at: timestamp.clone(),
        updated_at: timestamp,
    }
}

/// Project the whole canonical set, in order.
pub fn project(records: &[ProviderRecord], columns: &ColumnMap, generated_at: DateTime<Utc>) -> Vec<ProviderDocument> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| project_record(index, record, columns, generated_at))
        .collect()
}
