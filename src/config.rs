use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;
use crate::error::{CleanerError, Result};
use crate::types::{is_absent, Field, Flag};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub columns: ColumnMap,
    pub defaults: DefaultsConfig,
    pub bio: BioConfig,
    pub metros: Vec<MetroConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(constants::DEFAULT_INPUT_FILE),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub canonical_file: String,
    pub flagged_file: String,
    pub projection_file: String,
    /// Where to write the Prometheus text rendering of the run's metrics, if anywhere
    pub metrics_snapshot: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            canonical_file: constants::CANONICAL_FILE.to_string(),
            flagged_file: constants::FLAGGED_FILE.to_string(),
            projection_file: constants::PROJECTION_FILE.to_string(),
            metrics_snapshot: None,
        }
    }
}

impl OutputConfig {
    pub fn canonical_path(&self) -> PathBuf {
        self.dir.join(&self.canonical_file)
    }

    pub fn flagged_path(&self) -> PathBuf {
        self.dir.join(&self.flagged_file)
    }

    pub fn projection_path(&self) -> PathBuf {
        self.dir.join(&self.projection_file)
    }
}

/// Header names for each column the engine understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub languages: String,
    pub bio: String,
    pub certifications: String,
    pub emergency_available: String,
    pub weekend_available: String,
    pub regions_serviced: String,
    pub testimonials: String,
    pub insurance_amount: String,
    pub is_mobile_phlebotomy: String,
    pub is_nationwide: String,
    pub verified_service_areas: String,
    pub validation_notes: String,
    // Optional pass-through columns read by the JSON projection
    pub website: String,
    pub street: String,
    pub zip: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: constants::COL_NAME.to_string(),
            phone: constants::COL_PHONE.to_string(),
            email: constants::COL_EMAIL.to_string(),
            city: constants::COL_CITY.to_string(),
            state: constants::COL_STATE.to_string(),
            languages: constants::COL_LANGUAGES.to_string(),
            bio: constants::COL_BIO.to_string(),
            certifications: constants::COL_CERTIFICATIONS.to_string(),
            emergency_available: constants::COL_EMERGENCY_AVAILABLE.to_string(),
            weekend_available: constants::COL_WEEKEND_AVAILABLE.to_string(),
            regions_serviced: constants::COL_REGIONS_SERVICED.to_string(),
            testimonials: constants::COL_TESTIMONIALS.to_string(),
            insurance_amount: constants::COL_INSURANCE_AMOUNT.to_string(),
            is_mobile_phlebotomy: constants::COL_IS_MOBILE_PHLEBOTOMY.to_string(),
            is_nationwide: constants::COL_IS_NATIONWIDE.to_string(),
            verified_service_areas: constants::COL_VERIFIED_SERVICE_AREAS.to_string(),
            validation_notes: constants::COL_VALIDATION_NOTES.to_string(),
            website: constants::COL_WEBSITE.to_string(),
            street: constants::COL_STREET.to_string(),
            zip: constants::COL_ZIP.to_string(),
        }
    }
}

impl ColumnMap {
    pub fn header_for(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Languages => &self.languages,
            Field::Bio => &self.bio,
            Field::Certifications => &self.certifications,
            Field::EmergencyAvailable => &self.emergency_available,
            Field::WeekendAvailable => &self.weekend_available,
            Field::RegionsServiced => &self.regions_serviced,
            Field::Testimonials => &self.testimonials,
            Field::InsuranceAmount => &self.insurance_amount,
            Field::IsMobilePhlebotomy => &self.is_mobile_phlebotomy,
            Field::IsNationwide => &self.is_nationwide,
            Field::VerifiedServiceAreas => &self.verified_service_areas,
            Field::ValidationNotes => &self.validation_notes,
        }
    }

    /// Which known field a header belongs to, if any.
    pub fn field_for(&self, header: &str) -> Option<Field> {
        let header = header.trim();
        Field::ALL.into_iter().find(|field| self.header_for(*field) == header)
    }

    /// Headers of `required` fields that do not appear in `headers`.
    pub fn missing<'a>(&'a self, headers: &[String], required: &[Field]) -> Vec<&'a str> {
        required
            .iter()
            .map(|field| self.header_for(*field))
            .filter(|wanted| !headers.iter().any(|h| h.trim() == *wanted))
            .collect()
    }
}

/// Values written into empty fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub languages: String,
    pub certifications: String,
    pub insurance_phrase: String,
    pub emergency_available: Flag,
    pub weekend_available: Flag,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            languages: constants::DEFAULT_LANGUAGES.to_string(),
            certifications: constants::DEFAULT_CERTIFICATIONS.to_string(),
            insurance_phrase: constants::DEFAULT_INSURANCE_PHRASE.to_string(),
            emergency_available: Flag::No,
            weekend_available: Flag::Yes,
        }
    }
}

/// Limits for the bio readability pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BioConfig {
    pub max_chars: usize,
    pub max_sentence_repeats: usize,
    pub max_char_run: usize,
}

impl Default for BioConfig {
    fn default() -> Self {
        Self {
            max_chars: constants::BIO_MAX_CHARS,
            max_sentence_repeats: constants::BIO_MAX_SENTENCE_REPEATS,
            max_char_run: constants::BIO_MAX_CHAR_RUN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetroConfig {
    pub city: String,
    pub state: String,
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            CleanerError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Pick the config for this run: an explicit path, then `PHLEBOTOMY_CLEANER_CONFIG`, then
    /// `config.toml` if it exists, then built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(env_path) = std::env::var(constants::CONFIG_PATH_ENV) {
            return Self::load(Path::new(&env_path));
        }
        let default_path = Path::new(constants::DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::load(default_path);
        }
        info!("No config file found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.input.delimiter.is_ascii() {
            return Err(CleanerError::Config(format!(
                "Delimiter '{}' must be a single ASCII character",
                self.input.delimiter
            )));
        }
        if self.bio.max_chars <= constants::ELLIPSIS.len() {
            return Err(CleanerError::Config(format!(
                "bio.max_chars must be greater than {}",
                constants::ELLIPSIS.len()
            )));
        }
        if self.bio.max_sentence_repeats == 0 {
            return Err(CleanerError::Config(
                "bio.max_sentence_repeats must be at least 1".to_string(),
            ));
        }
        // A shorter run limit would eat the truncation ellipsis on the next run
        if self.bio.max_char_run < constants::ELLIPSIS.len() {
            return Err(CleanerError::Config(format!(
                "bio.max_char_run must be at least {}",
                constants::ELLIPSIS.len()
            )));
        }

        // A blank default would fill empty cells with another empty value
        let fills = [
            ("defaults.languages", self.defaults.languages.as_str()),
            ("defaults.certifications", self.defaults.certifications.as_str()),
            ("defaults.insurance_phrase", self.defaults.insurance_phrase.as_str()),
        ];
        if let Some((key, _)) = fills.iter().find(|(_, value)| is_absent(value)) {
            return Err(CleanerError::Config(format!("{} must not be blank", key)));
        }
        for (key, flag) in [
            ("defaults.emergency_available", self.defaults.emergency_available),
            ("defaults.weekend_available", self.defaults.weekend_available),
        ] {
            if !flag.is_set() {
                return Err(CleanerError::Config(format!("{} must be Yes or No", key)));
            }
        }

        let mut seen = HashSet::new();
        for field in Field::ALL {
            let header = self.columns.header_for(field).trim();
            if header.is_empty() {
                return Err(CleanerError::Config(format!("Column name for {:?} is empty", field)));
            }
            if !seen.insert(header) {
                return Err(CleanerError::Config(format!("Column '{}' is mapped twice", header)));
            }
        }
        Ok(())
    }

    pub fn delimiter(&self) -> u8 {
        // validate() guarantees ASCII
        self.input.delimiter as u8
    }

    /// Configured metros, or the built-in top-ten list.
    pub fn metro_queries(&self) -> Vec<MetroConfig> {
        if !self.metros.is_empty() {
            return self.metros.clone();
        }
        constants::DEFAULT_METROS
            .iter()
            .map(|(city, state)| MetroConfig {
                city: city.to_string(),
                state: state.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [columns]
            regions_serviced = "regionsServiced"

            [bio]
            max_chars = 500

            [[metros]]
            city = "Detroit"
            state = "MI"
            "#,
        )
        .unwrap();

        assert_eq!(config.columns.regions_serviced, "regionsServiced");
        assert_eq!(config.columns.name, "name");
        assert_eq!(config.bio.max_chars, 500);
        assert_eq!(config.bio.max_sentence_repeats, 2);
        assert_eq!(config.defaults.weekend_available, Flag::Yes);
        assert_eq!(config.metro_queries().len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_metros() {
        let metros = Config::default().metro_queries();
        assert_eq!(metros.len(), 10);
        assert_eq!(metros[0].city, "Los Angeles");
    }

    #[test]
    fn test_validate_rejects_duplicate_columns() {
        let mut config = Config::default();
        config.columns.bio = "name".to_string();
        assert!(matches!(config.validate(), Err(CleanerError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_tiny_bio_limit() {
        let mut config = Config::default();
        config.bio.max_chars = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_defaults() {
        for blank in ["", "   ", "nan"] {
            let mut config = Config::default();
            config.defaults.certifications = blank.to_string();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("defaults.certifications"));
        }

        let config: Config = toml::from_str(
            r#"
            [defaults]
            languages = ""
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(CleanerError::Config(_))));

        let mut config = Config::default();
        config.defaults.weekend_available = Flag::Unset;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_column_lookup_and_missing() {
        let columns = ColumnMap::default();
        assert_eq!(columns.field_for("regions serviced"), Some(Field::RegionsServiced));
        assert_eq!(columns.field_for("website"), None);

        let headers = vec!["name".to_string(), "phone".to_string()];
        let missing = columns.missing(&headers, &[Field::Name, Field::Phone, Field::Email]);
        assert_eq!(missing, vec!["email"]);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }
}
