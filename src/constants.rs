/// Default values and header names shared across the codebase.
/// Column names mirror the places crawler export; they can be overridden in `config.toml`.

// Default column headers (crawler/enrichment contract)
pub const COL_NAME: &str = "name";
pub const COL_PHONE: &str = "phone";
pub const COL_EMAIL: &str = "email";
pub const COL_CITY: &str = "city";
pub const COL_STATE: &str = "state";
pub const COL_LANGUAGES: &str = "languages";
pub const COL_BIO: &str = "bio";
pub const COL_CERTIFICATIONS: &str = "certifications";
pub const COL_EMERGENCY_AVAILABLE: &str = "emergencyAvailable";
pub const COL_WEEKEND_AVAILABLE: &str = "weekendAvailable";
pub const COL_REGIONS_SERVICED: &str = "regions serviced";
pub const COL_TESTIMONIALS: &str = "testimonials";
pub const COL_INSURANCE_AMOUNT: &str = "insuranceAmount";
pub const COL_IS_MOBILE_PHLEBOTOMY: &str = "is_mobile_phlebotomy";
pub const COL_IS_NATIONWIDE: &str = "is_nationwide";
pub const COL_VERIFIED_SERVICE_AREAS: &str = "verified_service_areas";
pub const COL_VALIDATION_NOTES: &str = "validation_notes";

// Optional pass-through columns used by the JSON projection
pub const COL_WEBSITE: &str = "website";
pub const COL_STREET: &str = "street";
pub const COL_ZIP: &str = "zip";

// Field defaults
pub const DEFAULT_LANGUAGES: &str = "English";
pub const DEFAULT_CERTIFICATIONS: &str = "ASCP Certified";
pub const DEFAULT_INSURANCE_PHRASE: &str = "Licensed and Insured";

// Bio readability limits
pub const BIO_MAX_CHARS: usize = 800;
pub const BIO_MAX_SENTENCE_REPEATS: usize = 2;
pub const BIO_MAX_CHAR_RUN: usize = 3;
pub const ELLIPSIS: &str = "...";

// Output file names
pub const DEFAULT_INPUT_FILE: &str = "fully_enriched_providers_batch.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const CANONICAL_FILE: &str = "cleaned_providers.csv";
pub const FLAGGED_FILE: &str = "flagged_providers.csv";
pub const PROJECTION_FILE: &str = "providers.json";

// Config lookup
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "PHLEBOTOMY_CLEANER_CONFIG";

/// Metro areas checked by default when no `[[metros]]` are configured: (city, state abbreviation)
pub const DEFAULT_METROS: [(&str, &str); 10] = [
    ("Los Angeles", "CA"),
    ("New York", "NY"),
    ("Chicago", "IL"),
    ("Houston", "TX"),
    ("Phoenix", "AZ"),
    ("Philadelphia", "PA"),
    ("San Antonio", "TX"),
    ("San Diego", "CA"),
    ("Dallas", "TX"),
    ("Austin", "TX"),
];

// JSON projection enumerations
pub const PROJECTION_SERVICES: [&str; 3] = ["At-Home Blood Draw", "Specimen Pickup", "Lab Partner"];
pub const PROJECTION_PAYMENT: [&str; 2] = ["Cash", "Major Insurance"];
pub const PROJECTION_BADGES: [&str; 2] = ["Certified", "Insured"];
