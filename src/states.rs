/// US state abbreviation <-> full name lookup used by the coverage classifier.
const STATES: [(&str, &str); 51] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// A state in both of the spellings records use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsState {
    pub abbreviation: &'static str,
    pub name: &'static str,
}

impl UsState {
    /// Whether a free-text state value names this state in either form.
    pub fn matches(&self, value: &str) -> bool {
        let value = value.trim();
        value.eq_ignore_ascii_case(self.abbreviation) || value.eq_ignore_ascii_case(self.name)
    }
}

/// Resolve an abbreviation or full name (any case) to a state.
pub fn lookup(value: &str) -> Option<UsState> {
    let value = value.trim();
    STATES
        .iter()
        .find(|(abbr, name)| value.eq_ignore_ascii_case(abbr) || value.eq_ignore_ascii_case(name))
        .map(|(abbreviation, name)| UsState { abbreviation, name })
}
