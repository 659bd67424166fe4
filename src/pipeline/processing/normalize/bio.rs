//! Bio synthesis and the readability pass.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::config::BioConfig;
use crate::constants::ELLIPSIS;

static SENTENCE_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence split pattern is valid"));

fn is_sentence_punctuation(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// The fallback bio used when a provider has none.
pub fn synthesize(name: &str, city: &str, state: &str) -> String {
    format!(
        "{} provides mobile phlebotomy services in {}, {}.",
        name.trim(),
        city.trim(),
        state.trim()
    )
}

/// Strip the trailing run of `*` left by truncated crawler snippets, along with any
/// whitespace around it.
pub fn strip_trailing_asterisks(bio: &str) -> &str {
    bio.trim_end_matches(|c: char| c == '*' || c.is_whitespace())
}

/// Whether a bio is nothing more than the provider's city or state.
pub fn is_location_placeholder(bio: &str, city: &str, state: &str) -> bool {
    let bio = bio.trim();
    let (city, state) = (city.trim(), state.trim());
    [
        state.to_string(),
        city.to_string(),
        format!("{}*", state),
        format!("{}*", city),
    ]
    .iter()
    .any(|candidate| !candidate.is_empty() && bio == candidate)
}

/// Cap runs of the same character at `max_run`.
pub fn collapse_repeated_chars(text: &str, max_run: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    let mut run = 0usize;

    for c in text.chars() {
        if previous == Some(c) {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if run <= max_run {
            out.push(c);
        }
    }
    out
}

/// Result of the readability pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condensed {
    pub text: String,
    pub truncated: bool,
}

// Passes needed in practice are two at most: truncation can leave a partial sentence that
// repeats a capped one, and dropping trailing sentences can expose a `*`.
const MAX_PASSES: usize = 8;

/// Readability pass: collapse character runs, cap repeated sentences, rejoin, truncate.
///
/// Repeats until the text stops changing, so running it over its own output is a no-op.
pub fn condense(text: &str, limits: &BioConfig) -> Condensed {
    let mut current = text.to_string();
    let mut truncated = false;

    for _ in 0..MAX_PASSES {
        let pass = condense_once(&current, limits);
        let next = strip_trailing_asterisks(&pass.text);
        truncated |= pass.truncated;
        if next == current {
            break;
        }
        current = next.to_string();
    }

    Condensed {
        text: current,
        truncated,
    }
}

/// One readability pass. The closing punctuation run is re-appended after rejoining.
fn condense_once(text: &str, limits: &BioConfig) -> Condensed {
    let collapsed = collapse_repeated_chars(text, limits.max_char_run);

    let trimmed = collapsed.trim_end();
    let body = trimmed.trim_end_matches(is_sentence_punctuation);
    let closing = &trimmed[body.len()..];

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut kept: Vec<&str> = Vec::new();
    for sentence in SENTENCE_SPLIT_RE.split(&collapsed) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let count = seen.entry(sentence).or_insert(0);
        *count += 1;
        if *count <= limits.max_sentence_repeats {
            kept.push(sentence);
        }
    }

    // Nothing but punctuation; leave it for the caller to judge
    if kept.is_empty() {
        return Condensed {
            text: text.to_string(),
            truncated: false,
        };
    }

    let mut joined = kept.join(". ");
    joined.push_str(closing);

    if joined.chars().count() <= limits.max_chars {
        return Condensed {
            text: joined,
            truncated: false,
        };
    }

    let keep = limits.max_chars - ELLIPSIS.len();
    let prefix: String = joined.chars().take(keep).collect();
    let mut truncated = prefix
        .trim_end_matches(|c: char| is_sentence_punctuation(c) || c.is_whitespace())
        .to_string();
    truncated.push_str(ELLIPSIS);

    Condensed {
        text: truncated,
        truncated: true,
    }
}
