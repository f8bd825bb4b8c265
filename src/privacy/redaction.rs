use lazy_static::lazy_static;
use regex::{Captures, NoExpand, Regex, RegexBuilder};

use crate::error::Result;

pub const REDACTED_EMAIL: &str = "[REDACTED EMAIL]";
pub const REDACTED_NAME: &str = "[REDACTED NAME]";
pub const REDACTED_PHONE_NUMBER: &str = "[REDACTED PHONE NUMBER]";
pub const REDACTED_NATIONAL_ID: &str = "[REDACTED NATIONAL ID]";

/// Matches any marker inserted by an earlier substitution, case-sensitively.
const MARKER: &str = r"(?-i:\[REDACTED [A-Z ]+\])";

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"\b\S+@\S+\.\S+\b").expect("email pattern is valid");
    static ref PHONE_NUMBER: Regex =
        Regex::new(r"\(?\d{3}(?:\) ?| |-)?\d{3}[- ]?\d{4}").expect("phone pattern is valid");
    static ref NATIONAL_ID: Regex =
        Regex::new(r"\d{3}[- ]?\d{2}[- ]?\d+").expect("national ID pattern is valid");
}

/// Redact PII from free text submitted by a voter.
///
/// Substitutions run in a fixed order: emails, the voter's own last then
/// first name (case-insensitive, whole tokens), phone numbers, then national
/// IDs. Phone numbers must go before IDs, since the ID pattern would otherwise
/// eat the digits of a phone number. Names of anybody else are left alone.
pub fn redact(free_text: &str, first_name: &str, last_name: &str) -> Result<String> {
    let text = EMAIL.replace_all(free_text, NoExpand(REDACTED_EMAIL));

    // One alternation, last name first, led by the marker shape: markers
    // already in the text are matched whole and kept, so no name can match
    // inside one.
    let names: Vec<String> = [last_name, first_name]
        .into_iter()
        .filter_map(name_pattern)
        .collect();
    let text = if names.is_empty() {
        text
    } else {
        let pattern = RegexBuilder::new(&format!("(?P<marker>{MARKER})|{}", names.join("|")))
            .case_insensitive(true)
            .build()?;
        pattern
            .replace_all(&text, |caps: &Captures| match caps.name("marker") {
                Some(marker) => marker.as_str().to_string(),
                None => REDACTED_NAME.to_string(),
            })
            .into_owned()
            .into()
    };

    let text = PHONE_NUMBER.replace_all(&text, NoExpand(REDACTED_PHONE_NUMBER));
    let text = NATIONAL_ID.replace_all(&text, NoExpand(REDACTED_NATIONAL_ID));
    Ok(text.into_owned())
}

/// Whole-token pattern for a name, or `None` for a blank one.
///
/// A word boundary is only demanded on an edge that is itself a word
/// character, otherwise names like `Jr.` could never match.
fn name_pattern(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    let mut pattern = String::from("(?:");
    if name.starts_with(is_word) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(name));
    if name.ends_with(is_word) {
        pattern.push_str(r"\b");
    }
    pattern.push(')');
    Some(pattern)
}
