use std::fmt::{Debug, Formatter};

/// A national ID in canonical form: hyphens, spaces and surrounding whitespace
/// removed. Two inputs with the same canonical form are the same voter.
///
/// Deliberately not `Display`, and `Debug` hides the value, so a raw ID cannot
/// end up in a log line by accident.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NationalId(String);

impl NationalId {
    pub fn new(raw: &str) -> Self {
        Self(
            raw.trim()
                .chars()
                .filter(|c| *c != '-' && *c != ' ')
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for NationalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("NationalId(<redacted>)")
    }
}

impl From<&str> for NationalId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_forms_match() {
        let plain = NationalId::new("111111111");
        assert_eq!(plain, NationalId::new("111-11-1111"));
        assert_eq!(plain, NationalId::new("  111 11 1111\t"));
        assert_eq!(plain.as_str(), "111111111");
        assert_ne!(plain, NationalId::new("111111112"));
    }

    #[test]
    fn debug_hides_value() {
        let id = NationalId::new("123-45-6789");
        assert!(!format!("{id:?}").contains("6789"));
    }
}
