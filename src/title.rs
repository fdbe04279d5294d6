//! Title canonicalization used to match the same game across sources.

use regex::Regex;
use std::sync::OnceLock;

fn year_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?s)(.*?)\s*\([0-9]{4}\)$").unwrap())
}

/// Strips trailing `(YYYY)` suffixes and surrounding whitespace.
///
/// `"Chrono Trigger (1995)"` and `"Chrono Trigger"` both canonicalize to
/// `"Chrono Trigger"`. Suffixes are stripped until none is left, so
/// `canonical_title(canonical_title(t)) == canonical_title(t)`.
pub fn canonical_title(title: &str) -> String {
    let mut current = title.trim();

    while let Some(caps) = year_suffix().captures(current) {
        match caps.get(1) {
            Some(rest) => current = rest.as_str().trim(),
            None => break
        }
    }

    current.to_string()
}

/// Whether the title already ends in a `(YYYY)` suffix.
#[inline]
pub fn has_year_suffix(title: &str) -> bool {
    year_suffix().is_match(title.trim())
}

/// The four-digit year at the start of a release date such as `2017-03-03`.
pub fn release_year(date: &str) -> Option<&str> {
    let year = date.trim().split('-').next()?.trim();

    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        Some(year)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_year_suffix() {
        assert_eq!(canonical_title("Chrono Trigger (1995)"), "Chrono Trigger");
        assert_eq!(canonical_title("  Mario  "), "Mario");
        assert_eq!(canonical_title("Chrono Trigger(1995)"), "Chrono Trigger");
    }

    #[test]
    fn keeps_inner_parentheses() {
        assert_eq!(canonical_title("Portal (Orange Box)"), "Portal (Orange Box)");
        assert_eq!(canonical_title("1998 (1998) Remake"), "1998 (1998) Remake");
        assert_eq!(canonical_title("(1995)"), "");
    }

    #[test]
    fn only_ascii_years() {
        assert_eq!(canonical_title("Doom (١٩٩٣)"), "Doom (١٩٩٣)");
        assert!(!has_year_suffix("Doom (١٩٩٣)"));
        assert_eq!(release_year("١٩٩٣-12-10"), None);
    }

    #[test]
    fn idempotent() {
        for t in &["Doom (1993) (2016)", "Tetris", " Half-Life 2 (2004) ", "Prey (2017)"] {
            let once = canonical_title(t);
            assert_eq!(canonical_title(&once), once);
        }
        assert_eq!(canonical_title("Doom (1993) (2016)"), "Doom");
    }

    #[test]
    fn years() {
        assert!(has_year_suffix("Prey (2017)"));
        assert!(!has_year_suffix("Prey"));
        assert_eq!(release_year("2017-05-05"), Some("2017"));
        assert_eq!(release_year("2017"), Some("2017"));
        assert_eq!(release_year("May 2017"), None);
        assert_eq!(release_year(""), None);
    }
}
