//! Centralized filename parsing for the NNN-name convention.
//!
//! Doc files and doc directories follow the same naming pattern: an optional
//! numeric prefix followed by a name. The prefix orders the entry in the
//! sidebar and never appears in ids, slugs or permalinks:
//!
//! - `04-spring-data-mongodb/` → position 4, slug segment `spring-data-mongodb`
//! - `2-File.mdx` → position 2, id `File`
//! - `10_setup.md` / `3.faq.md` → `_` and `.` work as separators too
//!
//! ## Display Titles
//!
//! Dashes and underscores in the name portion become spaces for display, so a
//! directory without an explicit label still gets a readable sidebar category:
//! `02-user-guides/` → "user guides".

/// Result of parsing a numbered entry name like `04-spring-data-mongodb`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `4` from `04-spring-data-mongodb`)
    pub number: Option<u32>,
    /// Name part after the prefix and its separator. Empty if number-only.
    /// For unnumbered entries, this is the full input.
    pub name: String,
    /// Display title: name with dashes and underscores converted to spaces.
    pub display_title: String,
}

/// Parse an entry name following the `NNN-name` convention.
///
/// - `"04-spring-data-mongodb"` → number=Some(4), name="spring-data-mongodb"
/// - `"2-File"` → number=Some(2), name="File"
/// - `"10_setup"` → number=Some(10), name="setup"
/// - `"001"` → number=Some(1), name=""
/// - `"intro"` → number=None, name="intro"
/// - `"2fa-setup"` → number=None (digits must be followed by a separator)
pub fn parse_entry_name(name: &str) -> ParsedName {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        if let Ok(num) = name[..digits].parse::<u32>() {
            let rest = &name[digits..];
            if rest.is_empty() {
                return ParsedName {
                    number: Some(num),
                    name: String::new(),
                    display_title: String::new(),
                };
            }
            let stripped = rest.trim_start_matches(is_separator);
            if stripped.len() < rest.len() {
                return ParsedName {
                    number: Some(num),
                    name: stripped.to_string(),
                    display_title: display_title(stripped),
                };
            }
        }
    }
    ParsedName {
        number: None,
        name: name.to_string(),
        display_title: display_title(name),
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, '-' | '_' | '.' | ' ')
}

fn display_title(name: &str) -> String {
    name.replace(['-', '_'], " ")
}

/// Strip the number prefix from every `/`-separated segment of a relative path.
///
/// `"02-guides/1-getting-started"` → `"guides/getting-started"`
pub fn strip_number_prefixes(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let parsed = parse_entry_name(segment);
            if parsed.name.is_empty() {
                segment.to_string()
            } else {
                parsed.name
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_with_multi_word_name() {
        let p = parse_entry_name("04-spring-data-mongodb");
        assert_eq!(p.number, Some(4));
        assert_eq!(p.name, "spring-data-mongodb");
        assert_eq!(p.display_title, "spring data mongodb");
    }

    #[test]
    fn numbered_single_word() {
        let p = parse_entry_name("2-File");
        assert_eq!(p.number, Some(2));
        assert_eq!(p.name, "File");
        assert_eq!(p.display_title, "File");
    }

    #[test]
    fn underscore_and_dot_separators() {
        assert_eq!(parse_entry_name("10_setup").name, "setup");
        assert_eq!(parse_entry_name("3.faq").name, "faq");
        assert_eq!(parse_entry_name("3.faq").number, Some(3));
    }

    #[test]
    fn number_only_no_dash() {
        let p = parse_entry_name("001");
        assert_eq!(p.number, Some(1));
        assert_eq!(p.name, "");
        assert_eq!(p.display_title, "");
    }

    #[test]
    fn number_with_trailing_dash() {
        let p = parse_entry_name("001-");
        assert_eq!(p.number, Some(1));
        assert_eq!(p.name, "");
    }

    #[test]
    fn unnumbered_with_dashes() {
        let p = parse_entry_name("hidden-page");
        assert_eq!(p.number, None);
        assert_eq!(p.name, "hidden-page");
        assert_eq!(p.display_title, "hidden page");
    }

    #[test]
    fn digits_glued_to_word_are_not_a_prefix() {
        let p = parse_entry_name("2fa-setup");
        assert_eq!(p.number, None);
        assert_eq!(p.name, "2fa-setup");
    }

    #[test]
    fn zero_prefix() {
        let p = parse_entry_name("00-First");
        assert_eq!(p.number, Some(0));
        assert_eq!(p.name, "First");
    }

    #[test]
    fn strip_prefixes_in_every_segment() {
        assert_eq!(
            strip_number_prefixes("02-guides/1-getting-started"),
            "guides/getting-started"
        );
        assert_eq!(strip_number_prefixes("intro"), "intro");
        assert_eq!(strip_number_prefixes(""), "");
    }
}
