//! Heading anchors.
//!
//! Heading text becomes an anchor id the way GitHub does it: lowercased,
//! punctuation dropped, spaces turned into dashes. A [`Slugger`] remembers the
//! ids it has handed out for one page and appends `-1`, `-2`, ... to repeats:
//!
//! ```text
//! "Key Features:"   → key-features
//! "Key Features:"   → key-features-1
//! "Spring Data API" → spring-data-api
//! ```

use std::collections::HashMap;

/// Turn heading text into an anchor id, without de-duplication.
pub fn slugify(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}

/// Per-page anchor generator.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugify `text`, suffixing it if the result was already used on this page.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        if let Some(&seen) = self.occurrences.get(&base) {
            let mut n = seen;
            loop {
                n += 1;
                slug = format!("{}-{}", base, n);
                if !self.occurrences.contains_key(&slug) {
                    break;
                }
            }
            self.occurrences.insert(base, n);
        }
        self.occurrences.insert(slug.clone(), 0);
        slug
    }
}
