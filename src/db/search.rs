//! Wildcard name search.

use regex::{Regex, RegexBuilder};

/// A case-insensitive, anchored name matcher built from a list of patterns.
///
/// `*` inside a pattern matches any run of characters. A name matches when
/// any of the patterns does.
#[derive(Debug, Clone)]
pub struct WildcardSearch {
    regex: Option<Regex>,
}

impl WildcardSearch {
    pub fn new(patterns: &[String]) -> Self {
        if patterns.is_empty() {
            return Self { regex: None };
        }

        let alternatives: Vec<String> = patterns
            .iter()
            .map(|p| {
                p.split('*')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(".*")
            })
            .collect();

        let regex = RegexBuilder::new(&format!("^(?:{})$", alternatives.join("|")))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .ok();

        Self { regex }
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(name))
    }
}
