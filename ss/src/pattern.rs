//! Literal, case-insensitive name matching for snippet search

use regex::{Regex, RegexBuilder};

/// Escape every regex metacharacter in `query` so it matches literally
pub fn escape_query(query: &str) -> String {
    regex::escape(query)
}

/// Build a case-insensitive matcher for `query` as a literal substring
///
/// Only fails when the query exceeds the regex size limits.
pub fn literal_matcher(query: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&escape_query(query)).case_insensitive(true).build()
}
