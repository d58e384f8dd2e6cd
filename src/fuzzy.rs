// Subsequence search used by the interactive selector.
//
// A query matches when all of its characters appear in the text in order,
// ignoring case, with anything in between. There is no scoring: matching
// items keep their original order.

use regex::{Regex, RegexBuilder};

/// Compiled form of a query.
#[derive(Debug, Clone)]
pub enum FuzzyQuery {
    /// Empty query: everything matches.
    All,
    Pattern(Regex),
    /// The pattern hit the regex size limit; nothing matches.
    Nothing,
}

impl FuzzyQuery {
    pub fn new(query: &str) -> Self {
        if query.is_empty() {
            return FuzzyQuery::All;
        }
        let pattern = query
            .chars()
            .map(|c| regex::escape(c.encode_utf8(&mut [0u8; 4])))
            .collect::<Vec<_>>()
            .join(".*?");
        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => FuzzyQuery::Pattern(re),
            Err(err) => {
                tracing::debug!(%err, "fuzzy query rejected");
                FuzzyQuery::Nothing
            }
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            FuzzyQuery::All => true,
            FuzzyQuery::Pattern(re) => re.is_match(text),
            FuzzyQuery::Nothing => false,
        }
    }
}

/// Items whose projected text fuzzy-matches `query`, in original order.
pub fn fuzzy_filter<'a, T, F>(items: &'a [T], query: &str, key: F) -> Vec<&'a T>
where
    F: Fn(&T) -> String,
{
    let query = FuzzyQuery::new(query);
    items.iter().filter(|item| query.matches(&key(*item))).collect()
}

/// Positions in `items` whose projected text fuzzy-matches `query`.
pub fn fuzzy_indices<T, F>(items: &[T], query: &str, key: F) -> Vec<usize>
where
    F: Fn(&T) -> String,
{
    let query = FuzzyQuery::new(query);
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| query.matches(&key(*item)))
        .map(|(i, _)| i)
        .collect()
}
