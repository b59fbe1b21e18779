use crate::normalize::normalize;
use crate::ordered::OrderedSet;
use crate::taxonomy::{TaxonomyMapping, TermEntry};

/// Default minimum similarity (0.0–1.0) for a fuzzy window match.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// Matching behaviour for [`assign_categories`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub fuzzy: bool,
    pub fuzzy_threshold: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fuzzy: false,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl MatchOptions {
    pub fn fuzzy(threshold: f64) -> Self {
        Self {
            fuzzy: true,
            fuzzy_threshold: threshold,
        }
    }
}

/// How a term was found in the search text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    /// Whole-word/phrase occurrence.
    Exact,
    /// Approximate window match with its similarity score.
    Fuzzy(f64),
}

/// Hit counters accumulated across rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub exact: u64,
    pub fuzzy: u64,
    pub negated: u64,
}

impl MatchStats {
    pub fn merge(&mut self, other: MatchStats) {
        self.exact += other.exact;
        self.fuzzy += other.fuzzy;
        self.negated += other.negated;
    }
}

/// Assign taxonomy categories to a product's search text.
///
/// Terms are visited in mapping order. A term matches exactly, or, with
/// fuzzy matching enabled, when some window of the same word count is at
/// least `fuzzy_threshold` similar. Matches whose term appears in a negation
/// phrase ("not for X", "without X", ...) are dropped. Category names of the
/// remaining terms are appended in path order, first occurrence wins.
pub fn assign_categories(
    search_text: &str,
    mapping: &TaxonomyMapping,
    options: &MatchOptions,
) -> Vec<String> {
    assign_with_stats(search_text, mapping, options, &mut MatchStats::default())
}

/// [`assign_categories`], also counting hits into `stats`.
pub fn assign_with_stats(
    search_text: &str,
    mapping: &TaxonomyMapping,
    options: &MatchOptions,
    stats: &mut MatchStats,
) -> Vec<String> {
    // Idempotent, so already-normalized input is unchanged.
    let text = normalize(search_text);
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut categories = OrderedSet::new();

    for entry in mapping.iter() {
        let Some(kind) = match_term(entry, &text, &words, options) else {
            continue;
        };

        if entry.is_negated_in(&text) {
            stats.negated += 1;
            tracing::trace!(term = entry.term(), "Match suppressed by negation");
            continue;
        }

        match kind {
            MatchKind::Exact => stats.exact += 1,
            MatchKind::Fuzzy(score) => {
                stats.fuzzy += 1;
                tracing::trace!(term = entry.term(), score, "Fuzzy term match");
            }
        }

        for category in entry.path() {
            categories.push(category);
        }
    }

    categories.into_vec()
}

/// Exact check first, then (optionally) the fuzzy window scan.
pub fn match_term(
    entry: &TermEntry,
    text: &str,
    words: &[&str],
    options: &MatchOptions,
) -> Option<MatchKind> {
    if entry.is_found_in(text) {
        return Some(MatchKind::Exact);
    }
    if !options.fuzzy {
        return None;
    }
    best_window_score(entry, words)
        .filter(|&score| score >= options.fuzzy_threshold)
        .map(MatchKind::Fuzzy)
}

/// Highest similarity between the term and any contiguous window of
/// `word_count` words.
fn best_window_score(entry: &TermEntry, words: &[&str]) -> Option<f64> {
    let n = entry.word_count();
    if n == 0 || words.len() < n {
        return None;
    }
    words
        .windows(n)
        .map(|window| strsim::normalized_levenshtein(entry.term(), &window.join(" ")))
        .max_by(f64::total_cmp)
}
