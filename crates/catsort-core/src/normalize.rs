//! Text normalization shared by the taxonomy loader and the product text builder.
//!
//! Every term and every product search string passes through [`normalize`]
//! so both sides of a comparison agree on casing, spacing and the handful of
//! catalog spellings that mean the same thing ("hub caps" vs "hubcap").

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// Literal phrase replacements, applied at whole-word boundaries.
///
/// Entries run one after another in table order, each over the output of
/// the previous ones, so "over-lugs" becomes "over-lug" and then "over lug".
pub const REPLACEMENTS: &[(&str, &str)] = &[
    ("lugs", "lug"),
    ("holes", "hole"),
    ("hh", "hole"),
    ("hub caps", "hubcap"),
    ("hub cap", "hubcap"),
    ("wheelcovers", "wheel cover"),
    ("wheelcover", "wheel cover"),
    ("wheel-simulator", "wheel simulator"),
    ("wheel-simulators", "wheel simulator"),
    ("over-lug", "over lug"),
];

// ── Regex patterns (compiled once) ──────────────────────────────

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_REPLACEMENTS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    REPLACEMENTS
        .iter()
        .map(|&(from, to)| {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(from))).unwrap();
            (re, to)
        })
        .collect()
});

/// Normalize free text for term matching.
///
/// Lowercases, rewrites every [`REPLACEMENTS`] entry in table order and
/// collapses whitespace runs to one space. Leading or trailing
/// whitespace is collapsed but not trimmed.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    let s = s.to_lowercase();
    // Collapse first so multi-word keys match across tabs/newlines too.
    let s = collapse_whitespace(&s);
    let s = apply_replacements(&s);
    collapse_whitespace(&s)
}

fn apply_replacements(s: &str) -> String {
    let mut out = s.to_string();
    for (re, to) in RE_REPLACEMENTS.iter() {
        out = re.replace_all(&out, NoExpand(to)).into_owned();
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    RE_WHITESPACE.replace_all(s, " ").into_owned()
}
