//! Taxonomy loading: category tree CSV → ordered term mapping.
//!
//! Each CSV row is one root-to-leaf path. A cell is either a bare category
//! name or `Name (synonym, synonym, ...)`. Every name and synonym is
//! registered as a normalized term pointing at the path up to and including
//! its cell, together with its naive plural/singular counterpart.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;

use crate::error::CatsortError;
use crate::normalize::normalize;
use crate::ordered::OrderedMap;

/// Negation phrase templates. `{}` is replaced by the escaped term.
const NEGATION_TEMPLATES: &[&str] = &[
    r"not\s+for\s+{}",
    r"does\s+not\s+fit\s+{}",
    r"without\s+{}",
    r"except\s+for\s+{}",
    r"not\s+compatible\s+with\s+{}",
    r"not\s+recommended\s+for\s+{}",
    r"not\s+intended\s+for\s+{}",
];

/// Ordered category names, outermost first. Shared by every term of a cell.
pub type CategoryPath = Arc<[String]>;

/// A registered taxonomy term with its precompiled matchers.
#[derive(Debug, Clone)]
pub struct TermEntry {
    term: String,
    path: CategoryPath,
    word_count: usize,
    pattern: Regex,
    negation: Regex,
}

impl TermEntry {
    fn compile(term: &str, path: CategoryPath) -> Result<Self, CatsortError> {
        let escaped = regex::escape(term);
        let pattern = Regex::new(&format!(r"(?:^|\W){escaped}(?:\W|$)"))?;
        let negation = Regex::new(
            &NEGATION_TEMPLATES
                .iter()
                .map(|template| format!("(?:{})", template.replace("{}", &escaped)))
                .collect::<Vec<_>>()
                .join("|"),
        )?;

        Ok(Self {
            term: term.to_string(),
            path,
            word_count: term.split_whitespace().count(),
            pattern,
            negation,
        })
    }

    /// The normalized term.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Whole-word (or whole-phrase) occurrence in normalized text.
    pub fn is_found_in(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Whether `text` contains a negation phrase aimed at this term.
    pub fn is_negated_in(&self, text: &str) -> bool {
        self.negation.is_match(text)
    }
}

/// Normalized term → category path, in first-registration order.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyMapping {
    terms: OrderedMap<String, TermEntry>,
}

impl TaxonomyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `raw` (normalized) under `path` unless the term already exists.
    ///
    /// Empty terms are ignored. Returns `true` if a new entry was added.
    pub fn add_term(&mut self, raw: &str, path: &CategoryPath) -> Result<bool, CatsortError> {
        let term = normalize(raw);
        if term.trim().is_empty() {
            return Ok(false);
        }
        let added = self
            .terms
            .insert_with(term.clone(), || TermEntry::compile(&term, Arc::clone(path)))?;
        if added {
            tracing::trace!(term = %term, path = ?path, "Registered taxonomy term");
        }
        Ok(added)
    }

    /// Register a taxonomy name or synonym with its derived variants.
    ///
    /// Variants: the term itself, +s/-s counterpart, and the fixed
    /// "hole" → "hh"/"holes" and "lug" → "lugs" expansions. Only a lowercase
    /// trailing `s` counts as plural, so "ATVS" registers "atvs" and "atvss".
    pub fn add_with_variants(&mut self, raw: &str, path: &CategoryPath) -> Result<(), CatsortError> {
        self.add_term(raw, path)?;

        match raw.strip_suffix('s') {
            Some(singular) => self.add_term(singular, path)?,
            None => self.add_term(&format!("{raw}s"), path)?,
        };

        match normalize(raw).as_str() {
            "hole" => {
                self.add_term("hh", path)?;
                self.add_term("holes", path)?;
            }
            "lug" => {
                self.add_term("lugs", path)?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Look up an already-normalized term.
    pub fn get(&self, term: &str) -> Option<&TermEntry> {
        self.terms.get(term)
    }

    /// Normalize `raw` and return the category path it resolves to.
    pub fn resolve(&self, raw: &str) -> Option<&[String]> {
        self.terms.get(normalize(raw).as_str()).map(TermEntry::path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TermEntry> {
        self.terms.values()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Split a taxonomy cell into its primary name and synonym list.
///
/// A synonym list is recognised only when the cell ends with `)` and has an
/// opening `(` before it. Anything else is a bare name.
///
/// A name-less cell such as `(rim)` yields an empty name. The loader neither
/// pushes it onto the hierarchy nor registers it, since an empty term would
/// match nearly every row.
pub fn parse_cell(cell: &str) -> (&str, Vec<&str>) {
    let cell = cell.trim();
    let well_formed = cell.ends_with(')')
        && matches!((cell.rfind('('), cell.rfind(')')), (Some(open), Some(close)) if open < close);
    if !well_formed {
        return (cell, Vec::new());
    }

    // Name ends at the first '(' even when synonyms contain parentheses.
    let open = cell.find('(').unwrap_or(0);
    let name = cell[..open].trim();
    let synonyms = cell[open + 1..cell.len() - 1]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    (name, synonyms)
}

/// Load a taxonomy CSV from disk.
pub fn load_taxonomy(path: &Path) -> Result<TaxonomyMapping, CatsortError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatsortError::MissingInput {
            kind: "taxonomy",
            path: path.to_path_buf(),
        },
        _ => CatsortError::Io(e),
    })?;
    tracing::info!(path = %path.display(), "Loading taxonomy");
    let mapping = load_from_reader(file)?;
    tracing::info!(terms = mapping.len(), "Taxonomy loaded");
    Ok(mapping)
}

/// Load a taxonomy from any CSV source (no header row, ragged rows allowed).
pub fn load_from_reader<R: Read>(reader: R) -> Result<TaxonomyMapping, CatsortError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut mapping = TaxonomyMapping::new();
    let mut first_row = true;

    for record in csv.records() {
        let record = record?;
        let mut hierarchy: Vec<String> = Vec::new();

        for (i, cell) in record.iter().enumerate() {
            let cell = if first_row && i == 0 {
                cell.trim_start_matches('\u{feff}')
            } else {
                cell
            };
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }

            let (name, synonyms) = parse_cell(cell);
            if name.is_empty() && synonyms.is_empty() {
                continue;
            }
            if !name.is_empty() {
                hierarchy.push(name.to_string());
            }

            let path: CategoryPath = hierarchy.clone().into();
            for term in std::iter::once(name).chain(synonyms) {
                if term.is_empty() {
                    continue;
                }
                mapping.add_with_variants(term, &path)?;
            }
        }
        first_row = false;
    }

    Ok(mapping)
}
