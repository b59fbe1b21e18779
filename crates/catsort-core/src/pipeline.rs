//! Batch driver.
//!
//! Loads the taxonomy once, then streams the product export row by row in
//! file order, writing `SKU, category...` for every row that matched at
//! least one category.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::config::AppConfig;
use crate::error::CatsortError;
use crate::matcher::{assign_with_stats, MatchOptions, MatchStats};
use crate::product::{build_search_text, ProductRow};
use crate::taxonomy::{load_taxonomy, TaxonomyMapping};

/// Result of an annotation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rows_read: u64,
    /// Rows without a SKU.
    pub rows_skipped: u64,
    /// Rows with a SKU but no category.
    pub rows_unmatched: u64,
    pub rows_written: u64,
    pub matches: MatchStats,
}

/// Run the whole pipeline from a resolved configuration.
pub fn run(config: &AppConfig) -> Result<RunStats, CatsortError> {
    let paths = &config.paths;
    let mapping = load_taxonomy(&paths.categories)?;

    if let Some(dump_path) = &paths.dump_terms {
        let out = File::create(dump_path)?;
        write_terms(&mapping, out)?;
        tracing::info!(path = %dump_path.display(), terms = mapping.len(), "Wrote term dump");
    }

    let products = open_input("products", &paths.products)?;
    let output = File::create(&paths.output)?;

    tracing::info!(
        products = %paths.products.display(),
        output = %paths.output.display(),
        fuzzy = config.matching.fuzzy,
        "Assigning categories"
    );

    let stats = annotate(products, output, &mapping, &config.match_options())?;

    tracing::info!(
        read = stats.rows_read,
        written = stats.rows_written,
        skipped = stats.rows_skipped,
        unmatched = stats.rows_unmatched,
        exact_hits = stats.matches.exact,
        fuzzy_hits = stats.matches.fuzzy,
        negated = stats.matches.negated,
        "Run complete"
    );

    Ok(stats)
}

/// Annotate a product CSV (with header) into a header-less category CSV.
pub fn annotate<R: Read, W: Write>(
    products: R,
    output: W,
    mapping: &TaxonomyMapping,
    options: &MatchOptions,
) -> Result<RunStats, CatsortError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(products);
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(output);

    let headers = strip_bom(reader.headers()?);
    let mut stats = RunStats::default();

    for record in reader.records() {
        let record = record?;
        stats.rows_read += 1;

        let row = ProductRow::from_record(&headers, &record);
        let Some(sku) = row.sku() else {
            stats.rows_skipped += 1;
            continue;
        };

        let text = build_search_text(&row);
        let categories = assign_with_stats(&text, mapping, options, &mut stats.matches);
        if categories.is_empty() {
            tracing::debug!(sku, "No categories matched");
            stats.rows_unmatched += 1;
            continue;
        }

        tracing::debug!(sku, categories = categories.len(), "Categories assigned");
        writer.write_record(std::iter::once(sku).chain(categories.iter().map(String::as_str)))?;
        stats.rows_written += 1;
    }

    writer.flush()?;
    Ok(stats)
}

/// Write every registered term as `term, category...`, in registration order.
pub fn write_terms<W: Write>(mapping: &TaxonomyMapping, output: W) -> Result<(), CatsortError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(output);
    for entry in mapping.iter() {
        writer.write_record(
            std::iter::once(entry.term()).chain(entry.path().iter().map(String::as_str)),
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn open_input(kind: &'static str, path: &Path) -> Result<File, CatsortError> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatsortError::MissingInput {
            kind,
            path: path.to_path_buf(),
        },
        _ => CatsortError::Io(e),
    })
}

/// Drop a UTF-8 byte-order mark from the first header name.
fn strip_bom(headers: &csv::StringRecord) -> csv::StringRecord {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}') } else { h })
        .collect()
}
