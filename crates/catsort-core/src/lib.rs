//! Assigns hierarchical catalog categories to product rows by matching
//! normalized product text against a taxonomy of category terms and synonyms.

pub mod config;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod ordered;
pub mod pipeline;
pub mod product;
pub mod taxonomy;

pub use config::AppConfig;
pub use error::CatsortError;
pub use matcher::{assign_categories, MatchKind, MatchOptions, MatchStats};
pub use normalize::normalize;
pub use pipeline::{annotate, run, RunStats};
pub use product::{build_search_text, ProductRow};
pub use taxonomy::{load_taxonomy, TaxonomyMapping, TermEntry};
