use std::collections::HashMap;

use crate::normalize::normalize;

/// Number of `Attribute {i} name` / `Attribute {i} value(s)` column pairs.
pub const ATTRIBUTE_SLOTS: usize = 22;

/// Leading text fields, in concatenation order.
const TEXT_FIELDS: &[&str] = &["Name", "Short description", "Description", "Brands"];

/// One product export row, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRow {
    fields: HashMap<String, String>,
}

impl ProductRow {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pair a CSV record with its header. Extra cells beyond the header are dropped.
    pub fn from_record(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        Self { fields }
    }

    #[cfg(test)]
    pub(crate) fn with(mut self, field: &str, value: &str) -> Self {
        self.fields.insert(field.to_string(), value.to_string());
        self
    }

    /// Field value, or `""` when the column is absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or_default()
    }

    /// Trimmed SKU, `None` when missing or blank.
    pub fn sku(&self) -> Option<&str> {
        Some(self.get("SKU").trim()).filter(|s| !s.is_empty())
    }
}

/// Build the normalized search text for a product row.
///
/// Concatenates Name, Short description, Description, Brands and then every
/// attribute name/value pair, space-separated, and normalizes the result.
pub fn build_search_text(row: &ProductRow) -> String {
    let mut parts: Vec<&str> = TEXT_FIELDS.iter().map(|f| row.get(f)).collect();
    for i in 1..=ATTRIBUTE_SLOTS {
        parts.push(row.get(&format!("Attribute {i} name")));
        parts.push(row.get(&format!("Attribute {i} value(s)")));
    }
    normalize(&parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_empty() {
        let row = ProductRow::new().with("Name", "Chrome Hub Cap Set");
        assert_eq!(row.get("Description"), "");
        assert_eq!(build_search_text(&row).trim(), "chrome hubcap set");
    }

    #[test]
    fn fields_in_fixed_order() {
        let row = ProductRow::new()
            .with("Brands", "Eagle Flight")
            .with("Attribute 2 value(s)", "10 Lugs")
            .with("Description", "Stainless")
            .with("Attribute 1 name", "Finish")
            .with("Name", "Simulator")
            .with("Attribute 22 name", "Last")
            .with("Short description", "Front");
        assert_eq!(
            build_search_text(&row).trim(),
            "simulator front stainless eagle flight finish 10 lug last"
        );
    }

    #[test]
    fn attributes_beyond_slot_limit_ignored() {
        let row = ProductRow::new().with("Attribute 23 name", "Hidden");
        assert!(!build_search_text(&row).contains("hidden"));
    }

    #[test]
    fn unknown_fields_ignored() {
        let row = ProductRow::new().with("Name", "Rim").with("Notes", "Lug nuts");
        assert_eq!(build_search_text(&row).trim(), "rim");
    }

    #[test]
    fn sku_is_trimmed_and_required() {
        assert_eq!(ProductRow::new().with("SKU", " W1 ").sku(), Some("W1"));
        assert_eq!(ProductRow::new().with("SKU", "   ").sku(), None);
        assert_eq!(ProductRow::new().sku(), None);
    }

    #[test]
    fn from_record_pairs_headers() {
        let headers = csv::StringRecord::from(vec!["SKU", "Name"]);
        let record = csv::StringRecord::from(vec!["W1", "Hub Cap", "extra"]);
        let row = ProductRow::from_record(&headers, &record);
        assert_eq!(row.sku(), Some("W1"));
        assert_eq!(row.get("Name"), "Hub Cap");
    }

    #[test]
    fn short_record_leaves_fields_missing() {
        let headers = csv::StringRecord::from(vec!["SKU", "Name", "Description"]);
        let record = csv::StringRecord::from(vec!["W1"]);
        let row = ProductRow::from_record(&headers, &record);
        assert_eq!(row.get("Description"), "");
    }
}
