//! Header-row tolerant codec between sheet rows and semantic fields.
//!
//! Tabs are edited by hand, so column order and header spelling drift.
//! Each field resolves by case- and separator-insensitive matching over a
//! set of accepted header variants, falling back to a hardcoded positional
//! default when nothing in the header row matches. Decoding is best-effort:
//! only a missing identifier is an error, everything else decodes as
//! absent.

use chrono::{DateTime, Utc};
use shared::model::{Rpe, Weight};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("row has no value for required field {field:?}")]
    MissingRequiredValue { field: &'static str },
    #[error("field {field:?}: unparseable value {value:?}")]
    Unparseable { field: &'static str, value: String },
}

pub struct FieldSpec {
    pub name: &'static str,
    /// Accepted header spellings, compared after normalization
    pub variants: &'static [&'static str],
    /// Column used when no header variant matches
    pub fallback: usize,
}

/// Lowercase alphanumerics only, so "Set ID", "SetId" and "set_id" collide
fn normalize(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_lowercase()
}

/// Resolved field-name to column-index mapping for one tab's header row
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: Vec<(&'static str, usize)>,
    width: usize,
}

impl HeaderIndex {
    pub fn resolve(header: &[String], specs: &'static [FieldSpec]) -> Self {
        let normalized: Vec<String> = header.iter().map(|h| normalize(h)).collect();

        let columns = specs
            .iter()
            .map(|spec| {
                let matched = spec
                    .variants
                    .iter()
                    .find_map(|v| normalized.iter().position(|h| !h.is_empty() && h == &normalize(v)));
                (spec.name, matched.unwrap_or(spec.fallback))
            })
            .collect::<Vec<_>>();

        let width = header
            .len()
            .max(columns.iter().map(|(_, c)| c + 1).max().unwrap_or(0));

        Self { columns, width }
    }

    pub fn column(&self, field: &str) -> Option<usize> {
        self.columns.iter().find(|(name, _)| *name == field).map(|(_, c)| *c)
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

pub struct RowReader<'a> {
    index: &'a HeaderIndex,
    row: &'a [String],
}

impl<'a> RowReader<'a> {
    pub fn new(index: &'a HeaderIndex, row: &'a [String]) -> Self {
        Self { index, row }
    }

    /// Trimmed cell value; an empty or out-of-range cell is absent
    pub fn get(&self, field: &'static str) -> Option<&'a str> {
        let col = self.index.column(field)?;
        let value = self.row.get(col)?.trim();
        (!value.is_empty()).then_some(value)
    }

    pub fn require(&self, field: &'static str) -> Result<&'a str, CodecError> {
        self.get(field).ok_or(CodecError::MissingRequiredValue { field })
    }

    pub fn get_string(&self, field: &'static str) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    pub fn get_u32(&self, field: &'static str) -> Option<u32> {
        // Sheets render integers as "3.0" after some edits
        self.get(field).and_then(|v| v.parse::<f64>().ok()).map(|v| v.max(0.0) as u32)
    }

    pub fn get_f64(&self, field: &'static str) -> Option<f64> {
        self.get(field).and_then(|v| v.parse().ok())
    }

    pub fn get_bool(&self, field: &'static str) -> bool {
        matches!(
            self.get(field).map(str::to_ascii_lowercase).as_deref(),
            Some("true" | "yes" | "1")
        )
    }

    pub fn get_datetime(&self, field: &'static str) -> Option<DateTime<Utc>> {
        self.get(field)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn get_weight(&self, field: &'static str) -> Weight {
        match self.get_f64(field) {
            Some(kg) => Weight::Kg(kg),
            None => Weight::Bodyweight,
        }
    }

    pub fn get_rpe(&self, field: &'static str) -> Option<Rpe> {
        self.get_f64(field).and_then(|v| Rpe::from_f64(v).ok())
    }
}

/// Builds a row padded/truncated to the header width; never assumes fixed
/// positions beyond the per-field fallback
pub struct RowWriter<'a> {
    index: &'a HeaderIndex,
    cells: Vec<String>,
}

impl<'a> RowWriter<'a> {
    pub fn new(index: &'a HeaderIndex) -> Self {
        Self { index, cells: vec![String::new(); index.width()] }
    }

    pub fn set<V: Into<String>>(&mut self, field: &'static str, value: V) {
        if let Some(col) = self.index.column(field) {
            if col < self.cells.len() {
                self.cells[col] = value.into();
            }
        }
    }

    pub fn set_opt<V: ToString>(&mut self, field: &'static str, value: &Option<V>) {
        if let Some(value) = value {
            self.set(field, value.to_string());
        }
    }

    pub fn set_bool(&mut self, field: &'static str, value: bool) {
        self.set(field, if value { "TRUE" } else { "FALSE" });
    }

    pub fn set_weight(&mut self, field: &'static str, weight: Weight) {
        if let Weight::Kg(kg) = weight {
            self.set(field, format_number(kg));
        }
    }

    pub fn into_row(self) -> Vec<String> {
        self.cells
    }
}

/// "102.5" not "102.50000", "60" not "60.0"
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec { name: "id", variants: &["SetId", "set_id", "Set ID"], fallback: 0 },
        FieldSpec { name: "weight", variants: &["Weight", "WeightKg"], fallback: 1 },
        FieldSpec { name: "reps", variants: &["Reps"], fallback: 2 },
    ];

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_fields_under_any_header_permutation() {
        let permutations: &[&[&str]] = &[
            &["SetId", "Weight", "Reps"],
            &["Reps", "SetId", "Weight"],
            &["Weight", "Reps", "set_id"],
            &["Set ID", "Reps", "WeightKg"],
        ];
        for header_names in permutations {
            let index = HeaderIndex::resolve(&header(header_names), FIELDS);
            for (field, variants) in [
                ("id", &["SetId", "set_id", "Set ID"][..]),
                ("weight", &["Weight", "WeightKg"][..]),
                ("reps", &["Reps"][..]),
            ] {
                let expected = header_names
                    .iter()
                    .position(|h| variants.iter().any(|v| normalize(v) == normalize(h)))
                    .unwrap();
                assert_eq!(
                    index.column(field),
                    Some(expected),
                    "field {field} in {header_names:?}"
                );
            }
        }
    }

    #[test]
    fn falls_back_to_positional_default() {
        // Header row doesn't mention the fields at all
        let index = HeaderIndex::resolve(&header(&["A", "B", "C"]), FIELDS);
        assert_eq!(index.column("id"), Some(0));
        assert_eq!(index.column("weight"), Some(1));
        assert_eq!(index.column("reps"), Some(2));
    }

    #[test]
    fn unresolvable_values_read_as_absent_not_errors() {
        let index = HeaderIndex::resolve(&header(&["SetId"]), FIELDS);
        let row = vec!["abc".to_string()];
        let reader = RowReader::new(&index, &row);
        assert_eq!(reader.get("weight"), None);
        assert_eq!(reader.get_u32("reps"), None);
        assert_eq!(reader.require("id"), Ok("abc"));
        assert!(reader.require("weight").is_err());
    }

    #[test]
    fn writer_pads_to_header_width() {
        let wide = header(&["SetId", "Weight", "Reps", "Extra", "Wider"]);
        let index = HeaderIndex::resolve(&wide, FIELDS);
        let mut writer = RowWriter::new(&index);
        writer.set("id", "x");
        writer.set("reps", "5");
        let row = writer.into_row();
        assert_eq!(row.len(), 5);
        assert_eq!(row[0], "x");
        assert_eq!(row[2], "5");
        assert_eq!(row[4], "");
    }

    #[test]
    fn number_formatting_is_compact() {
        assert_eq!(format_number(60.0), "60");
        assert_eq!(format_number(102.5), "102.5");
    }

    #[test]
    fn bool_cells_accept_sheet_spellings() {
        let index = HeaderIndex::resolve(&header(&["SetId", "Weight", "Reps"]), FIELDS);
        for (cell, expected) in [("TRUE", true), ("true", true), ("1", true), ("FALSE", false), ("", false)] {
            let row = vec![cell.to_string()];
            let reader = RowReader::new(&index, &row);
            assert_eq!(reader.get_bool("id"), expected, "{cell:?}");
        }
    }
}
