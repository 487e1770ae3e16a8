// ============================================================
// Layer 3 - Table Domain Type
// ============================================================
// A column-oriented view of a delimited dataset.
//
// Each column carries its own inferred type:
//   Numeric  every non-missing cell parses as a float
//   Boolean  every cell is a true/false literal, none missing
//   Text     anything else
//
// Empty cells, the usual NA spellings (see MISSING_MARKERS) and
// non-finite numbers are missing values (None). A boolean column
// with a missing cell is treated as Text, matching how dataframe
// readers fall back to an object column in that situation.

use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self { name: name.into(), data }
    }

    /// Infer the column type from raw cell strings.
    pub fn infer(name: impl Into<String>, cells: Vec<String>) -> Self {
        let name = name.into();

        let present: Vec<Option<&str>> = cells.iter().map(|c| present_cell(c)).collect();
        let non_missing: Vec<&str> = present.iter().flatten().copied().collect();

        let all_bool = !non_missing.is_empty()
            && non_missing.len() == cells.len()
            && non_missing.iter().all(|c| parse_bool(c).is_some());
        if all_bool {
            let values = present.iter().map(|c| c.and_then(parse_bool)).collect();
            return Self::new(name, ColumnData::Boolean(values));
        }

        if non_missing.iter().all(|c| c.parse::<f64>().is_ok()) {
            // inf and nan literals parse, but count as missing
            let values = present
                .iter()
                .map(|c| c.and_then(|c| c.parse::<f64>().ok()).filter(|x| x.is_finite()))
                .collect();
            return Self::new(name, ColumnData::Numeric(values));
        }

        let values = present.iter().map(|c| c.map(str::to_string)).collect();
        Self::new(name, ColumnData::Text(values))
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Text(v)    => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_textual(&self) -> bool {
        matches!(self.data, ColumnData::Text(_))
    }

    /// Number of distinct non-missing values.
    pub fn distinct_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v
                .iter()
                .flatten()
                .map(|x| float_key(*x))
                .collect::<HashSet<_>>()
                .len(),
            ColumnData::Boolean(v) => v.iter().flatten().collect::<HashSet<_>>().len(),
            ColumnData::Text(v)    => v.iter().flatten().collect::<HashSet<_>>().len(),
        }
    }

    /// Sorted distinct text values (empty for non-text columns).
    pub fn distinct_text(&self) -> Vec<String> {
        match &self.data {
            ColumnData::Text(v) => v
                .iter()
                .flatten()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Sorted distinct numeric values (booleans map to 0.0 / 1.0).
    pub fn distinct_numbers(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .to_numbers()
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect();
        values.sort_by(f64::total_cmp);
        values.dedup_by(|a, b| float_key(*a) == float_key(*b));
        values
    }

    /// Numeric view of the column, or None for text.
    pub fn to_numbers(&self) -> Option<Vec<Option<f64>>> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v.clone()),
            ColumnData::Boolean(v) => Some(
                v.iter()
                    .map(|b| b.map(|b| if b { 1.0 } else { 0.0 }))
                    .collect(),
            ),
            ColumnData::Text(_) => None,
        }
    }
}

/// A set of equally long, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns.windows(2).all(|w| w[0].len() == w[1].len()),
            "all columns must have the same length"
        );
        Self { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn last_column_name(&self) -> Option<&str> {
        self.columns.last().map(|c| c.name.as_str())
    }

    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(idx))
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }
}

/// Cell spellings read as missing, the same set dataframe CSV
/// readers use by default. Matched after trimming, case-sensitive.
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan",
    "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

fn present_cell(cell: &str) -> Option<&str> {
    let cell = cell.trim();
    (!MISSING_MARKERS.contains(&cell)).then_some(cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "true" | "True" | "TRUE"    => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

// -0.0 and 0.0 are the same category
fn float_key(x: f64) -> u64 {
    if x == 0.0 { 0.0f64.to_bits() } else { x.to_bits() }
}
