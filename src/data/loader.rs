// ============================================================
// Layer 4 - Delimited Table Loader
// ============================================================
// Reads a delimited text file with a header row into a typed
// Table. The location may be a local path or an http(s) URL.
//
// Parsing goes through the csv crate so quoted fields, embedded
// delimiters and CRLF line endings are handled; column types
// are then inferred per column (see domain::table).
//
// Duplicate header names are disambiguated with a numeric
// suffix ("price", "price.1", ...) so every column can be
// addressed by name.

use std::{collections::HashMap, fs};

use crate::domain::table::{Column, Table};
use crate::domain::traits::TableSource;
use crate::error::PipelineError;

/// Loads a delimited file from disk or over HTTP.
pub struct CsvSource {
    location:  String,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(location: impl Into<String>, delimiter: u8) -> Self {
        Self { location: location.into(), delimiter }
    }

    fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    fn read_bytes(&self) -> Result<Vec<u8>, PipelineError> {
        if self.is_remote() {
            tracing::info!("Downloading dataset from '{}'", self.location);
            let response = reqwest::blocking::get(&self.location)
                .and_then(|r| r.error_for_status())
                .map_err(|e| PipelineError::dataset_load(&self.location, e))?;
            let bytes = response
                .bytes()
                .map_err(|e| PipelineError::dataset_load(&self.location, e))?;
            Ok(bytes.to_vec())
        } else {
            fs::read(&self.location).map_err(|e| PipelineError::dataset_load(&self.location, e))
        }
    }
}

impl TableSource for CsvSource {
    fn load(&self) -> Result<Table, PipelineError> {
        let bytes = self.read_bytes()?;
        let table = parse_delimited(&bytes, self.delimiter, &self.location)?;
        tracing::info!(
            "Loaded '{}': {} rows x {} columns",
            self.location,
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// Parse delimited bytes (header row first) into a typed table.
pub fn parse_delimited(bytes: &[u8], delimiter: u8, location: &str) -> Result<Table, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::dataset_load(location, e))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(PipelineError::dataset_load(location, "missing header row"));
    }
    let headers = dedupe_headers(headers);

    // Column-major buffers, one Vec of raw cells per header
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| PipelineError::dataset_load(location, e))?;
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or("").to_string());
        }
    }

    if cells[0].is_empty() {
        return Err(PipelineError::EmptyDataset(location.to_string()));
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column::infer(name, raw))
        .collect();
    Ok(Table::new(columns))
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let count = seen.entry(h.clone()).or_insert(0);
            let name = if *count == 0 { h.clone() } else { format!("{h}.{count}") };
            *count += 1;
            name
        })
        .collect()
}
