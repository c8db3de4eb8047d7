//! CSV sources.
//!
//! A CSV document loads as untyped fields titled by its header row (or
//! `Column N` without headers) and one row per record.

use std::path::Path;

use horizon_grid_core::logging::targets;

use super::payload::{FieldSpec, Payload, RowSpec};
use crate::error::{GridError, Result};

/// Configuration options for reading CSV sources.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    delimiter: u8,
    /// Whether the first row contains headers (default: true)
    has_headers: bool,
    /// Quote character (default: double quote)
    quote: u8,
    /// Comment character (records starting with this are ignored)
    comment: Option<u8>,
    /// Whether to trim whitespace from fields (default: false)
    trim: bool,
}

impl CsvOptions {
    /// Creates default CSV options.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            quote: b'"',
            comment: None,
            trim: false,
        }
    }

    /// Sets the field delimiter.
    ///
    /// Common values:
    /// - `b','` - Comma (default, CSV)
    /// - `b'\t'` - Tab (TSV)
    /// - `b';'` - Semicolon (common in European locales)
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Indicates that the CSV has no header row.
    pub fn no_headers(mut self) -> Self {
        self.has_headers = false;
        self
    }

    /// Sets whether the first row contains headers.
    pub fn has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Sets the quote character.
    pub fn quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Sets a comment character (lines starting with this are ignored).
    pub fn comment(mut self, comment: u8) -> Self {
        self.comment = Some(comment);
        self
    }

    /// Enables trimming of whitespace from fields.
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(false)
            .quote(self.quote)
            // short and long records are padded or truncated by the view
            .flexible(true);

        if let Some(comment) = self.comment {
            builder.comment(Some(comment));
        }

        if self.trim {
            builder.trim(csv::Trim::All);
        }

        builder
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses CSV text into a payload.
pub fn parse_csv(text: &str, options: &CsvOptions) -> Result<Payload> {
    let mut reader = options.reader_builder().from_reader(text.as_bytes());
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let fields = if options.has_headers && !records.is_empty() {
        records.remove(0).into_iter().map(FieldSpec::new).collect()
    } else {
        Vec::new()
    };

    tracing::debug!(
        target: targets::SOURCE,
        fields = fields.len(),
        rows = records.len(),
        "parsed CSV source"
    );

    Ok(Payload::new(
        fields,
        records.into_iter().map(RowSpec::from_values).collect(),
    ))
}

/// Reads a CSV file into a payload.
pub fn read_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Payload> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|err| GridError::io(path, err))?;
    parse_csv(&text, options)
}
