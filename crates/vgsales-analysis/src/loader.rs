//! CSV loading
//!
//! Reads the sales dataset into [`RawRecord`]s: one per data row, every field
//! still as text. Typing and missing-value handling happen in
//! [`normalize`](crate::normalize).
//!
//! Header names are canonicalized (trimmed, lowercased) before column lookup,
//! so the source's `Year_of_Release` and `year_of_release` name the same
//! column. All eleven columns must be present; extra columns are ignored.

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

/// Columns every input file must provide, in canonical (lowercase) form.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "name",
    "platform",
    "year_of_release",
    "genre",
    "na_sales",
    "eu_sales",
    "jp_sales",
    "other_sales",
    "critic_score",
    "user_score",
    "rating",
];

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("failed to open {}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("missing required column '{column}'")]
    MissingColumn { column: &'static str },
    #[display("malformed CSV at line {line}: {message}")]
    Malformed { line: u64, message: String },
    #[display("invalid {column} value '{value}' at line {line}")]
    InvalidSales {
        line: u64,
        column: &'static str,
        value: String,
    },
}

impl LoadError {
    fn malformed(err: &csv::Error) -> Self {
        LoadError::Malformed {
            line: err.position().map_or(0, csv::Position::line),
            message: err.to_string(),
        }
    }
}

/// One data row as read from the file, before type coercion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    /// 1-based line number of the row in the source file.
    #[serde(skip)]
    pub line: u64,
    pub name: Option<String>,
    pub platform: Option<String>,
    pub year_of_release: Option<String>,
    pub genre: Option<String>,
    pub na_sales: String,
    pub eu_sales: String,
    pub jp_sales: String,
    pub other_sales: String,
    pub critic_score: Option<String>,
    pub user_score: Option<String>,
    pub rating: Option<String>,
}

/// Reads raw records from any byte stream holding the CSV.
pub fn read_raw_records<R>(reader: R) -> Result<Vec<RawRecord>, LoadError>
where
    R: Read,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|err| LoadError::malformed(&err))?
        .iter()
        .map(canonical_header)
        .collect::<StringRecord>();
    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|h| h == *column))
    {
        return Err(LoadError::MissingColumn { column });
    }
    reader.set_headers(headers.clone());

    let mut records = vec![];
    for row in reader.records() {
        let row = row.map_err(|err| LoadError::malformed(&err))?;
        let line = row.position().map_or(0, csv::Position::line);
        let mut record = row
            .deserialize::<RawRecord>(Some(&headers))
            .map_err(|err| LoadError::Malformed {
                line,
                message: err.to_string(),
            })?;
        record.line = line;
        records.push(record);
    }

    tracing::debug!(rows = records.len(), "read raw records");
    Ok(records)
}

/// Opens `path` and reads raw records from it.
pub fn read_raw_records_from_path<P>(path: P) -> Result<Vec<RawRecord>, LoadError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_owned(),
        source,
    })?;
    tracing::info!(path = %path.display(), "loading dataset");
    read_raw_records(BufReader::new(file))
}

fn canonical_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}
