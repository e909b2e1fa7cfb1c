use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LabelError>;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid CSV Header: {0}")]
    CsvHeader(String),

    #[error("Invalid CSV row {row}: expected at least {expected} columns, got {got}")]
    CsvRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Invalid coordinate at row {row}: {value}")]
    CoordParse {
        row: usize,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("No usable cities found in {path}")]
    EmptyDataset { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot build a file name from '{country}' / '{city}': contains {ch:?}")]
    MalformedPath {
        country: String,
        city: String,
        ch: char,
    },

    #[error("Failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create file {path}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write file {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("SVG formatting error")]
    Fmt(#[from] std::fmt::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

impl From<toml::de::Error> for LabelError {
    fn from(err: toml::de::Error) -> Self {
        LabelError::Config(format!("TOML parse error: {}", err))
    }
}
